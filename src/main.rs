//! delivery-pricing command line
//!
//! Uso: delivery-pricing quote 50,00

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use delivery_pricing::calculator::Calculator;
use delivery_pricing::config::AppConfig;
use delivery_pricing::consistency::ConsistencyReport;
use delivery_pricing::format::CurrencyFormat;
use delivery_pricing::input::parse_percent;
use delivery_pricing::persistence::{FeeStore, JsonFileStore};
use delivery_pricing::pricing::{PricingResult, QuoteReport};
use delivery_pricing::types::{DeliveryPlan, FeeSet};

#[derive(Parser)]
#[command(
    name = "delivery-pricing",
    version,
    about = "Find the selling price that leaves the net amount you want after delivery-platform fees"
)]
struct Args {
    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a net value against every plan
    Quote {
        /// Amount you want to receive, e.g. 50 or "R$ 50,00"
        net: String,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show active fees
    Fees {
        /// own | partner (default: all plans)
        plan: Option<String>,
    },
    /// Set one fee percentage of a plan
    SetFee {
        plan: String,
        name: String,
        /// Percentage, e.g. 12 or 3,5
        percent: String,
    },
    /// Remove one fee from a plan
    RemoveFee { plan: String, name: String },
    /// Restore default fees
    Reset {
        /// own | partner (default: all plans)
        plan: Option<String>,
    },
    /// Compare plan labels with the keys in the fee store
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    #[cfg(feature = "dashboard")]
    Serve {
        /// Listen address (default from config)
        #[arg(long)]
        addr: Option<String>,
    },
}

fn init_tracing(json: bool, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn plans_from(arg: Option<&str>) -> Result<Vec<DeliveryPlan>> {
    match arg {
        Some(raw) => Ok(vec![DeliveryPlan::parse(raw)?]),
        None => Ok(DeliveryPlan::ALL.to_vec()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;
    init_tracing(args.json_logs || config.logging.json, &config.logging.level);

    info!("⚙️ Config: {}", config);

    let store = JsonFileStore::open(&config.store.path)
        .with_context(|| format!("Failed to open fee store {}", config.store.path))?;
    let mut calculator = Calculator::new(
        FeeStore::new(store, config.store.key_prefix.clone()),
        config.plans.clone(),
    );
    let format = config.display.clone();

    match args.command {
        Command::Quote { net, json } => {
            let report = calculator.quote_text(&net);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_quote(&report, &format);
            }
        }
        Command::Fees { plan } => {
            for plan in plans_from(plan.as_deref())? {
                print_fees(plan, &calculator.fees(plan), &format);
            }
        }
        Command::SetFee {
            plan,
            name,
            percent,
        } => {
            let plan = DeliveryPlan::parse(&plan)?;
            let fees = calculator.set_fee(plan, &name, parse_percent(&percent))?;
            print_fees(plan, &fees, &format);
        }
        Command::RemoveFee { plan, name } => {
            let plan = DeliveryPlan::parse(&plan)?;
            let fees = calculator.remove_fee(plan, &name)?;
            print_fees(plan, &fees, &format);
        }
        Command::Reset { plan } => {
            for plan in plans_from(plan.as_deref())? {
                let fees = calculator.reset(plan)?;
                print_fees(plan, &fees, &format);
            }
        }
        Command::Check { json } => {
            let report = calculator.check_consistency()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_consistency(&report);
            }
        }
        #[cfg(feature = "dashboard")]
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.dashboard.addr.clone());
            let state = delivery_pricing::dashboard::DashboardState::new(calculator, format);
            delivery_pricing::dashboard::start_server(state, &addr).await?;
        }
    }

    Ok(())
}

fn print_quote(report: &QuoteReport, format: &CurrencyFormat) {
    if report.plans.iter().all(|q| q.result.is_idle()) {
        println!("Enter an amount greater than zero to see suggested prices.");
        return;
    }

    println!("Net amount: {}\n", format.format_amount(report.net_value));
    for quote in &report.plans {
        println!(
            "{} ({})",
            quote.label,
            format.format_percent(quote.fees.total_percent())
        );
        println!("  Selling price: {}", format.format_gross(&quote.result));
        println!("  Total fees:    {}", format.format_fees(&quote.result));
        match &quote.result {
            PricingResult::Priced(breakdown) => {
                for fee in &breakdown.fees {
                    println!(
                        "    {:<14} {:>8}  {}",
                        fee.name,
                        format.format_percent(fee.percent),
                        format.format_amount(fee.amount)
                    );
                }
            }
            PricingResult::Unachievable { total_rate } => {
                println!(
                    "    Fees add up to {}: no price covers them.",
                    format.format_percent(total_rate * 100.0)
                );
            }
            PricingResult::Idle => {}
        }
        println!();
    }
    if let Some(best) = report.cheapest() {
        println!("Lowest price: {}", best.label);
    }
}

fn print_fees(plan: DeliveryPlan, fees: &FeeSet, format: &CurrencyFormat) {
    println!(
        "{} [{}] total {}",
        plan.label(),
        plan.slug(),
        format.format_percent(fees.total_percent())
    );
    for rate in fees {
        println!("  {:<14} {:>8}", rate.name, format.format_percent(rate.percent));
    }
}

fn print_consistency(report: &ConsistencyReport) {
    println!("{}", report.summary);
    for d in &report.discrepancies {
        println!("\n- {}", d.kind.title());
        if let Some(label) = &d.label {
            println!("  label: {}", label);
        }
        if let Some(key) = &d.storage_key {
            println!("  key:   {}", key);
        }
        println!("  fix:   {}", d.resolution_suggestion);
    }
}
