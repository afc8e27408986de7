//! Configuration management
//!
//! Loads from optional `config/default` and `config/local` files plus
//! `DELIVERY_PRICING__*` environment variables (via .env)

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::PricingError;
use crate::format::CurrencyFormat;
use crate::persistence::DEFAULT_KEY_PREFIX;
use crate::types::{DeliveryPlan, FeeSet};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub plans: PlansConfig,
    pub display: CurrencyFormat,
    pub logging: LoggingConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding persisted fee sets
    pub path: String,
    /// Prefix of every key this application writes
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlansConfig {
    pub own: PlanFees,
    pub partner: PlanFees,
}

impl PlansConfig {
    pub fn get(&self, plan: DeliveryPlan) -> &PlanFees {
        match plan {
            DeliveryPlan::Own => &self.own,
            DeliveryPlan::Partner => &self.partner,
        }
    }

    pub fn fee_set(&self, plan: DeliveryPlan) -> FeeSet {
        self.get(plan).to_fee_set()
    }
}

/// Default fee percentages for one plan
#[derive(Debug, Clone, Deserialize)]
pub struct PlanFees {
    /// Platform commission (%)
    pub commission: f64,
    /// Online payment fee (%)
    pub payment: f64,
    /// Early payout fee (%)
    pub anticipation: f64,
    /// Any further named fees (%)
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl PlanFees {
    pub fn own_delivery() -> Self {
        Self {
            commission: 12.0,
            payment: 3.5,
            anticipation: 1.59,
            extra: BTreeMap::new(),
        }
    }

    pub fn partner_delivery() -> Self {
        Self {
            commission: 23.0,
            payment: 3.5,
            anticipation: 1.59,
            extra: BTreeMap::new(),
        }
    }

    /// commission, payment, anticipation, then extras by name
    pub fn to_fee_set(&self) -> FeeSet {
        let mut fees = FeeSet::new()
            .with("commission", self.commission)
            .with("payment", self.payment)
            .with("anticipation", self.anticipation);
        for (name, percent) in &self.extra {
            fees.set(name.clone(), *percent);
        }
        fees
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable text
    pub json: bool,
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// HTTP API listen address
    pub addr: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let own = PlanFees::own_delivery();
        let partner = PlanFees::partner_delivery();
        let display = CurrencyFormat::brl();

        let config = Config::builder()
            // Store defaults
            .set_default("store.path", "./data/fees.json")?
            .set_default("store.key_prefix", DEFAULT_KEY_PREFIX)?
            // Plan defaults
            .set_default("plans.own.commission", own.commission)?
            .set_default("plans.own.payment", own.payment)?
            .set_default("plans.own.anticipation", own.anticipation)?
            .set_default("plans.partner.commission", partner.commission)?
            .set_default("plans.partner.payment", partner.payment)?
            .set_default("plans.partner.anticipation", partner.anticipation)?
            // Display defaults
            .set_default("display.symbol", display.symbol)?
            .set_default("display.decimal_separator", display.decimal_separator.to_string())?
            .set_default(
                "display.thousands_separator",
                display.thousands_separator.to_string(),
            )?
            .set_default("display.unachievable_label", display.unachievable_label)?
            // Logging defaults
            .set_default("logging.json", false)?
            .set_default("logging.level", "info")?
            // Dashboard defaults
            .set_default("dashboard.addr", "127.0.0.1:8080")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (DELIVERY_PRICING__*)
            .add_source(Environment::with_prefix("DELIVERY_PRICING").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject settings that would corrupt stored keys or rendered amounts
    pub fn validate(&self) -> crate::error::Result<()> {
        let prefix = &self.store.key_prefix;
        if prefix.trim().is_empty() || prefix.contains(':') {
            return Err(PricingError::Config(format!(
                "store.key_prefix must be non-empty and contain no ':' (got {:?})",
                prefix
            )));
        }
        if self.display.decimal_separator == self.display.thousands_separator {
            return Err(PricingError::Config(
                "display.decimal_separator and display.thousands_separator must differ"
                    .to_string(),
            ));
        }
        for plan in DeliveryPlan::ALL {
            let fees = self.plans.get(plan);
            let all_finite = [fees.commission, fees.payment, fees.anticipation]
                .iter()
                .chain(fees.extra.values())
                .all(|p| p.is_finite());
            if !all_finite {
                return Err(PricingError::Config(format!(
                    "plans.{} has a non-numeric fee",
                    plan_section(plan)
                )));
            }
        }
        Ok(())
    }

    /// One-line summary for logging
    pub fn digest(&self) -> String {
        format!(
            "store={} prefix={} own={:.2}% partner={:.2}%",
            self.store.path,
            self.store.key_prefix,
            self.plans.own.to_fee_set().total_percent(),
            self.plans.partner.to_fee_set().total_percent()
        )
    }
}

fn plan_section(plan: DeliveryPlan) -> &'static str {
    match plan {
        DeliveryPlan::Own => "own",
        DeliveryPlan::Partner => "partner",
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
