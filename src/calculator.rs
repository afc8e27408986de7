//! Calculator service
//!
//! Resolves the active fee set of every delivery plan (persisted override,
//! else configured default) and prices a net value against all of them.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::PlansConfig;
use crate::consistency::{check_consistency, ConsistencyReport};
use crate::error::{PricingError, Result};
use crate::input::parse_net_value;
use crate::persistence::{FeeStore, KeyValueStore};
use crate::pricing::{compare_plans, QuoteReport};
use crate::types::{DeliveryPlan, FeeSet};

pub struct Calculator<S> {
    store: FeeStore<S>,
    defaults: PlansConfig,
}

impl<S: KeyValueStore> Calculator<S> {
    pub fn new(store: FeeStore<S>, defaults: PlansConfig) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &FeeStore<S> {
        &self.store
    }

    /// Configured default fees for a plan, ignoring the store
    pub fn default_fees(&self, plan: DeliveryPlan) -> FeeSet {
        self.defaults.fee_set(plan)
    }

    /// Active fees: persisted set if readable, else configured default
    pub fn fees(&self, plan: DeliveryPlan) -> FeeSet {
        match self.store.load(plan) {
            Ok(Some(fees)) => fees,
            Ok(None) => self.default_fees(plan),
            Err(e) => {
                warn!("Failed to load fees for {}: {}, using defaults", plan, e);
                self.default_fees(plan)
            }
        }
    }

    /// Starting point for an edit. Unlike [`Self::fees`], an unreadable
    /// stored set is an error, never replaced by defaults.
    fn editable_fees(&self, plan: DeliveryPlan) -> Result<FeeSet> {
        Ok(self
            .store
            .load(plan)?
            .unwrap_or_else(|| self.default_fees(plan)))
    }

    /// Active fees of every plan, in [`DeliveryPlan::ALL`] order
    pub fn all_fees(&self) -> Vec<(DeliveryPlan, FeeSet)> {
        DeliveryPlan::ALL
            .iter()
            .map(|plan| (*plan, self.fees(*plan)))
            .collect()
    }

    /// Price `net_value` against every plan
    pub fn quote(&self, net_value: f64) -> QuoteReport {
        let fee_sets = self.all_fees();
        let plans = compare_plans(net_value, fee_sets.iter().map(|(p, f)| (*p, f)));

        for q in &plans {
            debug!(
                plan = %q.plan,
                net_value,
                total_rate = q.fees.total_rate(),
                gross = q.result.gross_price(),
                "priced plan"
            );
            if q.result.is_unachievable() {
                warn!(
                    "Plan {} has fees totalling {:.2}%: no selling price covers them",
                    q.plan,
                    q.fees.total_percent()
                );
            }
        }

        QuoteReport {
            net_value,
            plans,
            computed_at: Utc::now(),
        }
    }

    /// Price a net value typed by a user; unparseable text prices as 0
    pub fn quote_text(&self, text: &str) -> QuoteReport {
        self.quote(parse_net_value(text))
    }

    /// Upsert one fee rate of a plan and persist the whole set
    pub fn set_fee(&mut self, plan: DeliveryPlan, name: &str, percent: f64) -> Result<FeeSet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PricingError::InvalidFee("fee name is empty".to_string()));
        }
        if !percent.is_finite() {
            return Err(PricingError::InvalidFee(format!(
                "{} must be a finite percentage",
                name
            )));
        }

        let mut fees = self.editable_fees(plan)?;
        fees.set(name, percent);
        self.store.save(plan, &fees)?;
        info!("Set {} fee {} = {}%", plan, name, percent);
        Ok(fees)
    }

    /// Replace the whole fee set of a plan
    pub fn replace_fees(&mut self, plan: DeliveryPlan, fees: FeeSet) -> Result<FeeSet> {
        if fees.iter().any(|rate| rate.name.trim().is_empty()) {
            return Err(PricingError::InvalidFee("fee name is empty".to_string()));
        }
        self.store.save(plan, &fees)?;
        info!("Replaced {} fees ({} rates)", plan, fees.len());
        Ok(fees)
    }

    pub fn remove_fee(&mut self, plan: DeliveryPlan, name: &str) -> Result<FeeSet> {
        let mut fees = self.editable_fees(plan)?;
        if fees.remove(name).is_none() {
            return Err(PricingError::InvalidFee(format!(
                "{} has no fee named {}",
                plan, name
            )));
        }
        self.store.save(plan, &fees)?;
        info!("Removed {} fee {}", plan, name);
        Ok(fees)
    }

    /// Drop the persisted set so the plan falls back to its defaults
    pub fn reset(&mut self, plan: DeliveryPlan) -> Result<FeeSet> {
        self.store.clear(plan)?;
        info!("Reset {} fees to defaults", plan);
        Ok(self.default_fees(plan))
    }

    /// Compare plan slugs with the keys present in the store
    pub fn check_consistency(&self) -> Result<ConsistencyReport> {
        let labels: Vec<String> = DeliveryPlan::ALL
            .iter()
            .map(|p| p.slug().to_string())
            .collect();
        let keys = self.store.keys()?;
        let report = check_consistency(&labels, &keys, self.store.prefix());
        info!("🔍 Consistency check: {}", report.summary);
        Ok(report)
    }
}
