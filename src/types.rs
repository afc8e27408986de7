//! Core types used throughout the calculator
//!
//! Defines fee rates, fee sets and the delivery plans they belong to.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{PricingError, Result};

/// Delivery plans offered by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPlan {
    /// Seller delivers the order ("Plano Básico")
    #[default]
    Own,
    /// Platform logistics deliver the order ("Plano Entrega")
    Partner,
}

impl DeliveryPlan {
    pub const ALL: [DeliveryPlan; 2] = [DeliveryPlan::Own, DeliveryPlan::Partner];

    /// Stable identifier used in storage keys and URLs
    pub fn slug(&self) -> &'static str {
        match self {
            DeliveryPlan::Own => "own_delivery",
            DeliveryPlan::Partner => "partner_delivery",
        }
    }

    /// Human-readable plan name
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryPlan::Own => "Plano Básico (Entrega Própria)",
            DeliveryPlan::Partner => "Plano Entrega (Entrega Parceira)",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "own" | "own_delivery" | "basic" | "basico" => Some(DeliveryPlan::Own),
            "partner" | "partner_delivery" | "delivery" | "entrega" => {
                Some(DeliveryPlan::Partner)
            }
            _ => None,
        }
    }

    /// Parse from string, failing with [`PricingError::UnknownPlan`]
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| PricingError::UnknownPlan(s.to_string()))
    }
}

impl fmt::Display for DeliveryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// A named percentage deducted from the gross price
#[derive(Debug, Clone, PartialEq)]
pub struct FeeRate {
    pub name: String,
    /// Percent (12.0 means 12 %). Non-finite input is stored as 0.
    pub percent: f64,
}

impl FeeRate {
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        Self {
            name: name.into(),
            percent: if percent.is_finite() { percent } else { 0.0 },
        }
    }

    /// Rate as a fraction of 1
    pub fn fraction(&self) -> f64 {
        if self.percent.is_finite() {
            self.percent / 100.0
        } else {
            0.0
        }
    }
}

/// Insertion-ordered set of uniquely named fee rates.
///
/// Serialises as a flat JSON object mapping fee names to percentages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeeSet {
    rates: Vec<FeeRate>,
}

impl FeeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, percent: f64) -> Self {
        self.set(name, percent);
        self
    }

    /// Insert a rate, replacing the percentage in place if the name exists
    pub fn set(&mut self, name: impl Into<String>, percent: f64) {
        let rate = FeeRate::new(name, percent);
        match self.rates.iter_mut().find(|r| r.name == rate.name) {
            Some(existing) => existing.percent = rate.percent,
            None => self.rates.push(rate),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FeeRate> {
        let idx = self.rates.iter().position(|r| r.name == name)?;
        Some(self.rates.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&FeeRate> {
        self.rates.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeeRate> {
        self.rates.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rates.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Sum of all percentages
    pub fn total_percent(&self) -> f64 {
        self.rates.iter().map(|r| r.percent).sum()
    }

    /// Effective total rate as a fraction of 1
    pub fn total_rate(&self) -> f64 {
        self.rates.iter().map(FeeRate::fraction).sum()
    }
}

impl FromIterator<(String, f64)> for FeeSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut set = FeeSet::new();
        for (name, percent) in iter {
            set.set(name, percent);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FeeSet {
    type Item = &'a FeeRate;
    type IntoIter = std::slice::Iter<'a, FeeRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.iter()
    }
}

impl Serialize for FeeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rates.len()))?;
        for rate in &self.rates {
            map.serialize_entry(&rate.name, &rate.percent)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FeeSetVisitor;

        impl<'de> Visitor<'de> for FeeSetVisitor {
            type Value = FeeSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of fee names to percentages")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<FeeSet, A::Error> {
                let mut set = FeeSet::new();
                while let Some((name, percent)) = access.next_entry::<String, f64>()? {
                    set.set(name, percent);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(FeeSetVisitor)
    }
}
