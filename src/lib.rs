//! Delivery Pricing Library
//!
//! Net-to-gross price calculator for food-delivery sellers: given what a
//! seller wants to keep and the platform's percentage fees, find the
//! listed price that leaves exactly that amount.

pub mod calculator;
pub mod config;
pub mod consistency;
pub mod error;
pub mod format;
pub mod input;
pub mod persistence;
pub mod pricing;
pub mod types;

#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use calculator::Calculator;
pub use error::{PricingError, Result};
pub use pricing::{compute, PricingResult};
pub use types::{DeliveryPlan, FeeRate, FeeSet};
