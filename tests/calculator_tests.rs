//! End-to-end tests: calculator over a JSON file store

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use delivery_pricing::calculator::Calculator;
use delivery_pricing::config::{PlanFees, PlansConfig};
use delivery_pricing::consistency::DiscrepancyKind;
use delivery_pricing::persistence::{FeeStore, JsonFileStore, KeyValueStore, DEFAULT_KEY_PREFIX};
use delivery_pricing::types::DeliveryPlan;

struct TempStore {
    dir: PathBuf,
}

impl TempStore {
    fn new(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let dir = std::env::temp_dir().join(format!(
            "delivery-pricing-it-{}-{}-{}",
            name,
            std::process::id(),
            nanos
        ));
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("fees.json")
    }

    fn calculator(&self) -> Calculator<JsonFileStore> {
        let store = JsonFileStore::open(self.path()).expect("open store");
        Calculator::new(FeeStore::new(store, DEFAULT_KEY_PREFIX), defaults())
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn defaults() -> PlansConfig {
    PlansConfig {
        own: PlanFees::own_delivery(),
        partner: PlanFees::partner_delivery(),
    }
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_edits_survive_restart() {
    let tmp = TempStore::new("restart");
    {
        let mut calc = tmp.calculator();
        calc.set_fee(DeliveryPlan::Own, "commission", 15.0).unwrap();
        calc.set_fee(DeliveryPlan::Own, "monthly", 1.0).unwrap();
    }

    let calc = tmp.calculator();
    let fees = calc.fees(DeliveryPlan::Own);
    assert_eq!(
        fees.names(),
        vec!["commission", "payment", "anticipation", "monthly"]
    );
    assert!((fees.total_percent() - 21.09).abs() < 1e-9);
    assert_eq!(calc.fees(DeliveryPlan::Partner), calc.default_fees(DeliveryPlan::Partner));
}

#[test]
fn test_file_layout_is_one_flat_map_per_plan() {
    let tmp = TempStore::new("layout");
    tmp.calculator()
        .set_fee(DeliveryPlan::Partner, "commission", 25.0)
        .unwrap();

    let raw = fs::read_to_string(tmp.path()).unwrap();
    let outer: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let stored = outer["delivery-pricing:partner_delivery"]
        .as_str()
        .expect("string value");
    let inner: serde_json::Value = serde_json::from_str(stored).unwrap();

    assert_eq!(inner["commission"], 25.0);
    assert_eq!(inner["payment"], 3.5);
}

#[test]
fn test_reset_removes_the_key() {
    let tmp = TempStore::new("reset");
    let mut calc = tmp.calculator();
    calc.set_fee(DeliveryPlan::Own, "commission", 99.0).unwrap();
    calc.reset(DeliveryPlan::Own).unwrap();

    let reopened = JsonFileStore::open(tmp.path()).unwrap();
    assert!(reopened.keys().unwrap().is_empty());
}

// ============================================================================
// Quotes & consistency
// ============================================================================

#[test]
fn test_quote_text_prices_both_plans() {
    let tmp = TempStore::new("quote");
    let report = tmp.calculator().quote_text("R$ 50,00");

    assert_eq!(report.net_value, 50.0);
    assert_eq!(report.plans.len(), 2);
    assert_eq!(report.plans[0].plan, DeliveryPlan::Own);
    assert!(report.plans.iter().all(|q| q
        .result
        .breakdown()
        .map(|b| b.reconciles())
        .unwrap_or(false)));
}

#[test]
fn test_consistency_sees_foreign_and_stale_keys() {
    let tmp = TempStore::new("consistency");
    {
        let mut store = JsonFileStore::open(tmp.path()).unwrap();
        store
            .set("delivery-pricing:own_delivery", r#"{"commission":12}"#)
            .unwrap();
        store
            .set("delivery-pricing:partner", r#"{"commission":23}"#)
            .unwrap();
        store.set("delivery-pricing:legacy", "{}").unwrap();
        store.set("theme", "dark").unwrap();
    }

    let report = tmp.calculator().check_consistency().unwrap();

    assert!(!report.is_consistent());
    assert_eq!(report.count(DiscrepancyKind::Mismatch), 1);
    assert_eq!(report.count(DiscrepancyKind::KeyOnly), 1);
    assert_eq!(report.count(DiscrepancyKind::LabelOnly), 0);
    assert!(report
        .discrepancies
        .iter()
        .all(|d| d.storage_key.as_deref() != Some("theme")));
}
