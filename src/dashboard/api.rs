//! Dashboard HTTP API
//!
//! REST endpoints for the calculator frontend.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use super::types::*;
use super::DashboardState;
use crate::consistency::ConsistencyReport;
use crate::persistence::KeyValueStore;
use crate::types::{DeliveryPlan, FeeSet};

/// Create the API router with all endpoints
pub fn create_router<S>(state: DashboardState<S>) -> Router
where
    S: KeyValueStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/quote", get(get_quote::<S>))
        .route("/api/fees", get(get_fees::<S>))
        .route(
            "/api/fees/:plan",
            get(get_plan_fees::<S>)
                .put(put_plan_fees::<S>)
                .delete(delete_plan_fees::<S>),
        )
        .route("/api/consistency", get(get_consistency::<S>))
        // State
        .with_state(state)
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn get_health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct QuoteQuery {
    /// Raw user text, e.g. `50`, `50,00`, `R$ 1.234,56`
    pub net: Option<String>,
}

/// GET /api/quote?net=50,00
pub(super) async fn get_quote<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
    Query(query): Query<QuoteQuery>,
) -> Json<ApiResponse<QuoteResponse>> {
    let calculator = state.calculator.read().await;
    let report = calculator.quote_text(query.net.as_deref().unwrap_or(""));
    Json(ApiResponse::success(QuoteResponse::from_report(
        &report,
        &state.format,
    )))
}

fn plan_fees<S: KeyValueStore>(
    state: &DashboardState<S>,
    plan: DeliveryPlan,
    fees: FeeSet,
) -> PlanFeesResponse {
    PlanFeesResponse {
        plan,
        label: plan.label().to_string(),
        storage_key: state.key_for(plan),
        total_percent: fees.total_percent(),
        fees,
    }
}

/// GET /api/fees - Active fee set of every plan
pub(super) async fn get_fees<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
) -> Json<ApiResponse<Vec<PlanFeesResponse>>> {
    let all = state.calculator.read().await.all_fees();
    let response = all
        .into_iter()
        .map(|(plan, fees)| plan_fees(&state, plan, fees))
        .collect();
    Json(ApiResponse::success(response))
}

/// GET /api/fees/:plan
pub(super) async fn get_plan_fees<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
    Path(plan): Path<String>,
) -> Json<ApiResponse<PlanFeesResponse>> {
    let plan = match DeliveryPlan::parse(&plan) {
        Ok(plan) => plan,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };
    let fees = state.calculator.read().await.fees(plan);
    Json(ApiResponse::success(plan_fees(&state, plan, fees)))
}

/// PUT /api/fees/:plan - Body is a flat `{ "fee name": percent }` map
pub(super) async fn put_plan_fees<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
    Path(plan): Path<String>,
    Json(fees): Json<FeeSet>,
) -> Json<ApiResponse<PlanFeesResponse>> {
    let plan = match DeliveryPlan::parse(&plan) {
        Ok(plan) => plan,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };
    let result = state.calculator.write().await.replace_fees(plan, fees);
    match result {
        Ok(fees) => Json(ApiResponse::success(plan_fees(&state, plan, fees))),
        Err(e) => {
            tracing::warn!("Failed to save {} fees: {}", plan, e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

/// DELETE /api/fees/:plan - Restore configured defaults
pub(super) async fn delete_plan_fees<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
    Path(plan): Path<String>,
) -> Json<ApiResponse<PlanFeesResponse>> {
    let plan = match DeliveryPlan::parse(&plan) {
        Ok(plan) => plan,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };
    let result = state.calculator.write().await.reset(plan);
    match result {
        Ok(fees) => Json(ApiResponse::success(plan_fees(&state, plan, fees))),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}

/// GET /api/consistency - Plan labels vs stored keys
pub(super) async fn get_consistency<S: KeyValueStore>(
    State(state): State<DashboardState<S>>,
) -> Json<ApiResponse<ConsistencyReport>> {
    match state.calculator.read().await.check_consistency() {
        Ok(report) => Json(ApiResponse::success(report)),
        Err(e) => {
            tracing::warn!("Consistency check failed: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}
