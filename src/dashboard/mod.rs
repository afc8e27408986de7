//! Dashboard Module
//!
//! Provides an HTTP API over the calculator for a browser frontend.
//! Only compiled when the `dashboard` feature is enabled.

mod api;
mod types;

pub use api::create_router;
pub use types::*;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::calculator::Calculator;
use crate::format::CurrencyFormat;
use crate::persistence::{storage_key, KeyValueStore};
use crate::types::DeliveryPlan;

/// Shared handler state: quotes take the read lock, fee edits the write lock
pub struct DashboardState<S> {
    pub calculator: Arc<RwLock<Calculator<S>>>,
    pub format: Arc<CurrencyFormat>,
    key_prefix: Arc<str>,
}

impl<S> Clone for DashboardState<S> {
    fn clone(&self) -> Self {
        Self {
            calculator: Arc::clone(&self.calculator),
            format: Arc::clone(&self.format),
            key_prefix: Arc::clone(&self.key_prefix),
        }
    }
}

impl<S: KeyValueStore> DashboardState<S> {
    pub fn new(calculator: Calculator<S>, format: CurrencyFormat) -> Self {
        let key_prefix: Arc<str> = Arc::from(calculator.store().prefix());
        Self {
            calculator: Arc::new(RwLock::new(calculator)),
            format: Arc::new(format),
            key_prefix,
        }
    }

    fn key_for(&self, plan: DeliveryPlan) -> String {
        storage_key(&self.key_prefix, plan)
    }
}

/// Start the dashboard server
pub async fn start_server<S>(state: DashboardState<S>, addr: &str) -> anyhow::Result<()>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🖥️ Dashboard API starting on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
