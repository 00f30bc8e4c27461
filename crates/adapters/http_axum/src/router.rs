//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api` next to an unauthenticated `/health`
/// check. Includes a [`TraceLayer`] that logs each HTTP request/response at
/// the `DEBUG` level using the `tracing` ecosystem.
pub fn build<RR, LS, LR>(state: AppState<RR, LS, LR>) -> Router
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
