//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod executions;
#[allow(clippy::missing_errors_doc)]
pub mod leads;
#[allow(clippy::missing_errors_doc)]
pub mod rules;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};
use leadhub_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<RR, LS, LR>() -> Router<AppState<RR, LS, LR>>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<RR, LS, LR>).post(rules::create::<RR, LS, LR>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<RR, LS, LR>)
                .patch(rules::update::<RR, LS, LR>)
                .delete(rules::delete::<RR, LS, LR>),
        )
        // Execution
        .route("/rules/execute", post(executions::execute::<RR, LS, LR>))
        .route("/rules/logs", get(executions::logs::<RR, LS, LR>))
        // Leads
        .route("/leads", post(leads::create::<RR, LS, LR>))
        .route("/leads/{id}", get(leads::get::<RR, LS, LR>))
}

/// Parse a path identifier, reporting a validation error on failure.
fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ValidationError>,
{
    Ok(T::from_str(raw)?)
}
