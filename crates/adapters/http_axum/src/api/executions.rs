//! JSON handlers for trigger execution and the audit trail.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionReport, TriggerRequest};
use leadhub_domain::id::{LeadId, RuleId};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters of the audit log endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub rule_id: Option<RuleId>,
    pub lead_id: Option<LeadId>,
    pub limit: Option<usize>,
}

/// Possible responses from the execute endpoint.
pub enum ExecuteResponse {
    Ok(Json<ExecutionReport>),
}

impl IntoResponse for ExecuteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the logs endpoint.
pub enum LogsResponse {
    Ok(Json<Vec<ExecutionLogEntry>>),
}

impl IntoResponse for LogsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/rules/execute`: run the caller's rules for one trigger.
///
/// Always `200` once the payload is valid and the lead is found; per-action
/// failures are reported inside the body.
pub async fn execute<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> Result<ExecuteResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let Json(request) = payload?;
    let report = state.engine.execute(user_id, &request).await?;
    Ok(ExecuteResponse::Ok(Json(report)))
}

/// `GET /api/rules/logs`: the caller's execution logs, newest first.
pub async fn logs<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<LogsResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let entries = state
        .log_service
        .list_logs(user_id, query.rule_id, query.lead_id, query.limit)
        .await?;
    Ok(LogsResponse::Ok(Json(entries)))
}
