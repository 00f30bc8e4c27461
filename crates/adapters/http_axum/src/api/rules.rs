//! JSON REST handlers for automation rules.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};
use leadhub_domain::id::RuleId;
use leadhub_domain::rule::{AutomationRule, RuleDraft, RuleFilter, RulePatch};

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<AutomationRule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/rules`: list the caller's rules, optionally filtered by
/// `trigger_type` and `is_active`.
pub async fn list<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    filter: Result<Query<RuleFilter>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let Query(filter) = filter?;
    let rules = state.rule_service.list_rules(user_id, filter).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/{id}`: get one of the caller's rules.
pub async fn get<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    let rule = state.rule_service.get_rule(user_id, rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules`: create a rule for the caller.
pub async fn create<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    payload: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let Json(draft) = payload?;
    let created = state.rule_service.create_rule(user_id, draft).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PATCH /api/rules/{id}`: partially update one of the caller's rules.
pub async fn update<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
    payload: Result<Json<RulePatch>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    let Json(patch) = payload?;
    let updated = state
        .rule_service
        .update_rule(user_id, rule_id, patch)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/rules/{id}`: delete one of the caller's rules.
pub async fn delete<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let rule_id: RuleId = parse_id(&id)?;
    state.rule_service.delete_rule(user_id, rule_id).await?;
    Ok(DeleteResponse::NoContent)
}
