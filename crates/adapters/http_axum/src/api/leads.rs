//! JSON REST handlers for leads.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};
use leadhub_domain::id::LeadId;
use leadhub_domain::lead::Lead;

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a lead.
#[derive(Deserialize)]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: Option<String>,
}

/// Possible responses from the lead endpoints.
pub enum LeadResponse {
    Ok(Json<Lead>),
    Created(Json<Lead>),
}

impl IntoResponse for LeadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /api/leads`: create a lead for the caller.
pub async fn create<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    payload: Result<Json<CreateLeadRequest>, JsonRejection>,
) -> Result<LeadResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let lead = state
        .lead_service
        .create_lead(user_id, req.name, req.email)
        .await?;
    Ok(LeadResponse::Created(Json(lead)))
}

/// `GET /api/leads/{id}`: get one of the caller's leads.
pub async fn get<RR, LS, LR>(
    State(state): State<AppState<RR, LS, LR>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> Result<LeadResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    let lead_id: LeadId = parse_id(&id)?;
    let lead = state.lead_service.get_lead(user_id, lead_id).await?;
    Ok(LeadResponse::Ok(Json(lead)))
}
