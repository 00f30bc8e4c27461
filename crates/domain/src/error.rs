//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LeadHubError`] via `#[from]` (or an explicit `From` impl for boxed
//! adapter errors).

/// Top-level error shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum LeadHubError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceededError),

    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant or input schema was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("a rule needs at least one action")]
    NoActions,

    #[error("condition field must not be empty")]
    EmptyField,

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("unknown action type `{0}`")]
    UnknownActionType(String),

    #[error("unknown trigger type `{0}`")]
    UnknownTriggerType(String),

    #[error("malformed condition: {0}")]
    MalformedCondition(String),

    #[error("malformed action group: {0}")]
    MalformedActionGroup(String),

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// The requested record does not exist or is not owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A per-user limit would be exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("limite raggiunto: massimo {limit} regole per utente")]
pub struct QuotaExceededError {
    pub limit: usize,
}
