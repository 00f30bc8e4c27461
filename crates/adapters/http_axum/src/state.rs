//! Shared application state for axum handlers.

use std::sync::Arc;

use leadhub_app::ports::{ExecutionLogRepository, LeadStore, RuleRepository};
use leadhub_app::rule_engine::RuleEngine;
use leadhub_app::services::execution_log_service::ExecutionLogService;
use leadhub_app::services::lead_service::LeadService;
use leadhub_app::services::rule_service::RuleService;

/// Application state shared across all axum handlers.
///
/// Generic over the rule repository, lead store and execution log to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<RR, LS, LR> {
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<RR>>,
    /// Lead create/read service.
    pub lead_service: Arc<LeadService<LS>>,
    /// Audit trail queries.
    pub log_service: Arc<ExecutionLogService<LR>>,
    /// Trigger execution.
    pub engine: Arc<RuleEngine<RR, LS, LR>>,
}

impl<RR, LS, LR> Clone for AppState<RR, LS, LR> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            lead_service: Arc::clone(&self.lead_service),
            log_service: Arc::clone(&self.log_service),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<RR, LS, LR> AppState<RR, LS, LR>
where
    RR: RuleRepository + Send + Sync + 'static,
    LS: LeadStore + Send + Sync + 'static,
    LR: ExecutionLogRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        rule_service: RuleService<RR>,
        lead_service: LeadService<LS>,
        log_service: ExecutionLogService<LR>,
        engine: RuleEngine<RR, LS, LR>,
    ) -> Self {
        Self {
            rule_service: Arc::new(rule_service),
            lead_service: Arc::new(lead_service),
            log_service: Arc::new(log_service),
            engine: Arc::new(engine),
        }
    }
}
