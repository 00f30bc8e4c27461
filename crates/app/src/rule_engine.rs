//! Rule engine: runs a user's active rules against one trigger on a lead.
//!
//! For every rule listening to the trigger (oldest first), the condition
//! tree is evaluated against the caller-supplied lead snapshot. Matched
//! rules run their actions through the [`ActionRegistry`], bump their
//! execution counter and leave one entry in the audit log. Rules that do
//! not match leave no trace besides their result record.

use leadhub_domain::error::{LeadHubError, NotFoundError};
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionReport, RuleOutcome, TriggerRequest};
use leadhub_domain::id::UserId;
use leadhub_domain::rule::AutomationRule;

use crate::actions::{ActionContext, ActionRegistry};
use crate::ports::{ExecutionLogRepository, LeadStore, RuleRepository};

/// Evaluates and executes automation rules for trigger events.
pub struct RuleEngine<R, S, L> {
    rules: R,
    leads: S,
    logs: L,
    registry: ActionRegistry<S>,
}

impl<R, S, L> RuleEngine<R, S, L>
where
    R: RuleRepository + Send + Sync,
    S: LeadStore + Send + Sync + 'static,
    L: ExecutionLogRepository + Send + Sync,
{
    /// Create an engine with the built-in action handlers.
    pub fn new(rules: R, leads: S, logs: L) -> Self {
        Self::with_registry(rules, leads, logs, ActionRegistry::with_builtin())
    }

    /// Create an engine with a custom action registry.
    pub fn with_registry(rules: R, leads: S, logs: L, registry: ActionRegistry<S>) -> Self {
        Self {
            rules,
            leads,
            logs,
            registry,
        }
    }

    /// Run every active rule of `user_id` listening to the trigger.
    ///
    /// Per-action failures are reported in the result, never as an error.
    /// Failing to record a counter or an audit entry is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::NotFound`] when the lead does not exist or
    /// belongs to another user, and a storage error when the rules or the
    /// lead cannot be loaded.
    #[tracing::instrument(
        skip(self, request),
        fields(trigger = %request.trigger_type, lead_id = %request.lead_id)
    )]
    pub async fn execute(
        &self,
        user_id: UserId,
        request: &TriggerRequest,
    ) -> Result<ExecutionReport, LeadHubError> {
        if self
            .leads
            .get_lead(user_id, request.lead_id)
            .await?
            .is_none()
        {
            return Err(NotFoundError {
                entity: "Lead",
                id: request.lead_id.to_string(),
            }
            .into());
        }

        let rules = self
            .rules
            .list_active_for_trigger(user_id, request.trigger_type)
            .await?;

        let mut results = Vec::with_capacity(rules.len());
        for rule in &rules {
            results.push(self.run_rule(rule, request).await);
        }

        let report = ExecutionReport::from_outcomes(results);
        tracing::info!(
            executed = report.executed,
            total_rules = report.total_rules,
            "trigger processed"
        );
        Ok(report)
    }

    async fn run_rule(&self, rule: &AutomationRule, request: &TriggerRequest) -> RuleOutcome {
        if !rule.condition.evaluate(&request.lead_data) {
            tracing::debug!(rule_id = %rule.id, rule_name = %rule.name, "condition not met");
            return RuleOutcome::unmatched(rule);
        }
        tracing::debug!(rule_id = %rule.id, rule_name = %rule.name, "condition met");

        let ctx = ActionContext {
            lead_id: request.lead_id,
            user_id: rule.user_id,
            rule_id: rule.id,
        };
        let applied = self.registry.run(&self.leads, &ctx, &rule.action).await;

        let now = leadhub_domain::time::now();
        if let Err(err) = self.rules.record_execution(rule.id, now).await {
            tracing::error!(rule_id = %rule.id, error = %err, "failed to record rule execution");
        }
        let entry = ExecutionLogEntry::record(rule, request.lead_id, &applied, now);
        if let Err(err) = self.logs.append(entry).await {
            tracing::error!(rule_id = %rule.id, error = %err, "failed to append execution log");
        }

        RuleOutcome::matched(rule, applied)
    }
}
