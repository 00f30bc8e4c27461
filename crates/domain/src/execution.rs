//! Execution: trigger input, per-rule outcomes, and the audit log entry.

use serde::{Deserialize, Serialize};

use crate::id::{ExecutionLogId, LeadId, RuleId, UserId};
use crate::lead::LeadData;
use crate::rule::{ActionGroup, ActionType, AutomationRule, Condition, TriggerType};
use crate::time::Timestamp;

/// Separator between failed action messages in [`ExecutionLogEntry::error_message`].
pub const ERROR_SEPARATOR: &str = "; ";

/// A business event on a lead, as received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub trigger_type: TriggerType,
    pub lead_id: LeadId,
    #[serde(default)]
    pub lead_data: LeadData,
    /// Accepted for forward compatibility; not read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<LeadData>,
}

/// Outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAction {
    pub action: ActionType,
    pub success: bool,
    pub message: String,
}

impl AppliedAction {
    #[must_use]
    pub fn succeeded(action: ActionType, message: impl Into<String>) -> Self {
        Self {
            action,
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(action: ActionType, message: impl Into<String>) -> Self {
        Self {
            action,
            success: false,
            message: message.into(),
        }
    }
}

/// What happened to one rule during an invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub matched: bool,
    pub actions_applied: Vec<AppliedAction>,
}

impl RuleOutcome {
    /// Outcome of a rule whose condition did not hold.
    #[must_use]
    pub fn unmatched(rule: &AutomationRule) -> Self {
        Self {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            matched: false,
            actions_applied: Vec::new(),
        }
    }

    /// Outcome of a rule whose actions ran.
    #[must_use]
    pub fn matched(rule: &AutomationRule, actions_applied: Vec<AppliedAction>) -> Self {
        Self {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            matched: true,
            actions_applied,
        }
    }
}

/// Summary returned for one trigger invocation.
///
/// `success` is always `true` once the invocation ran; callers inspect
/// `results[].actions_applied[].success` for per-action failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub success: bool,
    pub executed: usize,
    pub total_rules: usize,
    pub results: Vec<RuleOutcome>,
    pub message: String,
}

impl ExecutionReport {
    /// Aggregate per-rule outcomes into a report.
    #[must_use]
    pub fn from_outcomes(results: Vec<RuleOutcome>) -> Self {
        let total_rules = results.len();
        let executed = results.iter().filter(|r| r.matched).count();
        let message = if total_rules == 0 {
            "Nessuna regola attiva per questo trigger".to_string()
        } else {
            format!("{executed} regole eseguite su {total_rules} valutate")
        };
        Self {
            success: true,
            executed,
            total_rules,
            results,
            message,
        }
    }
}

/// Immutable audit record of one matched rule for one trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub id: ExecutionLogId,
    pub rule_id: RuleId,
    pub lead_id: LeadId,
    pub user_id: UserId,
    pub trigger_type: TriggerType,
    /// Condition tree as it was when evaluated.
    pub condition_matched: Condition,
    /// Action tree as it was when run.
    pub action_applied: ActionGroup,
    /// `true` iff every action succeeded.
    pub success: bool,
    /// Failed action messages joined by [`ERROR_SEPARATOR`].
    pub error_message: Option<String>,
    pub executed_at: Timestamp,
}

impl ExecutionLogEntry {
    /// Snapshot `rule` and the outcomes of its actions.
    #[must_use]
    pub fn record(
        rule: &AutomationRule,
        lead_id: LeadId,
        applied: &[AppliedAction],
        executed_at: Timestamp,
    ) -> Self {
        let failures: Vec<&str> = applied
            .iter()
            .filter(|a| !a.success)
            .map(|a| a.message.as_str())
            .collect();
        Self {
            id: ExecutionLogId::new(),
            rule_id: rule.id,
            lead_id,
            user_id: rule.user_id,
            trigger_type: rule.trigger_type,
            condition_matched: rule.condition.clone(),
            action_applied: rule.action.clone(),
            success: failures.is_empty(),
            error_message: (!failures.is_empty()).then(|| failures.join(ERROR_SEPARATOR)),
            executed_at,
        }
    }
}

/// Filters for reading the audit trail. Always scoped to one user.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLogQuery {
    pub user_id: UserId,
    pub rule_id: Option<RuleId>,
    pub lead_id: Option<LeadId>,
    pub limit: usize,
}

impl ExecutionLogQuery {
    /// Whether `entry` passes every set filter.
    #[must_use]
    pub fn matches(&self, entry: &ExecutionLogEntry) -> bool {
        entry.user_id == self.user_id
            && self.rule_id.is_none_or(|id| entry.rule_id == id)
            && self.lead_id.is_none_or(|id| entry.lead_id == id)
    }
}
