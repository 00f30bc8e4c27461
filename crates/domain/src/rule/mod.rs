//! Automation rule: trigger type → condition tree → action group.
//!
//! A rule belongs to one user and listens to one [`TriggerType`]. When a
//! trigger of that type fires for a lead, the rule's [`Condition`] is
//! evaluated against the lead data and, if it holds, the rule's
//! [`ActionGroup`] runs.

mod action;
mod condition;
mod trigger;

pub use action::{Action, ActionGroup, ActionType};
pub use condition::{Condition, ConditionValue, Operator, Predicate, evaluate};
pub use trigger::TriggerType;

use serde::{Deserialize, Serialize};

use crate::error::{LeadHubError, ValidationError};
use crate::id::{RuleId, UserId};
use crate::time::Timestamp;

/// Longest accepted rule name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Default number of rules (active and inactive) a single user may own.
pub const DEFAULT_MAX_RULES_PER_USER: usize = 20;

/// A user-defined automation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub user_id: UserId,
    pub name: String,
    pub trigger_type: TriggerType,
    pub condition: Condition,
    pub action: ActionGroup,
    pub is_active: bool,
    pub execution_count: u64,
    pub last_executed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`]) or too long
    /// - the condition tree has a blank field or an unknown operator
    /// - the action group is empty or names an unknown action type
    pub fn validate(&self) -> Result<(), LeadHubError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN }.into());
        }
        self.condition.validate()?;
        self.action.validate()?;
        Ok(())
    }

    /// Whether this rule should be considered for `trigger_type`.
    #[must_use]
    pub fn listens_to(&self, trigger_type: TriggerType) -> bool {
        self.is_active && self.trigger_type == trigger_type
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    user_id: Option<UserId>,
    name: Option<String>,
    trigger_type: Option<TriggerType>,
    condition: Condition,
    action: ActionGroup,
    is_active: Option<bool>,
    created_at: Option<Timestamp>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn trigger_type(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = Some(trigger_type);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<ActionGroup>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::Validation`] if the name is missing or the
    /// condition/action trees are invalid.
    pub fn build(self) -> Result<AutomationRule, LeadHubError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            user_id: self.user_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            trigger_type: self.trigger_type.unwrap_or(TriggerType::NewLead),
            condition: self.condition,
            action: self.action,
            is_active: self.is_active.unwrap_or(true),
            execution_count: 0,
            last_executed_at: None,
            created_at,
            updated_at: created_at,
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// Client-supplied fields of a new rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub action: ActionGroup,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RuleDraft {
    /// Turn the draft into a validated rule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::Validation`] when the draft breaks a rule invariant.
    pub fn into_rule(self, user_id: UserId) -> Result<AutomationRule, LeadHubError> {
        AutomationRule::builder()
            .user_id(user_id)
            .name(self.name.trim())
            .trigger_type(self.trigger_type)
            .condition(self.condition)
            .action(self.action)
            .is_active(self.is_active)
            .build()
    }
}

/// Partial update of a rule; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulePatch {
    pub name: Option<String>,
    pub trigger_type: Option<TriggerType>,
    pub condition: Option<Condition>,
    pub action: Option<ActionGroup>,
    pub is_active: Option<bool>,
}

impl RulePatch {
    /// Apply the patch onto `rule` and bump `updated_at`.
    ///
    /// Counters and ownership are never touched by a patch.
    pub fn apply(self, rule: &mut AutomationRule, now: Timestamp) {
        if let Some(name) = self.name {
            rule.name = name.trim().to_string();
        }
        if let Some(trigger_type) = self.trigger_type {
            rule.trigger_type = trigger_type;
        }
        if let Some(condition) = self.condition {
            rule.condition = condition;
        }
        if let Some(action) = self.action {
            rule.action = action;
        }
        if let Some(is_active) = self.is_active {
            rule.is_active = is_active;
        }
        rule.updated_at = now;
    }
}

/// Optional filters for listing a user's rules.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RuleFilter {
    pub trigger_type: Option<TriggerType>,
    pub is_active: Option<bool>,
}

impl RuleFilter {
    /// Whether `rule` passes every set filter.
    #[must_use]
    pub fn matches(&self, rule: &AutomationRule) -> bool {
        self.trigger_type.is_none_or(|t| rule.trigger_type == t)
            && self.is_active.is_none_or(|a| rule.is_active == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_rule() -> AutomationRule {
        AutomationRule::builder()
            .name("Budget alto")
            .trigger_type(TriggerType::NewLead)
            .condition(Condition::All(vec![Condition::leaf(
                "budget",
                Operator::Gte,
                300_000,
            )]))
            .action(vec![Action::with_value(ActionType::UpdatePriority, "high")])
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_rule_with_defaults() {
        let rule = valid_rule();
        assert_eq!(rule.name, "Budget alto");
        assert!(rule.is_active);
        assert_eq!(rule.execution_count, 0);
        assert!(rule.last_executed_at.is_none());
        assert_eq!(rule.created_at, rule.updated_at);
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = AutomationRule::builder()
            .name("   ")
            .action(Action::with_value(ActionType::AddNote, "x"))
            .build();
        assert!(matches!(
            result,
            Err(LeadHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_name_is_too_long() {
        let result = AutomationRule::builder()
            .name("x".repeat(MAX_NAME_LEN + 1))
            .action(Action::with_value(ActionType::AddNote, "x"))
            .build();
        assert!(matches!(
            result,
            Err(LeadHubError::Validation(ValidationError::NameTooLong { .. }))
        ));
    }

    #[test]
    fn should_return_validation_error_when_action_group_is_empty() {
        let result = AutomationRule::builder().name("No actions").build();
        assert!(matches!(
            result,
            Err(LeadHubError::Validation(ValidationError::NoActions))
        ));
    }

    #[test]
    fn should_return_validation_error_for_unknown_operator() {
        let result = AutomationRule::builder()
            .name("Bad operator")
            .condition(Condition::leaf("status", Operator::Unknown("is".into()), "new"))
            .action(Action::with_value(ActionType::AddNote, "x"))
            .build();
        assert!(matches!(
            result,
            Err(LeadHubError::Validation(ValidationError::UnknownOperator(_)))
        ));
    }

    #[test]
    fn should_listen_only_when_active_and_trigger_matches() {
        let mut rule = valid_rule();
        assert!(rule.listens_to(TriggerType::NewLead));
        assert!(!rule.listens_to(TriggerType::StatusChanged));
        rule.is_active = false;
        assert!(!rule.listens_to(TriggerType::NewLead));
    }

    #[test]
    fn should_apply_only_provided_patch_fields() {
        let mut rule = valid_rule();
        let before = rule.clone();
        let patch: RulePatch =
            serde_json::from_value(json!({"name": "Rinominata", "is_active": false})).unwrap();
        let later = before.updated_at + chrono::Duration::seconds(5);
        patch.apply(&mut rule, later);

        assert_eq!(rule.name, "Rinominata");
        assert!(!rule.is_active);
        assert_eq!(rule.trigger_type, before.trigger_type);
        assert_eq!(rule.condition, before.condition);
        assert_eq!(rule.action, before.action);
        assert_eq!(rule.updated_at, later);
        assert_eq!(rule.created_at, before.created_at);
    }

    #[test]
    fn should_filter_by_trigger_and_activity() {
        let rule = valid_rule();
        assert!(RuleFilter::default().matches(&rule));
        let by_trigger = RuleFilter {
            trigger_type: Some(TriggerType::ScoreUpdated),
            is_active: None,
        };
        assert!(!by_trigger.matches(&rule));
        let inactive_only = RuleFilter {
            trigger_type: None,
            is_active: Some(false),
        };
        assert!(!inactive_only.matches(&rule));
    }

    #[test]
    fn should_build_rule_from_draft_with_defaults() {
        let draft: RuleDraft = serde_json::from_value(json!({
            "name": "  Nuovo lead  ",
            "trigger_type": "new_lead",
            "action": {"type": "add_note", "value": "benvenuto"}
        }))
        .unwrap();
        let user_id = UserId::new();
        let rule = draft.into_rule(user_id).unwrap();
        assert_eq!(rule.name, "Nuovo lead");
        assert_eq!(rule.user_id, user_id);
        assert!(rule.is_active);
        assert_eq!(rule.condition, Condition::Empty);
    }

    #[test]
    fn should_reject_draft_with_unknown_trigger_type() {
        let result: Result<RuleDraft, _> = serde_json::from_value(json!({
            "name": "x",
            "trigger_type": "lead_deleted",
            "action": {"type": "add_note", "value": "x"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn should_roundtrip_rule_through_serde_json() {
        let rule = valid_rule();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["condition"]["all"][0]["field"], "budget");
        assert_eq!(json["action"]["actions"][0]["type"], "update_priority");
        let parsed: AutomationRule = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.id, rule.id);
        assert_eq!(parsed.condition, rule.condition);
        assert_eq!(parsed.action, rule.action);
    }
}
