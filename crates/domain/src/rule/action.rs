//! Action: the side effect performed on a lead when a rule matches.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of side effect an [`Action`] performs.
///
/// Names not in the built-in set are preserved in [`ActionType::Other`] so
/// rules stored before a handler was removed still load; the executor
/// reports them as unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    UpdateStatus,
    UpdatePriority,
    AssignTo,
    AddNote,
    TriggerLeadScore,
    TriggerEnrichment,
    SendEmail,
    #[serde(untagged)]
    Other(String),
}

impl ActionType {
    /// The action types the engine ships handlers for.
    pub const BUILTIN: [Self; 7] = [
        Self::UpdateStatus,
        Self::UpdatePriority,
        Self::AssignTo,
        Self::AddNote,
        Self::TriggerLeadScore,
        Self::TriggerEnrichment,
        Self::SendEmail,
    ];

    /// Return the wire name, e.g. `"update_status"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UpdateStatus => "update_status",
            Self::UpdatePriority => "update_priority",
            Self::AssignTo => "assign_to",
            Self::AddNote => "add_note",
            Self::TriggerLeadScore => "trigger_lead_score",
            Self::TriggerEnrichment => "trigger_enrichment",
            Self::SendEmail => "send_email",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side effect with its optional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// New status/priority, assignee, note text, …
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Email template name, only read by `send_email`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Action {
    /// An action of `action_type` with no parameters.
    #[must_use]
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            value: None,
            template: None,
        }
    }

    /// An action of `action_type` carrying `value`.
    #[must_use]
    pub fn with_value(action_type: ActionType, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(action_type)
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({value})", self.action_type),
            None => write!(f, "{}", self.action_type),
        }
    }
}

/// The body of a rule: what to do when its condition matches.
///
/// Wire shapes: `{"actions": [...]}` for an ordered list, an inline
/// `{"type", "value", "template"}` for a single action, `{}` for nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawActionGroup", into = "RawActionGroup")]
pub enum ActionGroup {
    #[default]
    Empty,
    Single(Action),
    Sequence(Vec<Action>),
}

impl ActionGroup {
    /// The actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        match self {
            Self::Empty => &[],
            Self::Single(action) => std::slice::from_ref(action),
            Self::Sequence(actions) => actions,
        }
    }

    /// Check the group is non-empty and every action type is known.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoActions`] for an empty group or
    /// [`ValidationError::UnknownActionType`] for the first unknown type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let actions = self.actions();
        if actions.is_empty() {
            return Err(ValidationError::NoActions);
        }
        for action in actions {
            if let ActionType::Other(name) = &action.action_type {
                return Err(ValidationError::UnknownActionType(name.clone()));
            }
        }
        Ok(())
    }
}

impl From<Vec<Action>> for ActionGroup {
    fn from(actions: Vec<Action>) -> Self {
        if actions.is_empty() {
            Self::Empty
        } else {
            Self::Sequence(actions)
        }
    }
}

impl From<Action> for ActionGroup {
    fn from(action: Action) -> Self {
        Self::Single(action)
    }
}

/// Key-presence wire shape of an action group.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawActionGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<Action>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    action_type: Option<ActionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
}

impl TryFrom<RawActionGroup> for ActionGroup {
    type Error = ValidationError;

    fn try_from(raw: RawActionGroup) -> Result<Self, Self::Error> {
        let list = raw.actions.filter(|actions| !actions.is_empty());
        let has_inline_params = raw.value.is_some() || raw.template.is_some();

        match (list, raw.action_type) {
            (Some(_), Some(_)) => Err(ValidationError::MalformedActionGroup(
                "use either `actions` or an inline `type`, not both".to_string(),
            )),
            (Some(_), None) if has_inline_params => Err(ValidationError::MalformedActionGroup(
                "`value`/`template` belong inside the `actions` entries".to_string(),
            )),
            (Some(actions), None) => Ok(Self::Sequence(actions)),
            (None, Some(action_type)) => Ok(Self::Single(Action {
                action_type,
                value: raw.value,
                template: raw.template,
            })),
            (None, None) if has_inline_params => Err(ValidationError::MalformedActionGroup(
                "an inline action needs a `type`".to_string(),
            )),
            (None, None) => Ok(Self::Empty),
        }
    }
}

impl From<ActionGroup> for RawActionGroup {
    fn from(group: ActionGroup) -> Self {
        match group {
            ActionGroup::Empty => Self::default(),
            ActionGroup::Single(action) => Self {
                action_type: Some(action.action_type),
                value: action.value,
                template: action.template,
                ..Self::default()
            },
            ActionGroup::Sequence(actions) => Self {
                actions: Some(actions),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_ordered_action_list() {
        let group: ActionGroup = serde_json::from_value(json!({"actions": [
            {"type": "update_status", "value": "contacted"},
            {"type": "add_note", "value": "follow up"}
        ]}))
        .unwrap();
        let actions = group.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type, ActionType::UpdateStatus);
        assert_eq!(actions[1].value.as_deref(), Some("follow up"));
    }

    #[test]
    fn should_parse_inline_single_action() {
        let group: ActionGroup =
            serde_json::from_value(json!({"type": "send_email", "template": "welcome"})).unwrap();
        assert!(matches!(
            &group,
            ActionGroup::Single(a) if a.action_type == ActionType::SendEmail
                && a.template.as_deref() == Some("welcome")
        ));
    }

    #[test]
    fn should_fall_back_to_inline_action_when_list_is_empty() {
        let group: ActionGroup =
            serde_json::from_value(json!({"actions": [], "type": "add_note", "value": "x"}))
                .unwrap();
        assert!(matches!(group, ActionGroup::Single(_)));
    }

    #[test]
    fn should_parse_empty_group() {
        let group: ActionGroup = serde_json::from_value(json!({})).unwrap();
        assert_eq!(group, ActionGroup::Empty);
        let group: ActionGroup = serde_json::from_value(json!({"actions": []})).unwrap();
        assert_eq!(group, ActionGroup::Empty);
        assert!(group.actions().is_empty());
    }

    #[test]
    fn should_reject_list_and_inline_type_together() {
        let result: Result<ActionGroup, _> = serde_json::from_value(json!({
            "actions": [{"type": "add_note", "value": "a"}],
            "type": "update_status"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_inline_value_without_type() {
        let result: Result<ActionGroup, _> = serde_json::from_value(json!({"value": "hot"}));
        assert!(result.is_err());
    }

    #[test]
    fn should_keep_unknown_action_type_by_name() {
        let action: Action =
            serde_json::from_value(json!({"type": "send_sms", "value": "hi"})).unwrap();
        assert_eq!(action.action_type, ActionType::Other("send_sms".to_string()));
        assert_eq!(action.action_type.to_string(), "send_sms");
    }

    #[test]
    fn should_serialize_back_to_wire_shapes() {
        let single = ActionGroup::Single(Action::with_value(ActionType::UpdatePriority, "high"));
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"type": "update_priority", "value": "high"})
        );
        let seq = ActionGroup::from(vec![Action::new(ActionType::TriggerLeadScore)]);
        assert_eq!(
            serde_json::to_value(&seq).unwrap(),
            json!({"actions": [{"type": "trigger_lead_score"}]})
        );
    }

    #[test]
    fn should_reject_empty_group_on_validate() {
        assert_eq!(ActionGroup::Empty.validate(), Err(ValidationError::NoActions));
    }

    #[test]
    fn should_reject_unknown_type_on_validate() {
        let group = ActionGroup::from(vec![
            Action::with_value(ActionType::AddNote, "ok"),
            Action::new(ActionType::Other("fax".to_string())),
        ]);
        assert_eq!(
            group.validate(),
            Err(ValidationError::UnknownActionType("fax".to_string()))
        );
    }

    #[test]
    fn should_display_action_with_value() {
        let a = Action::with_value(ActionType::AssignTo, "mario");
        assert_eq!(a.to_string(), "assign_to(mario)");
        assert_eq!(Action::new(ActionType::SendEmail).to_string(), "send_email");
    }
}
