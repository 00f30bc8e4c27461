//! Lead: the CRM record rules react to, plus the records actions create.

use serde::{Deserialize, Serialize};

use crate::error::{LeadHubError, ValidationError};
use crate::id::{AssignmentId, LeadId, NoteId, RuleId, UserId};
use crate::time::Timestamp;

/// Flat, string-keyed snapshot of lead fields supplied with a trigger.
///
/// Conditions are evaluated against this map only; the engine never
/// re-reads the lead to build it.
pub type LeadData = serde_json::Map<String, serde_json::Value>;

/// Status a lead starts in.
pub const DEFAULT_STATUS: &str = "new";

/// Priority a lead starts with.
pub const DEFAULT_PRIORITY: &str = "medium";

/// A sales lead owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: Timestamp,
}

impl Lead {
    /// Create a lead with default status and priority.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        email: Option<String>,
    ) -> Result<Self, LeadHubError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id: LeadId::new(),
            user_id,
            name,
            email,
            status: DEFAULT_STATUS.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            created_at: crate::time::now(),
        })
    }
}

/// Lead fields that actions are allowed to overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Status,
    Priority,
}

impl LeadField {
    /// Column / wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
        }
    }
}

impl std::fmt::Display for LeadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hand-off of a lead to an assignee, created by an `assign_to` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAssignment {
    pub id: AssignmentId,
    pub lead_id: LeadId,
    pub user_id: UserId,
    pub assigned_to: String,
    /// Rule that produced the assignment.
    pub rule_id: RuleId,
    pub note: String,
    pub created_at: Timestamp,
}

impl LeadAssignment {
    /// Build the assignment an automation rule makes.
    #[must_use]
    pub fn by_rule(lead_id: LeadId, user_id: UserId, assigned_to: String, rule_id: RuleId) -> Self {
        Self {
            id: AssignmentId::new(),
            lead_id,
            user_id,
            note: format!("Assegnato automaticamente dalla regola {rule_id}"),
            assigned_to,
            rule_id,
            created_at: crate::time::now(),
        }
    }
}

/// Where a note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSource {
    Manual,
    Automation,
}

impl NoteSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automation => "automation",
        }
    }
}

/// Free-text note attached to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadNote {
    pub id: NoteId,
    pub lead_id: LeadId,
    pub user_id: UserId,
    pub content: String,
    pub source: NoteSource,
    pub rule_id: Option<RuleId>,
    pub created_at: Timestamp,
}

impl LeadNote {
    /// Build a note tagged as automation-originated.
    #[must_use]
    pub fn by_rule(lead_id: LeadId, user_id: UserId, content: String, rule_id: RuleId) -> Self {
        Self {
            id: NoteId::new(),
            lead_id,
            user_id,
            content,
            source: NoteSource::Automation,
            rule_id: Some(rule_id),
            created_at: crate::time::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_lead_with_default_status_and_priority() {
        let lead = Lead::new(UserId::new(), "Mario Rossi", None).unwrap();
        assert_eq!(lead.status, "new");
        assert_eq!(lead.priority, "medium");
    }

    #[test]
    fn should_reject_lead_with_blank_name() {
        let result = Lead::new(UserId::new(), "", None);
        assert!(matches!(
            result,
            Err(LeadHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_record_rule_provenance_on_assignment() {
        let rule_id = RuleId::new();
        let a = LeadAssignment::by_rule(LeadId::new(), UserId::new(), "giulia".into(), rule_id);
        assert_eq!(a.rule_id, rule_id);
        assert!(a.note.contains(&rule_id.to_string()));
    }

    #[test]
    fn should_tag_rule_notes_as_automation() {
        let note = LeadNote::by_rule(LeadId::new(), UserId::new(), "ciao".into(), RuleId::new());
        assert_eq!(note.source, NoteSource::Automation);
        assert!(note.rule_id.is_some());
    }
}
