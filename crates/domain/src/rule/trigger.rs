//! Trigger type: the lead lifecycle event that activates rule evaluation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Category of lead event a rule listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    NewLead,
    ScoreUpdated,
    StatusChanged,
    PriorityChanged,
    MarketChanged,
}

impl TriggerType {
    /// Every trigger type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::NewLead,
        Self::ScoreUpdated,
        Self::StatusChanged,
        Self::PriorityChanged,
        Self::MarketChanged,
    ];

    /// Return the wire name, e.g. `"new_lead"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewLead => "new_lead",
            Self::ScoreUpdated => "score_updated",
            Self::StatusChanged => "status_changed",
            Self::PriorityChanged => "priority_changed",
            Self::MarketChanged => "market_changed",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTriggerType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_wire_name() {
        for t in TriggerType::ALL {
            assert_eq!(t.as_str().parse::<TriggerType>().unwrap(), t);
        }
    }

    #[test]
    fn should_reject_unknown_trigger_name() {
        let err = "lead_deleted".parse::<TriggerType>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTriggerType("lead_deleted".to_string())
        );
    }

    #[test]
    fn should_deserialize_from_snake_case_json() {
        let t: TriggerType = serde_json::from_str("\"market_changed\"").unwrap();
        assert_eq!(t, TriggerType::MarketChanged);
    }
}
