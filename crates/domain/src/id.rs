//! Typed identifier newtypes backed by UUIDs.
//!
//! Every record kind gets its own id type so a rule id can never be passed
//! where a lead id is expected. All of them travel as hyphenated UUID text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Generate a fresh random (v4) identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::try_parse(s)
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidId(s.to_string()))
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`AutomationRule`](crate::rule::AutomationRule).
    RuleId
);

define_id!(
    /// Unique identifier for a [`Lead`](crate::lead::Lead).
    LeadId
);

define_id!(
    /// Unique identifier for the owning user (tenant) of rules and leads.
    UserId
);

define_id!(
    /// Unique identifier for an [`ExecutionLogEntry`](crate::execution::ExecutionLogEntry).
    ExecutionLogId
);

define_id!(
    /// Unique identifier for a [`LeadAssignment`](crate::lead::LeadAssignment).
    AssignmentId
);

define_id!(
    /// Unique identifier for a [`LeadNote`](crate::lead::LeadNote).
    NoteId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = RuleId::new();
        let b = RuleId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = LeadId::new();
        let parsed: LeadId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_plain_uuid_string() {
        let uuid = uuid::Uuid::new_v4();
        let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn should_return_validation_error_when_parsing_invalid_uuid() {
        assert_eq!(
            UserId::from_str("not-a-uuid"),
            Err(ValidationError::InvalidId("not-a-uuid".to_string()))
        );
    }
}
