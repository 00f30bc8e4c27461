//! Condition: a boolean expression tree over lead fields.
//!
//! On the wire a condition node is recognised by the keys it carries:
//! `{"all": [...]}`, `{"any": [...]}`, an inline `{"field", "operator",
//! "value"}` leaf, or `{}`. In memory the node is an explicit
//! [`Condition`] variant, and members of `all`/`any` are full nodes so
//! nesting can go arbitrarily deep.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::lead::LeadData;

/// A node of the condition tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub enum Condition {
    /// No constraint at all; always passes.
    #[default]
    Empty,
    /// A single comparison against one lead field.
    Leaf(Predicate),
    /// Conjunction. Vacuously true when empty.
    All(Vec<Condition>),
    /// Disjunction. Vacuously true when empty, like [`Condition::Empty`].
    Any(Vec<Condition>),
}

/// A leaf comparison `data[field] <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

/// Comparison operator of a [`Predicate`].
///
/// Unrecognised operator names are kept in [`Operator::Unknown`] so that a
/// stored rule still loads; such a leaf always evaluates to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    #[serde(untagged)]
    Unknown(String),
}

/// The closed set of literal values a rule can compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Condition {
    /// Shorthand for a leaf node.
    #[must_use]
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<ConditionValue>) -> Self {
        Self::Leaf(Predicate {
            field: field.into(),
            operator,
            value: value.into(),
        })
    }

    /// Evaluate the tree against a lead data snapshot.
    ///
    /// Never fails: missing data, type mismatches and unknown operators all
    /// evaluate to `false` at the leaf.
    #[must_use]
    pub fn evaluate(&self, data: &LeadData) -> bool {
        match self {
            Self::Empty => true,
            Self::Leaf(predicate) => predicate.evaluate(data),
            Self::All(members) => members.iter().all(|c| c.evaluate(data)),
            Self::Any(members) => members.is_empty() || members.iter().any(|c| c.evaluate(data)),
        }
    }

    /// Check that every leaf names a field and uses a known operator.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] or
    /// [`ValidationError::UnknownOperator`] for the first offending leaf.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Empty => Ok(()),
            Self::Leaf(predicate) => predicate.validate(),
            Self::All(members) | Self::Any(members) => {
                members.iter().try_for_each(Condition::validate)
            }
        }
    }
}

/// Evaluate `condition` against `data`. See [`Condition::evaluate`].
#[must_use]
pub fn evaluate(condition: &Condition, data: &LeadData) -> bool {
    condition.evaluate(data)
}

impl Predicate {
    /// Evaluate this leaf. Absent or `null` fields are always `false`.
    #[must_use]
    pub fn evaluate(&self, data: &LeadData) -> bool {
        let Some(actual) = data.get(&self.field).filter(|v| !v.is_null()) else {
            return false;
        };

        match &self.operator {
            Operator::Eq => loose_eq(actual, &self.value),
            Operator::Neq => !loose_eq(actual, &self.value),
            Operator::Gt => self.compare(actual) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                self.compare(actual),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => self.compare(actual) == Some(Ordering::Less),
            Operator::Lte => matches!(
                self.compare(actual),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Contains => self.contains(actual) == Some(true),
            Operator::NotContains => self.contains(actual) == Some(false),
            Operator::Unknown(_) => false,
        }
    }

    /// Numeric ordering of the field against the rule value. Only defined
    /// when both sides are numbers; numeric strings do not qualify.
    fn compare(&self, actual: &Value) -> Option<Ordering> {
        let ConditionValue::Number(expected) = &self.value else {
            return None;
        };
        actual.as_f64()?.partial_cmp(expected)
    }

    /// Case-insensitive substring test. Only defined for two strings.
    fn contains(&self, actual: &Value) -> Option<bool> {
        let (Value::String(haystack), ConditionValue::Text(needle)) = (actual, &self.value) else {
            return None;
        };
        Some(haystack.to_lowercase().contains(&needle.to_lowercase()))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.field.trim().is_empty() {
            return Err(ValidationError::EmptyField);
        }
        if let Operator::Unknown(name) = &self.operator {
            return Err(ValidationError::UnknownOperator(name.clone()));
        }
        Ok(())
    }
}

/// Loose equality kept for compatibility with rules written against the
/// legacy engine:
///
/// - same scalar types compare directly (numbers numerically);
/// - a number and a string compare after parsing the string as a number
///   (surrounding whitespace ignored, empty string is `0`);
/// - a boolean is replaced by `1`/`0` and the comparison is repeated;
/// - arrays and objects never equal a scalar.
#[allow(clippy::float_cmp)]
fn loose_eq(actual: &Value, expected: &ConditionValue) -> bool {
    match (actual, expected) {
        (Value::String(a), ConditionValue::Text(b)) => a == b,
        (Value::Number(a), ConditionValue::Number(b)) => a.as_f64() == Some(*b),
        (Value::Bool(a), ConditionValue::Bool(b)) => a == b,
        (Value::Number(a), ConditionValue::Text(b)) => {
            matches!((a.as_f64(), parse_number(b)), (Some(x), Some(y)) if x == y)
        }
        (Value::String(a), ConditionValue::Number(b)) => parse_number(a) == Some(*b),
        (Value::Bool(a), other) => loose_eq(&Value::from(u8::from(*a)), other),
        (other, ConditionValue::Bool(b)) => {
            loose_eq(other, &ConditionValue::Number(f64::from(u8::from(*b))))
        }
        _ => false,
    }
}

/// Parse a string the way loose equality coerces it to a number.
/// Returns `None` where the coercion would produce NaN.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse().ok()
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ConditionValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Unknown(name) => name,
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (name, members) = match self {
            Self::Empty => return f.write_str("always"),
            Self::Leaf(p) => return write!(f, "{} {} {}", p.field, p.operator, p.value),
            Self::All(members) => ("all", members),
            Self::Any(members) => ("any", members),
        };
        write!(f, "{name}(")?;
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}")?;
        }
        f.write_str(")")
    }
}

/// Key-presence wire shape of a condition node.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<ConditionValue>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = ValidationError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let has_leaf_keys = raw.field.is_some() || raw.operator.is_some() || raw.value.is_some();
        match (raw.all, raw.any, has_leaf_keys) {
            (None, None, false) => Ok(Self::Empty),
            (Some(members), None, false) => Ok(Self::All(members)),
            (None, Some(members), false) => Ok(Self::Any(members)),
            (None, None, true) => match (raw.field, raw.operator, raw.value) {
                (Some(field), Some(operator), Some(value)) => Ok(Self::Leaf(Predicate {
                    field,
                    operator,
                    value,
                })),
                _ => Err(ValidationError::MalformedCondition(
                    "a leaf needs `field`, `operator` and `value`".to_string(),
                )),
            },
            _ => Err(ValidationError::MalformedCondition(
                "a node must use exactly one of `all`, `any` or an inline leaf".to_string(),
            )),
        }
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Empty => Self::default(),
            Condition::Leaf(p) => Self {
                field: Some(p.field),
                operator: Some(p.operator),
                value: Some(p.value),
                ..Self::default()
            },
            Condition::All(members) => Self {
                all: Some(members),
                ..Self::default()
            },
            Condition::Any(members) => Self {
                any: Some(members),
                ..Self::default()
            },
        }
    }
}
