//! Types to specify conditions on trace data.
//!
//! The root type is [`RuleCondition`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::getter::{Getter, Val};
use crate::glob::GlobPatterns;
use crate::utils;

/// Options for [`EqCondition`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EqCondOptions {
    /// If `true`, string values are compared in case-insensitive mode.
    ///
    /// This has no effect on null, UUID or boolean comparisons.
    #[serde(default)]
    pub ignore_case: bool,
}

/// A condition that compares values for equality.
///
/// This operator supports:
///  - `null`, which matches a missing field
///  - boolean
///  - strings (with `ignore_case` flag)
///  - UUIDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqCondition {
    /// Path of the field that should match the value.
    pub name: String,

    /// The value to check against.
    ///
    /// When comparing with a string field, this value can be an array. The condition matches if any
    /// of the provided values matches the field.
    pub value: Value,

    /// Configuration options for the condition.
    #[serde(default, skip_serializing_if = "utils::is_default")]
    pub options: EqCondOptions,
}

impl EqCondition {
    fn cmp(&self, left: &str, right: &str) -> bool {
        if self.options.ignore_case {
            unicase::eq(left, right)
        } else {
            left == right
        }
    }

    fn matches<T>(&self, instance: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        match (instance.get_value(self.name.as_str()), &self.value) {
            (None, Value::Null) => true,
            (Some(Val::String(f)), Value::String(val)) => self.cmp(f, val),
            (Some(Val::String(f)), Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str())
                .any(|v| self.cmp(v, f)),
            (Some(Val::Uuid(f)), Value::String(val)) => Some(f) == val.parse().ok(),
            (Some(Val::Bool(f)), Value::Bool(v)) => f == *v,
            _ => false,
        }
    }
}

/// A condition that uses glob matching.
///
/// This is similar to [`EqCondition`], but it allows for wildcards in `value`. This is slightly
/// more expensive to construct and check, so preferrably use [`EqCondition`] when no wildcard
/// matching is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobCondition {
    /// Path of the field that should match the value.
    pub name: String,
    /// A list of glob patterns to check.
    ///
    /// Note that this cannot be a single value, it must be a list of values.
    pub value: GlobPatterns,
}

impl GlobCondition {
    fn matches<T>(&self, instance: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        instance
            .get_value(self.name.as_str())
            .and_then(|value| value.as_str())
            .is_some_and(|s| self.value.is_match(s))
    }
}

/// Combines multiple conditions using logical OR.
///
/// This condition matches if **any** of the inner conditions matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrCondition {
    /// Inner rules to combine.
    pub inner: Vec<RuleCondition>,
}

impl OrCondition {
    fn supported(&self) -> bool {
        self.inner.iter().all(RuleCondition::supported)
    }

    fn matches<T>(&self, value: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        self.inner.iter().any(|cond| cond.matches(value))
    }
}

/// Combines multiple conditions using logical AND.
///
/// This condition matches if **all** of the inner conditions matches. An empty list of inner
/// conditions therefore always matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndCondition {
    /// Inner rules to combine.
    pub inner: Vec<RuleCondition>,
}

impl AndCondition {
    fn supported(&self) -> bool {
        self.inner.iter().all(RuleCondition::supported)
    }

    fn matches<T>(&self, value: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        self.inner.iter().all(|cond| cond.matches(value))
    }
}

/// Applies logical NOT to a condition.
///
/// This condition matches if the inner condition does not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotCondition {
    /// An inner rule to negate.
    pub inner: Box<RuleCondition>,
}

impl NotCondition {
    fn supported(&self) -> bool {
        self.inner.supported()
    }

    fn matches<T>(&self, value: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        !self.inner.matches(value)
    }
}

/// A condition from a sampling rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum RuleCondition {
    /// A condition that compares values for equality.
    Eq(EqCondition),
    /// A condition that uses glob matching.
    Glob(GlobCondition),
    /// Combines multiple conditions using logical OR.
    Or(OrCondition),
    /// Combines multiple conditions using logical AND.
    And(AndCondition),
    /// Applies logical NOT to a condition.
    Not(NotCondition),
    /// An unsupported condition for future compatibility.
    #[serde(other)]
    Unsupported,
}

impl RuleCondition {
    /// Returns a condition that matches everything.
    pub fn all() -> Self {
        Self::And(AndCondition { inner: Vec::new() })
    }

    /// Returns a condition that matches if the field equals any of the given strings.
    pub fn equals<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Eq(EqCondition {
            name: name.into(),
            value: values
                .into_iter()
                .map(|value| Value::String(value.into()))
                .collect(),
            options: EqCondOptions::default(),
        })
    }

    /// Returns a condition that matches if the field is missing or `null`.
    pub fn equals_null(name: impl Into<String>) -> Self {
        Self::Eq(EqCondition {
            name: name.into(),
            value: Value::Null,
            options: EqCondOptions::default(),
        })
    }

    /// Returns a condition that matches if the field matches any of the glob patterns.
    pub fn glob<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Glob(GlobCondition {
            name: name.into(),
            value: GlobPatterns::new(patterns.into_iter().map(Into::into).collect()),
        })
    }

    /// Combines the given conditions with logical AND.
    pub fn and(inner: Vec<RuleCondition>) -> Self {
        Self::And(AndCondition { inner })
    }

    /// Combines the given conditions with logical OR.
    pub fn or(inner: Vec<RuleCondition>) -> Self {
        Self::Or(OrCondition { inner })
    }

    /// Negates the given condition.
    pub fn negate(inner: RuleCondition) -> Self {
        Self::Not(NotCondition {
            inner: Box::new(inner),
        })
    }

    /// Sets the `ignoreCase` option if this is an [`EqCondition`].
    ///
    /// Other conditions are returned unchanged.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        if let Self::Eq(ref mut condition) = self {
            condition.options.ignore_case = ignore_case;
        }
        self
    }

    /// Checks if this condition is supported (in other words if the condition had any unknown
    /// configuration which was deserialized as "Unsupported", because the configuration is either
    /// faulty or was created for a newer consumer that supports other condition types).
    pub fn supported(&self) -> bool {
        match self {
            RuleCondition::Unsupported => false,
            RuleCondition::Eq(_) | RuleCondition::Glob(_) => true,
            RuleCondition::And(rules) => rules.supported(),
            RuleCondition::Or(rules) => rules.supported(),
            RuleCondition::Not(rule) => rule.supported(),
        }
    }

    /// Returns `true` if the rule matches the given value instance.
    pub fn matches<T>(&self, value: &T) -> bool
    where
        T: Getter + ?Sized,
    {
        match self {
            RuleCondition::Eq(condition) => condition.matches(value),
            RuleCondition::Glob(condition) => condition.matches(value),
            RuleCondition::And(conditions) => conditions.matches(value),
            RuleCondition::Or(conditions) => conditions.matches(value),
            RuleCondition::Not(condition) => condition.matches(value),
            RuleCondition::Unsupported => false,
        }
    }
}
