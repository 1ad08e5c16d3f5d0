//! Declarative condition trees and their evaluator.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BuffDefinition;

/// Comparison operator of a [`Condition::Comparison`] node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum Comparator {
    #[serde(rename = "==")]
    #[strum(serialize = "==")]
    Eq,
    #[serde(rename = "!=")]
    #[strum(serialize = "!=")]
    Ne,
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    Gt,
    #[serde(rename = ">=")]
    #[strum(serialize = ">=")]
    Ge,
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    Lt,
    #[serde(rename = "<=")]
    #[strum(serialize = "<=")]
    Le,
    #[serde(rename = "in")]
    #[strum(serialize = "in")]
    In,
    #[serde(rename = "not_in")]
    #[strum(serialize = "not_in")]
    NotIn,
}

impl Comparator {
    /// Applies the comparator to a resolved field and a literal.
    ///
    /// A null on either side fails every ordering comparison. `in` against a
    /// null collection is false and `not_in` is true.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Self::Eq => values_equal(lhs, rhs),
            Self::Ne => !values_equal(lhs, rhs),
            Self::Gt => order(lhs, rhs) == Some(Ordering::Greater),
            Self::Ge => matches!(order(lhs, rhs), Some(Ordering::Greater | Ordering::Equal)),
            Self::Lt => order(lhs, rhs) == Some(Ordering::Less),
            Self::Le => matches!(order(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
            Self::In => !rhs.is_null() && contains(rhs, lhs),
            Self::NotIn => rhs.is_null() || !contains(rhs, lhs),
        }
    }
}

/// Boolean expression over a context mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum Condition {
    Always,
    Never,
    Comparison {
        /// Dotted path, e.g. `event.payload.combo`.
        path: String,
        comparator: Comparator,
        #[serde(default)]
        value: Value,
    },
    And {
        operands: Vec<Condition>,
    },
    Or {
        operands: Vec<Condition>,
    },
    Not {
        operand: Box<Condition>,
    },
}

impl Condition {
    pub fn compare(path: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Self {
        Self::Comparison {
            path: path.into(),
            comparator,
            value: value.into(),
        }
    }

    pub fn and(operands: impl IntoIterator<Item = Condition>) -> Self {
        Self::And {
            operands: operands.into_iter().collect(),
        }
    }

    pub fn or(operands: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or {
            operands: operands.into_iter().collect(),
        }
    }

    pub fn not(operand: Condition) -> Self {
        Self::Not {
            operand: Box::new(operand),
        }
    }

    /// Structural check run at registration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Always | Self::Never => Ok(()),
            Self::Comparison { path, .. } => {
                if path.trim().is_empty() || path.split('.').any(str::is_empty) {
                    Err(format!("malformed field path `{path}`"))
                } else {
                    Ok(())
                }
            }
            Self::And { operands } | Self::Or { operands } => {
                if operands.is_empty() {
                    return Err("logical operator requires at least one operand".into());
                }
                operands.iter().try_for_each(Condition::validate)
            }
            Self::Not { operand } => operand.validate(),
        }
    }
}

/// Evaluates condition trees against a read-only mapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// True when every condition of `definition` holds. An empty list holds.
    pub fn matches(&self, definition: &BuffDefinition, context: &Value) -> bool {
        definition
            .conditions
            .iter()
            .all(|condition| self.evaluate(condition, context))
    }

    pub fn evaluate(&self, condition: &Condition, context: &Value) -> bool {
        match condition {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Comparison {
                path,
                comparator,
                value,
            } => comparator.apply(resolve_path(context, path), value),
            Condition::And { operands } => operands.iter().all(|op| self.evaluate(op, context)),
            Condition::Or { operands } => operands.iter().any(|op| self.evaluate(op, context)),
            Condition::Not { operand } => !self.evaluate(operand, context),
        }
    }
}

static NULL: Value = Value::Null;

/// Resolves a dotted path; any missing segment yields null.
///
/// Numeric segments index into arrays.
pub fn resolve_path<'a>(context: &'a Value, path: &str) -> &'a Value {
    let mut current = context;
    for part in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return &NULL,
        }
    }
    current
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn order(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn contains(collection: &Value, item: &Value) -> bool {
    match (collection, item) {
        (Value::Array(items), _) => items.iter().any(|candidate| values_equal(candidate, item)),
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn eval(condition: &Condition, context: &Value) -> bool {
        ConditionEvaluator::new().evaluate(condition, context)
    }

    #[test]
    fn missing_fields_fail_ordering_but_compare_equal_to_null() {
        let context = json!({ "actor": { "level": 5 } });
        assert!(!eval(&Condition::compare("actor.hp", Comparator::Ge, 0), &context));
        assert!(!eval(&Condition::compare("actor.hp", Comparator::Lt, 0), &context));
        assert!(eval(&Condition::compare("actor.hp", Comparator::Eq, Value::Null), &context));
        assert!(eval(&Condition::compare("actor.hp", Comparator::Ne, 3), &context));
    }

    #[test]
    fn numbers_compare_across_integer_and_float() {
        let context = json!({ "event": { "payload": { "combo": 3 } } });
        assert!(eval(&Condition::compare("event.payload.combo", Comparator::Eq, 3.0), &context));
        assert!(eval(&Condition::compare("event.payload.combo", Comparator::Ge, 2.5), &context));
        assert!(!eval(&Condition::compare("event.payload.combo", Comparator::Gt, 3), &context));
    }

    #[test]
    fn membership_handles_null_collections() {
        let context = json!({ "event": { "skill": "E", "tags": ["ex", "chain"] } });
        assert!(eval(&Condition::compare("event.skill", Comparator::In, json!(["E", "Q"])), &context));
        assert!(!eval(&Condition::compare("event.skill", Comparator::In, Value::Null), &context));
        assert!(eval(&Condition::compare("event.skill", Comparator::NotIn, Value::Null), &context));
        assert!(eval(&Condition::compare("event.tags.1", Comparator::Eq, "chain"), &context));
    }

    #[test]
    fn logical_operators_nest() {
        let context = json!({ "actor": { "level": 5 }, "event": { "payload": { "combo": 4 } } });
        let condition = Condition::and([
            Condition::Always,
            Condition::or([
                Condition::compare("actor.level", Comparator::Ge, 10),
                Condition::compare("event.payload.combo", Comparator::Ge, 3),
            ]),
        ]);
        assert!(eval(&condition, &context));
        assert!(!eval(&Condition::not(condition), &context));
        assert!(!eval(&Condition::Never, &context));
    }

    #[test]
    fn condition_deserializes_from_operator_tag() {
        let raw = json!({
            "operator": "or",
            "operands": [
                { "operator": "comparison", "path": "actor.level", "comparator": ">=", "value": 10 },
                { "operator": "always" }
            ]
        });
        let condition: Condition = serde_json::from_value(raw).unwrap();
        assert!(matches!(&condition, Condition::Or { operands } if operands.len() == 2));
        assert!(condition.validate().is_ok());
        assert!(Condition::and([]).validate().is_err());
        assert!(Condition::compare("actor..level", Comparator::Eq, 1).validate().is_err());
    }
}
