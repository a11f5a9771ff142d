//! Declarative conditions over user state.
//!
//! A `Condition` is an inspectable alternative to a closure predicate: it
//! evaluates against a `UserState` snapshot and prints as the label a
//! renderer shows on the edge it guards (`numItems > 0`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{UserState, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Eq { field: String, value: Value },
    Ne { field: String, value: Value },
    Gt { field: String, value: i64 },
    Ge { field: String, value: i64 },
    Lt { field: String, value: i64 },
    Le { field: String, value: i64 },
    Not { condition: Box<Condition> },
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Condition::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Condition::Ne {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn gt(field: &str, value: i64) -> Self {
        Condition::Gt {
            field: field.to_string(),
            value,
        }
    }

    pub fn ge(field: &str, value: i64) -> Self {
        Condition::Ge {
            field: field.to_string(),
            value,
        }
    }

    pub fn lt(field: &str, value: i64) -> Self {
        Condition::Lt {
            field: field.to_string(),
            value,
        }
    }

    pub fn le(field: &str, value: i64) -> Self {
        Condition::Le {
            field: field.to_string(),
            value,
        }
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    /// Evaluate against a snapshot.
    ///
    /// Ordering comparisons on a missing or non-integer field are false.
    pub fn eval(&self, state: &UserState) -> bool {
        match self {
            Condition::Eq { field, value } => state.get_field(field) == Some(value),
            Condition::Ne { field, value } => state.get_field(field) != Some(value),
            Condition::Gt { field, value } => int_field(state, field).is_some_and(|v| v > *value),
            Condition::Ge { field, value } => int_field(state, field).is_some_and(|v| v >= *value),
            Condition::Lt { field, value } => int_field(state, field).is_some_and(|v| v < *value),
            Condition::Le { field, value } => int_field(state, field).is_some_and(|v| v <= *value),
            Condition::Not { condition } => !condition.eval(state),
            Condition::And { conditions } => conditions.iter().all(|c| c.eval(state)),
            Condition::Or { conditions } => conditions.iter().any(|c| c.eval(state)),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Condition::And { .. } | Condition::Or { .. })
    }
}

fn int_field(state: &UserState, field: &str) -> Option<i64> {
    state.get_int(field)
}

fn write_joined(f: &mut fmt::Formatter<'_>, conditions: &[Condition], op: &str) -> fmt::Result {
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        if condition.is_compound() {
            write!(f, "({condition})")?;
        } else {
            write!(f, "{condition}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq { field, value } => write!(f, "{field} == {value}"),
            Condition::Ne { field, value } => write!(f, "{field} != {value}"),
            Condition::Gt { field, value } => write!(f, "{field} > {value}"),
            Condition::Ge { field, value } => write!(f, "{field} >= {value}"),
            Condition::Lt { field, value } => write!(f, "{field} < {value}"),
            Condition::Le { field, value } => write!(f, "{field} <= {value}"),
            Condition::Not { condition } => write!(f, "!({condition})"),
            Condition::And { conditions } if conditions.is_empty() => write!(f, "true"),
            Condition::Or { conditions } if conditions.is_empty() => write!(f, "false"),
            Condition::And { conditions } => write_joined(f, conditions, "&&"),
            Condition::Or { conditions } => write_joined(f, conditions, "||"),
        }
    }
}
