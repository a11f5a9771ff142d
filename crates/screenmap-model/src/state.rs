use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Values held in the user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The mutable record a navigation session carries around.
///
/// Predicates read it, side-effects write it. One `UserState` belongs to
/// exactly one navigator; graphs only hold a template that is cloned for
/// each new session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserState {
    /// Screen state a navigator starts at when no explicit start is given.
    #[serde(default)]
    initial_screen_state: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
    /// Monotonic counter, incremented on every mutation.
    #[serde(skip)]
    generation: u64,
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for templates.
    pub fn with_initial_screen(mut self, name: &str) -> Self {
        self.initial_screen_state = Some(name.to_string());
        self
    }

    /// Builder-style helper for templates.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn initial_screen_state(&self) -> Option<&str> {
        self.initial_screen_state.as_deref()
    }

    pub fn set_initial_screen_state(&mut self, name: &str) {
        self.initial_screen_state = Some(name.to_string());
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_field(name).and_then(Value::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get_field(name).and_then(Value::as_int)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_field(name).and_then(Value::as_str)
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
        self.generation += 1;
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        let removed = self.fields.remove(name);
        if removed.is_some() {
            self.generation += 1;
        }
        removed
    }

    /// Add `delta` to an integer field. A missing field counts as zero.
    /// Saturates at the `i64` bounds. Returns the new value.
    pub fn increment(&mut self, name: &str, delta: i64) -> i64 {
        let next = self.get_int(name).unwrap_or(0).saturating_add(delta);
        self.set_field(name, next);
        next
    }

    /// Iterate fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Load a user-state template from JSON.
pub fn parse_user_state(json: &str) -> Result<UserState, StateError> {
    Ok(serde_json::from_str(json)?)
}
