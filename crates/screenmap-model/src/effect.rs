use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;
use crate::state::UserState;

/// A mutation of user state, fired when a node is entered or left.
pub type SideEffect = Arc<dyn Fn(&mut UserState) + Send + Sync>;

/// A pure test over a user-state snapshot.
pub type Predicate = Arc<dyn Fn(&UserState) -> bool + Send + Sync>;

pub fn side_effect<F>(f: F) -> SideEffect
where
    F: Fn(&mut UserState) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered list of side-effects, applied in declaration order.
#[derive(Clone, Default)]
pub struct SideEffects {
    effects: Vec<SideEffect>,
}

impl SideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(effect: SideEffect) -> Self {
        Self {
            effects: vec![effect],
        }
    }

    pub fn push(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }

    /// Append `other` after the effects already held.
    pub fn extend(&mut self, other: SideEffects) {
        self.effects.extend(other.effects);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn apply(&self, state: &mut UserState) {
        for effect in &self.effects {
            effect(state);
        }
    }
}

impl From<Option<SideEffect>> for SideEffects {
    fn from(effect: Option<SideEffect>) -> Self {
        Self {
            effects: effect.into_iter().collect(),
        }
    }
}

impl fmt::Debug for SideEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SideEffects({})", self.effects.len())
    }
}

/// A predicate with an optional human-readable label.
///
/// The label is what renderers print on a conditional edge; the predicate
/// is what the path finder evaluates.
#[derive(Clone)]
pub struct Guard {
    label: Option<String>,
    predicate: Predicate,
}

impl Guard {
    pub fn new<F>(label: &str, f: F) -> Self
    where
        F: Fn(&UserState) -> bool + Send + Sync + 'static,
    {
        Self {
            label: Some(label.to_string()),
            predicate: Arc::new(f),
        }
    }

    pub fn unlabelled<F>(f: F) -> Self
    where
        F: Fn(&UserState) -> bool + Send + Sync + 'static,
    {
        Self {
            label: None,
            predicate: Arc::new(f),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn allows(&self, state: &UserState) -> bool {
        (self.predicate)(state)
    }
}

impl From<Condition> for Guard {
    fn from(condition: Condition) -> Self {
        Self {
            label: Some(condition.to_string()),
            predicate: Arc::new(move |state| condition.eval(state)),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("label", &self.label).finish()
    }
}
