pub mod condition;
pub mod effect;
pub mod state;

pub use condition::Condition;
pub use effect::{side_effect, Guard, Predicate, SideEffect, SideEffects};
pub use state::{parse_user_state, StateError, UserState, Value};
