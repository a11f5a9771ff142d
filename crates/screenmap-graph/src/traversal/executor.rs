/// Direction of a single hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Follow a declared edge or an action's destination.
    Forward,
    /// Use the current screen's back gesture.
    Back,
}

/// One hop the navigator asks the app under test to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub kind: InteractionKind,
}

/// Result of performing an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionOutcome {
    /// Error message if the interaction failed.
    pub error: Option<String>,
}

impl InteractionOutcome {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Trait abstracting the concrete UI interaction behind each hop.
///
/// The navigator only models user state; tapping, swiping and waiting for
/// the next screen happen here. A failed outcome stops the traversal before
/// the hop's side-effects fire.
pub trait InteractionExecutor {
    fn execute(&mut self, interaction: &Interaction<'_>) -> InteractionOutcome;
}

impl<F> InteractionExecutor for F
where
    F: FnMut(&Interaction<'_>) -> InteractionOutcome,
{
    fn execute(&mut self, interaction: &Interaction<'_>) -> InteractionOutcome {
        self(interaction)
    }
}

/// Model-only executor: no app calls, every hop succeeds.
pub struct ModelOnlyExecutor;

impl InteractionExecutor for ModelOnlyExecutor {
    fn execute(&mut self, _interaction: &Interaction<'_>) -> InteractionOutcome {
        InteractionOutcome::success()
    }
}
