/// A single step in the navigation trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Step number (monotonic within the session).
    pub step_number: u64,
    pub from: String,
    pub to: String,
    pub kind: TraceStepKind,
    /// User-state generation after the step's side-effects fired.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStepKind {
    /// Entered a screen state through a forward hop.
    Entered,
    /// Passed through a screen action; its side-effects fired.
    ActionPerformed,
    /// Returned to a screen state from the back-stack.
    Back,
    /// Invoked a navigator shortcut.
    Shortcut,
    /// Cursor moved by `now_at` without any interaction.
    Resynchronised,
}

/// Ordered record of what a navigator did.
#[derive(Debug, Clone, Default)]
pub struct NavigationTrace {
    steps: Vec<TraceStep>,
    next_step: u64,
}

impl NavigationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, from: &str, to: &str, kind: TraceStepKind, generation: u64) {
        self.steps.push(TraceStep {
            step_number: self.next_step,
            from: from.to_string(),
            to: to.to_string(),
            kind,
            generation,
        });
        self.next_step += 1;
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Destinations of every step of the given kind, in order.
    pub fn destinations(&self, kind: TraceStepKind) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.kind == kind)
            .map(|step| step.to.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
