/// Failure of a single navigation request. The session stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("No route from '{from}' to '{to}' under the current user state")]
    UnreachableTarget { from: String, to: String },

    #[error("Action '{action}' cannot be performed from '{from}'")]
    UnknownAction { action: String, from: String },

    #[error("Unknown screen '{name}'")]
    UnknownScreen { name: String },

    #[error("Nothing to go back to from '{screen}'")]
    EmptyHistory { screen: String },

    #[error("Interaction '{from}' -> '{to}' failed: {reason}")]
    InteractionFailed {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Route from '{from}' to '{to}' takes {hops} hops, limit is {limit}")]
    RouteTooLong {
        from: String,
        to: String,
        hops: usize,
        limit: usize,
    },
}

/// The navigator could not establish where the app starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitializationError {
    #[error("The app's initial state couldn't be established: no starting screen was given and the user state names none")]
    NoInitialScreen,

    #[error("The app's initial state couldn't be established: '{name}' is not a screen state")]
    NotAScreenState { name: String },
}
