use std::fmt;
use std::panic::Location;

use serde::Serialize;

use screenmap_model::effect::{Guard, SideEffects};
use screenmap_model::state::UserState;

/// Index of a node in a finalized [`ScreenGraph`](crate::graph::ScreenGraph).
pub type NodeId = u32;

/// Where a node or action was declared, captured via `#[track_caller]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationSite {
    pub file: &'static str,
    pub line: u32,
}

impl DeclarationSite {
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    ScreenState,
    ScreenAction,
    NavigatorAction,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::ScreenState => write!(f, "screen state"),
            NodeKind::ScreenAction => write!(f, "screen action"),
            NodeKind::NavigatorAction => write!(f, "navigator action"),
        }
    }
}

/// A directed transition out of a screen state.
#[derive(Debug, Clone)]
pub struct Edge {
    pub destination: String,
    pub guard: Option<Guard>,
}

impl Edge {
    pub fn label(&self) -> Option<&str> {
        self.guard.as_ref().and_then(Guard::label)
    }

    pub fn is_conditional(&self) -> bool {
        self.guard.is_some()
    }

    /// Unconditional edges are always enabled.
    pub fn is_enabled(&self, state: &UserState) -> bool {
        self.guard.as_ref().map_or(true, |guard| guard.allows(state))
    }
}

/// A stable, observable state of the application under test.
#[derive(Debug, Clone)]
pub struct ScreenStateNode {
    pub name: String,
    pub site: DeclarationSite,
    pub on_enter: SideEffects,
    pub dismiss_on_use: bool,
    /// Presence makes the state backable.
    pub back_action: Option<SideEffects>,
    /// Outgoing edges in declaration order, at most one per destination.
    pub edges: Vec<Edge>,
}

impl ScreenStateNode {
    pub(crate) fn new(name: &str, site: DeclarationSite) -> Self {
        Self {
            name: name.to_string(),
            site,
            on_enter: SideEffects::new(),
            dismiss_on_use: false,
            back_action: None,
            edges: Vec::new(),
        }
    }

    pub fn is_backable(&self) -> bool {
        self.back_action.is_some()
    }

    pub fn edge_to(&self, destination: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.destination == destination)
    }
}

/// A transient gesture: mutates user state, then optionally lands on a
/// destination node.
#[derive(Debug, Clone)]
pub struct ScreenActionNode {
    pub name: String,
    pub site: DeclarationSite,
    pub destination: Option<String>,
    pub side_effects: SideEffects,
}

#[derive(Debug, Clone)]
pub enum GraphNode {
    ScreenState(ScreenStateNode),
    ScreenAction(ScreenActionNode),
}

impl GraphNode {
    pub fn name(&self) -> &str {
        match self {
            GraphNode::ScreenState(node) => &node.name,
            GraphNode::ScreenAction(node) => &node.name,
        }
    }

    pub fn site(&self) -> DeclarationSite {
        match self {
            GraphNode::ScreenState(node) => node.site,
            GraphNode::ScreenAction(node) => node.site,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::ScreenState(_) => NodeKind::ScreenState,
            GraphNode::ScreenAction(_) => NodeKind::ScreenAction,
        }
    }

    pub fn as_screen_state(&self) -> Option<&ScreenStateNode> {
        match self {
            GraphNode::ScreenState(node) => Some(node),
            GraphNode::ScreenAction(_) => None,
        }
    }

    pub fn as_screen_action(&self) -> Option<&ScreenActionNode> {
        match self {
            GraphNode::ScreenAction(node) => Some(node),
            GraphNode::ScreenState(_) => None,
        }
    }

    pub fn is_screen_state(&self) -> bool {
        matches!(self, GraphNode::ScreenState(_))
    }
}
