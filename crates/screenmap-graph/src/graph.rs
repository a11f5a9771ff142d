use std::collections::HashMap;

use screenmap_model::state::UserState;
use tracing::{debug, info};

use crate::builder::{NavigatorAction, ScreenGraphBuilder};
use crate::config::NavigatorConfig;
use crate::error::InitializationError;
use crate::node::{Edge, GraphNode, NodeId, ScreenStateNode};
use crate::traversal::executor::{InteractionExecutor, ModelOnlyExecutor};
use crate::traversal::navigator::Navigator;
use crate::validate::{check_diagnostics, ConstructionError};

/// An outgoing transition in the finalized adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A declared edge of a screen state (`edge` indexes its edge list), or
    /// the destination of a screen action (`edge` is `None`).
    Declared { target: NodeId, edge: Option<usize> },
    /// Synthesized for backable states. Where it leads depends on the
    /// navigator's history, so it carries no target.
    Back,
}

/// A predicated edge, flattened out of the adjacency at finalize time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalEdge {
    pub source: NodeId,
    pub edge: usize,
    pub destination: NodeId,
}

/// A finalized, immutable screen graph.
///
/// Built by [`ScreenGraphBuilder::finalize`]. Any number of navigators may
/// borrow it; none of them can re-run its builders.
pub struct ScreenGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeId>,
    transitions: Vec<Vec<Transition>>,
    conditional_edges: Vec<ConditionalEdge>,
    shortcuts: HashMap<String, NavigatorAction>,
    /// Actions whose destination is a navigator shortcut rather than a node.
    shortcut_destinations: HashMap<NodeId, String>,
    user_state: UserState,
    diagnostics: Vec<ConstructionError>,
}

impl ScreenGraph {
    pub fn builder() -> ScreenGraphBuilder {
        ScreenGraphBuilder::new()
    }

    pub(crate) fn assemble(
        nodes: Vec<GraphNode>,
        shortcuts: HashMap<String, NavigatorAction>,
        user_state: UserState,
        diagnostics: Vec<ConstructionError>,
    ) -> Self {
        let index: HashMap<String, NodeId> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name().to_string(), i as NodeId))
            .collect();

        let mut transitions = Vec::with_capacity(nodes.len());
        let mut conditional_edges = Vec::new();
        let mut shortcut_destinations = HashMap::new();
        let mut dropped = 0usize;

        for (i, node) in nodes.iter().enumerate() {
            let source = i as NodeId;
            let mut out = Vec::new();
            match node {
                GraphNode::ScreenState(state) => {
                    for (edge_idx, edge) in state.edges.iter().enumerate() {
                        let Some(&target) = index.get(&edge.destination) else {
                            debug!(
                                source = %state.name,
                                destination = %edge.destination,
                                "dropping edge to undeclared node"
                            );
                            dropped += 1;
                            continue;
                        };
                        if edge.is_conditional() {
                            conditional_edges.push(ConditionalEdge {
                                source,
                                edge: edge_idx,
                                destination: target,
                            });
                        }
                        out.push(Transition::Declared {
                            target,
                            edge: Some(edge_idx),
                        });
                    }
                    if state.is_backable() {
                        out.push(Transition::Back);
                    }
                }
                GraphNode::ScreenAction(action) => {
                    if let Some(destination) = &action.destination {
                        match index.get(destination) {
                            Some(&target) => out.push(Transition::Declared { target, edge: None }),
                            None if shortcuts.contains_key(destination) => {
                                shortcut_destinations.insert(source, destination.clone());
                            }
                            None => {
                                debug!(
                                    source = %action.name,
                                    destination = %destination,
                                    "dropping action destination to undeclared node"
                                );
                                dropped += 1;
                            }
                        }
                    }
                }
            }
            transitions.push(out);
        }

        info!(
            nodes = nodes.len(),
            conditional_edges = conditional_edges.len(),
            shortcut_destinations = shortcut_destinations.len(),
            dropped_edges = dropped,
            diagnostics = diagnostics.len(),
            "finalized screen graph"
        );

        Self {
            nodes,
            index,
            transitions,
            conditional_edges,
            shortcuts,
            shortcut_destinations,
            user_state,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Panics if `id` did not come from this graph.
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id as usize]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&GraphNode> {
        self.node_id(name).map(|id| self.node(id))
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        self.node(id).name()
    }

    pub fn screen_state(&self, id: NodeId) -> Option<&ScreenStateNode> {
        self.node(id).as_screen_state()
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (i as NodeId, node))
    }

    /// Outgoing transitions of `id`, in declaration order, back last.
    pub fn transitions(&self, id: NodeId) -> &[Transition] {
        &self.transitions[id as usize]
    }

    pub fn edge(&self, source: NodeId, edge: usize) -> Option<&Edge> {
        self.screen_state(source)?.edges.get(edge)
    }

    pub fn conditional_edges(&self) -> &[ConditionalEdge] {
        &self.conditional_edges
    }

    pub fn diagnostics(&self) -> &[ConstructionError] {
        &self.diagnostics
    }

    /// `Err` with every construction problem, if there were any.
    pub fn check(&self) -> Result<(), Vec<ConstructionError>> {
        check_diagnostics(&self.diagnostics)
    }

    pub fn navigator_action(&self, name: &str) -> Option<&NavigatorAction> {
        self.shortcuts.get(name)
    }

    /// The navigator shortcut an action hands over to once it has fired.
    pub fn shortcut_destination(&self, action: NodeId) -> Option<&str> {
        self.shortcut_destinations.get(&action).map(String::as_str)
    }

    pub fn user_state_template(&self) -> &UserState {
        &self.user_state
    }

    /// Start a model-only navigation session with default configuration.
    pub fn navigator(&self, starting_at: Option<&str>) -> Result<Navigator<'_>, InitializationError> {
        self.navigator_with(starting_at, ModelOnlyExecutor, NavigatorConfig::default())
    }

    /// Start a navigation session that drives `executor` for every hop.
    pub fn navigator_with<'g, E>(
        &'g self,
        starting_at: Option<&str>,
        executor: E,
        config: NavigatorConfig,
    ) -> Result<Navigator<'g>, InitializationError>
    where
        E: InteractionExecutor + 'g,
    {
        Navigator::new(self, starting_at, Box::new(executor), config)
    }
}
