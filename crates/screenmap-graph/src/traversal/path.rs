//! Shortest-route search over a finalized screen graph.
//!
//! Breadth-first over the subgraph of transitions that are traversable
//! right now: unconditional edges always, predicated edges only if their
//! guard holds against the user state passed in. Guards are evaluated on
//! every call; routes are never cached because the state may have changed
//! between calls.
//!
//! Neighbours are expanded in declaration order and the first discovery of
//! a node wins, so among equal-length routes the one whose edges were
//! declared first at each decision node is chosen.

use std::collections::{HashMap, HashSet, VecDeque};

use screenmap_model::state::UserState;
use tracing::debug;

use crate::error::NavigationError;
use crate::graph::{ScreenGraph, Transition};
use crate::node::NodeId;

type SearchKey = (NodeId, Option<usize>);

/// One hop of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStep {
    Forward { from: NodeId, to: NodeId },
    Back { from: NodeId, to: NodeId },
}

impl RouteStep {
    pub fn from(&self) -> NodeId {
        match *self {
            RouteStep::Forward { from, .. } | RouteStep::Back { from, .. } => from,
        }
    }

    pub fn to(&self) -> NodeId {
        match *self {
            RouteStep::Forward { to, .. } | RouteStep::Back { to, .. } => to,
        }
    }
}

/// Ordered hops from a source node to a target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    source: NodeId,
    target: NodeId,
    steps: Vec<RouteStep>,
}

impl Route {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the nodes entered along the route, source excluded.
    pub fn node_names<'g>(&self, graph: &'g ScreenGraph) -> Vec<&'g str> {
        self.steps.iter().map(|step| graph.name_of(step.to())).collect()
    }
}

pub struct PathFinder<'g> {
    graph: &'g ScreenGraph,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g ScreenGraph) -> Self {
        Self { graph }
    }

    /// Conditional edges whose guard is false against `state`, as
    /// `(source, edge index)` pairs.
    pub fn blocked_edges(&self, state: &UserState) -> HashSet<(NodeId, usize)> {
        self.graph
            .conditional_edges()
            .iter()
            .filter(|conditional| {
                self.graph
                    .edge(conditional.source, conditional.edge)
                    .is_some_and(|edge| !edge.is_enabled(state))
            })
            .map(|conditional| (conditional.source, conditional.edge))
            .collect()
    }

    /// Shortest route from `source` to the node named `target`.
    ///
    /// `history` is the navigator's back-stack, oldest first. Back
    /// transitions are only followed along the chain it describes: from the
    /// source to the newest entry, from there to the next one, and so on,
    /// while each node on the chain is backable.
    pub fn find_route(
        &self,
        source: NodeId,
        target: &str,
        state: &UserState,
        history: &[NodeId],
    ) -> Result<Route, NavigationError> {
        let target_id = self
            .graph
            .node_id(target)
            .ok_or_else(|| NavigationError::UnknownScreen {
                name: target.to_string(),
            })?;
        self.find_route_to(source, target_id, state, history)
    }

    pub fn find_route_to(
        &self,
        source: NodeId,
        target: NodeId,
        state: &UserState,
        history: &[NodeId],
    ) -> Result<Route, NavigationError> {
        if source == target {
            return Ok(Route {
                source,
                target,
                steps: Vec::new(),
            });
        }

        let blocked = self.blocked_edges(state);
        let back_chain = self.back_chain(source, history);

        // A node is keyed together with its position on the back chain, if
        // it was reached by backing out from the source. The same node may
        // be reached both ways, and only the chain position permits `Back`.
        let start: SearchKey = (source, Some(0));
        let mut parents: HashMap<SearchKey, (SearchKey, RouteStep)> = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(start);
        queue.push_back(start);

        while let Some(key) = queue.pop_front() {
            let (current, chain_pos) = key;
            for transition in self.graph.transitions(current) {
                let (step, next_pos) = match *transition {
                    Transition::Declared { target: to, edge } => {
                        if edge.is_some_and(|idx| blocked.contains(&(current, idx))) {
                            continue;
                        }
                        (RouteStep::Forward { from: current, to }, None)
                    }
                    Transition::Back => {
                        let Some(pos) = chain_pos else {
                            continue;
                        };
                        let Some(&to) = back_chain.get(pos + 1) else {
                            continue;
                        };
                        (RouteStep::Back { from: current, to }, Some(pos + 1))
                    }
                };

                let next: SearchKey = (step.to(), next_pos);
                if !visited.insert(next) {
                    continue;
                }
                parents.insert(next, (key, step));
                if next.0 == target {
                    let route = Self::unwind(start, next, &parents);
                    debug!(
                        from = self.graph.name_of(source),
                        to = self.graph.name_of(target),
                        hops = route.len(),
                        "found route"
                    );
                    return Ok(route);
                }
                queue.push_back(next);
            }
        }

        Err(NavigationError::UnreachableTarget {
            from: self.graph.name_of(source).to_string(),
            to: self.graph.name_of(target).to_string(),
        })
    }

    /// `[source, newest history entry, next entry, ...]`, cut at the first
    /// node that is not backable. Dismiss-on-use entries are skipped.
    fn back_chain(&self, source: NodeId, history: &[NodeId]) -> Vec<NodeId> {
        let mut chain = vec![source];
        let mut current = source;
        for &previous in history.iter().rev() {
            let backable = self
                .graph
                .screen_state(current)
                .is_some_and(|state| state.is_backable());
            if !backable {
                break;
            }
            let dismissed = self
                .graph
                .screen_state(previous)
                .map_or(true, |state| state.dismiss_on_use);
            if dismissed {
                continue;
            }
            chain.push(previous);
            current = previous;
        }
        chain
    }

    fn unwind(
        start: SearchKey,
        end: SearchKey,
        parents: &HashMap<SearchKey, (SearchKey, RouteStep)>,
    ) -> Route {
        let mut steps = Vec::new();
        let mut current = end;
        while current != start {
            let (previous, step) = parents[&current];
            steps.push(step);
            current = previous;
        }
        steps.reverse();
        Route {
            source: start.0,
            target: end.0,
            steps,
        }
    }
}
