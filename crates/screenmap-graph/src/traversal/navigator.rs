use std::sync::Arc;

use screenmap_model::state::UserState;
use tracing::{debug, info, warn};

use super::executor::{Interaction, InteractionExecutor, InteractionKind};
use super::path::{PathFinder, Route, RouteStep};
use super::trace::{NavigationTrace, TraceStepKind};
use crate::config::NavigatorConfig;
use crate::error::{InitializationError, NavigationError};
use crate::graph::{ScreenGraph, Transition};
use crate::node::{GraphNode, NodeId};

/// A navigation session over a finalized graph.
///
/// Owns its user state, a cursor that always points at a screen state, and
/// the back-stack of screen states it has left. Every hop is first handed to
/// the executor; only when that succeeds do side-effects fire and the cursor
/// move, so a failed hop leaves the session at the last screen it entered.
pub struct Navigator<'g> {
    graph: &'g ScreenGraph,
    user_state: UserState,
    current: NodeId,
    history: Vec<NodeId>,
    executor: Box<dyn InteractionExecutor + 'g>,
    config: NavigatorConfig,
    trace: NavigationTrace,
}

impl<'g> Navigator<'g> {
    pub(crate) fn new(
        graph: &'g ScreenGraph,
        starting_at: Option<&str>,
        executor: Box<dyn InteractionExecutor + 'g>,
        config: NavigatorConfig,
    ) -> Result<Self, InitializationError> {
        let mut user_state = graph.user_state_template().clone();
        let name = match starting_at {
            Some(name) => name.to_string(),
            None => user_state
                .initial_screen_state()
                .map(str::to_string)
                .ok_or(InitializationError::NoInitialScreen)?,
        };
        let start = graph
            .node_id(&name)
            .filter(|&id| graph.node(id).is_screen_state())
            .ok_or_else(|| InitializationError::NotAScreenState { name: name.clone() })?;

        user_state.set_initial_screen_state(&name);

        let mut navigator = Self {
            graph,
            user_state,
            current: start,
            history: Vec::new(),
            executor,
            config,
            trace: NavigationTrace::new(),
        };
        navigator.fire_on_enter(start);
        info!(start = %name, "navigator started");
        Ok(navigator)
    }

    pub fn graph(&self) -> &'g ScreenGraph {
        self.graph
    }

    pub fn current_screen(&self) -> &'g str {
        self.graph.name_of(self.current)
    }

    pub fn current_node(&self) -> NodeId {
        self.current
    }

    pub fn user_state(&self) -> &UserState {
        &self.user_state
    }

    pub fn user_state_mut(&mut self) -> &mut UserState {
        &mut self.user_state
    }

    pub fn mutate_user_state<F>(&mut self, f: F)
    where
        F: FnOnce(&mut UserState),
    {
        f(&mut self.user_state);
    }

    /// Back-stack, oldest first.
    pub fn history(&self) -> Vec<&'g str> {
        self.history
            .iter()
            .map(|&id| self.graph.name_of(id))
            .collect()
    }

    pub fn trace(&self) -> &NavigationTrace {
        &self.trace
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// The route `goto(target)` would take right now, without taking it.
    pub fn plan(&self, target: &str) -> Result<Route, NavigationError> {
        let route = PathFinder::new(self.graph).find_route(
            self.current,
            target,
            &self.user_state,
            &self.history,
        )?;
        self.within_limit(route)
    }

    pub fn can_goto(&self, target: &str) -> bool {
        self.plan(target).is_ok()
    }

    /// Travel to `target` along the shortest currently-valid route.
    pub fn goto(&mut self, target: &str) -> Result<(), NavigationError> {
        let route = self.plan(target)?;
        if route.is_empty() {
            return Ok(());
        }
        debug!(
            from = self.current_screen(),
            to = target,
            hops = route.len(),
            "replaying route"
        );
        self.replay(&route)
    }

    /// Perform a named action, then follow it to its destination if it has
    /// one.
    ///
    /// A screen action reachable from the current screen takes precedence
    /// over a navigator shortcut of the same name.
    pub fn perform_action(&mut self, name: &str) -> Result<(), NavigationError> {
        let graph = self.graph;

        if let Some(id) = graph.node_id(name) {
            if graph.node(id).as_screen_action().is_some() {
                let found = PathFinder::new(graph).find_route_to(
                    self.current,
                    id,
                    &self.user_state,
                    &self.history,
                );
                match found {
                    Ok(route) => {
                        let route = self.within_limit(route)?;
                        return self.replay(&route);
                    }
                    Err(NavigationError::UnreachableTarget { .. }) => {}
                    Err(other) => return Err(other),
                }
            }
        }

        if graph.navigator_action(name).is_some() {
            return self.run_shortcut(name);
        }

        Err(NavigationError::UnknownAction {
            action: name.to_string(),
            from: self.current_screen().to_string(),
        })
    }

    /// Return to the most recent screen on the back-stack.
    pub fn back(&mut self) -> Result<(), NavigationError> {
        let graph = self.graph;
        let Some(pos) = self
            .history
            .iter()
            .rposition(|&id| !self.is_dismissed(id))
        else {
            return Err(NavigationError::EmptyHistory {
                screen: self.current_screen().to_string(),
            });
        };

        let from = self.current;
        let previous = self.history[pos];
        self.interact(from, previous, InteractionKind::Back)?;

        self.history.truncate(pos);
        if let Some(back_action) = graph
            .screen_state(from)
            .and_then(|state| state.back_action.as_ref())
        {
            back_action.apply(&mut self.user_state);
        }
        self.current = previous;
        self.fire_on_enter(previous);
        self.record(
            graph.name_of(from),
            graph.name_of(previous),
            TraceStepKind::Back,
        );
        Ok(())
    }

    /// Tell the navigator the app is now at `screen`, without interacting.
    ///
    /// Clears the back-stack.
    pub fn now_at(&mut self, screen: &str) -> Result<(), NavigationError> {
        let graph = self.graph;
        let id = graph
            .node_id(screen)
            .filter(|&id| graph.node(id).is_screen_state())
            .ok_or_else(|| NavigationError::UnknownScreen {
                name: screen.to_string(),
            })?;
        let from = self.current_screen();
        self.history.clear();
        self.current = id;
        self.fire_on_enter(id);
        self.record(from, screen, TraceStepKind::Resynchronised);
        Ok(())
    }

    /// Go back to the screen this session started at.
    pub fn revert(&mut self) -> Result<(), NavigationError> {
        match self.user_state.initial_screen_state().map(str::to_string) {
            Some(initial) => self.goto(&initial),
            None => Ok(()),
        }
    }

    fn within_limit(&self, route: Route) -> Result<Route, NavigationError> {
        if route.len() > self.config.max_route_hops {
            return Err(NavigationError::RouteTooLong {
                from: self.graph.name_of(route.source()).to_string(),
                to: self.graph.name_of(route.target()).to_string(),
                hops: route.len(),
                limit: self.config.max_route_hops,
            });
        }
        Ok(route)
    }

    fn replay(&mut self, route: &Route) -> Result<(), NavigationError> {
        for step in route.steps() {
            match *step {
                RouteStep::Forward { from, to } => self.step_forward(from, to)?,
                RouteStep::Back { .. } => self.back()?,
            }
        }

        // A route ending on an action carries on through its destination.
        let mut at = route.target();
        for _ in 0..self.graph.len() {
            let Some(next) = self.action_destination(at) else {
                break;
            };
            self.step_forward(at, next)?;
            at = next;
        }
        let graph = self.graph;
        if let Some(name) = graph.shortcut_destination(at) {
            self.run_shortcut(name)?;
        }
        Ok(())
    }

    fn run_shortcut(&mut self, name: &str) -> Result<(), NavigationError> {
        let graph = self.graph;
        let Some(shortcut) = graph.navigator_action(name) else {
            return Err(NavigationError::UnknownAction {
                action: name.to_string(),
                from: self.current_screen().to_string(),
            });
        };
        let shortcut = Arc::clone(shortcut);
        self.record(self.current_screen(), name, TraceStepKind::Shortcut);
        shortcut(self)
    }

    fn action_destination(&self, id: NodeId) -> Option<NodeId> {
        self.graph.node(id).as_screen_action()?;
        self.graph
            .transitions(id)
            .iter()
            .find_map(|transition| match *transition {
                Transition::Declared { target, .. } => Some(target),
                Transition::Back => None,
            })
    }

    fn step_forward(&mut self, from: NodeId, to: NodeId) -> Result<(), NavigationError> {
        let graph = self.graph;
        self.interact(from, to, InteractionKind::Forward)?;

        match graph.node(to) {
            GraphNode::ScreenAction(action) => {
                action.side_effects.apply(&mut self.user_state);
                self.record(
                    graph.name_of(from),
                    &action.name,
                    TraceStepKind::ActionPerformed,
                );
            }
            GraphNode::ScreenState(state) => {
                let left = self.current;
                if left != to && !self.is_dismissed(left) {
                    self.push_history(left);
                }
                self.current = to;
                state.on_enter.apply(&mut self.user_state);
                self.record(graph.name_of(from), &state.name, TraceStepKind::Entered);
            }
        }
        Ok(())
    }

    fn interact(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: InteractionKind,
    ) -> Result<(), NavigationError> {
        let graph = self.graph;
        let interaction = Interaction {
            from: graph.name_of(from),
            to: graph.name_of(to),
            kind,
        };
        let outcome = self.executor.execute(&interaction);
        match outcome.error {
            None => Ok(()),
            Some(reason) => {
                warn!(
                    from = interaction.from,
                    to = interaction.to,
                    %reason,
                    "interaction failed"
                );
                Err(NavigationError::InteractionFailed {
                    from: interaction.from.to_string(),
                    to: interaction.to.to_string(),
                    reason,
                })
            }
        }
    }

    fn push_history(&mut self, id: NodeId) {
        self.history.push(id);
        if let Some(limit) = self.config.history_limit {
            let excess = self.history.len().saturating_sub(limit);
            self.history.drain(..excess);
        }
    }

    fn is_dismissed(&self, id: NodeId) -> bool {
        self.graph
            .screen_state(id)
            .is_some_and(|state| state.dismiss_on_use)
    }

    fn fire_on_enter(&mut self, id: NodeId) {
        let graph = self.graph;
        if let Some(state) = graph.screen_state(id) {
            state.on_enter.apply(&mut self.user_state);
        }
    }

    fn record(&mut self, from: &str, to: &str, kind: TraceStepKind) {
        if self.config.record_trace {
            self.trace
                .record(from, to, kind, self.user_state.generation());
        }
    }
}
