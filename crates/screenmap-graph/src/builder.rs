//! Declaration phase of a screen graph.
//!
//! [`ScreenGraphBuilder`] accumulates screen states, screen actions, action
//! chains and navigator shortcuts. Screen-state builder closures are stored,
//! not run; [`ScreenGraphBuilder::finalize`] consumes the builder, runs each
//! closure exactly once and produces an immutable [`ScreenGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use screenmap_model::effect::{Guard, SideEffect, SideEffects};
use screenmap_model::state::UserState;
use tracing::warn;

use crate::error::NavigationError;
use crate::graph::ScreenGraph;
use crate::node::{
    DeclarationSite, Edge, GraphNode, NodeKind, ScreenActionNode, ScreenStateNode,
};
use crate::traversal::navigator::Navigator;
use crate::validate::ConstructionError;

/// Deferred body of a screen state declaration.
pub type ScreenStateBuild = Box<dyn FnOnce(&mut ScreenStateBuilder)>;

/// A named shortcut callable from any screen.
pub type NavigatorAction =
    Arc<dyn Fn(&mut Navigator<'_>) -> Result<(), NavigationError> + Send + Sync>;

pub(crate) struct Shortcut {
    pub action: NavigatorAction,
    pub site: DeclarationSite,
}

#[derive(Default)]
pub struct ScreenGraphBuilder {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    builders: Vec<(usize, ScreenStateBuild)>,
    shortcuts: HashMap<String, Shortcut>,
    user_state: UserState,
    diagnostics: Vec<ConstructionError>,
}

impl ScreenGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template cloned into every navigator session.
    pub fn with_user_state(mut self, template: UserState) -> Self {
        self.user_state = template;
        self
    }

    pub fn diagnostics(&self) -> &[ConstructionError] {
        &self.diagnostics
    }

    /// Declare a screen state. `builder` runs once, during
    /// [`finalize`](Self::finalize), to declare the state's exits.
    #[track_caller]
    pub fn add_screen_state<F>(&mut self, name: &str, builder: F)
    where
        F: FnOnce(&mut ScreenStateBuilder) + 'static,
    {
        let site = DeclarationSite::caller();
        if let Some((existing_kind, existing_site)) = self.lookup(name) {
            self.record(ConstructionError::NameConflict {
                name: name.to_string(),
                kind: NodeKind::ScreenState,
                site,
                existing_kind,
                existing_site,
            });
            return;
        }
        let idx = self.push_node(GraphNode::ScreenState(ScreenStateNode::new(name, site)));
        self.builders.push((idx, Box::new(builder)));
    }

    /// Declare a screen action, or merge into an existing one.
    ///
    /// Re-declaration is allowed when the destinations match or either is
    /// unset; side-effects are appended after the existing ones.
    #[track_caller]
    pub fn add_screen_action(
        &mut self,
        name: &str,
        destination: Option<&str>,
        side_effect: Option<SideEffect>,
    ) {
        let site = DeclarationSite::caller();
        self.declare_action(
            name,
            destination.map(str::to_string),
            SideEffects::from(side_effect),
            site,
        );
    }

    /// Declare `names[0] -> names[1] -> ... -> final_state`.
    ///
    /// Only the first action carries `side_effect`. The chain is rejected
    /// when its head is already declared or `final_state` is not a declared
    /// screen state.
    #[track_caller]
    pub fn add_action_chain(
        &mut self,
        names: &[&str],
        final_state: Option<&str>,
        side_effect: SideEffect,
    ) {
        let site = DeclarationSite::caller();
        let Some(first) = names.first() else {
            return;
        };

        if let Some((_, existing_site)) = self.lookup(first) {
            self.record(ConstructionError::DuplicateChainHead {
                name: first.to_string(),
                site,
                existing_site,
            });
            return;
        }

        if let Some(state) = final_state {
            if !matches!(self.lookup(state), Some((NodeKind::ScreenState, _))) {
                self.record(ConstructionError::NotAScreenState {
                    name: state.to_string(),
                    site,
                });
                return;
            }
        }

        let mut effect = Some(side_effect);
        for (i, name) in names.iter().enumerate() {
            let next = names.get(i + 1).copied().or(final_state);
            self.declare_action(
                name,
                next.map(str::to_string),
                SideEffects::from(effect.take()),
                site,
            );
        }
    }

    /// Register a shortcut that can be performed regardless of the current
    /// screen.
    #[track_caller]
    pub fn add_navigator_action<F>(&mut self, name: &str, action: F)
    where
        F: Fn(&mut Navigator<'_>) -> Result<(), NavigationError> + Send + Sync + 'static,
    {
        let site = DeclarationSite::caller();
        if let Some(existing) = self.shortcuts.get(name) {
            let existing_site = existing.site;
            self.record(ConstructionError::NameConflict {
                name: name.to_string(),
                kind: NodeKind::NavigatorAction,
                site,
                existing_kind: NodeKind::NavigatorAction,
                existing_site,
            });
            return;
        }
        self.shortcuts.insert(
            name.to_string(),
            Shortcut {
                action: Arc::new(action),
                site,
            },
        );
    }

    /// Run every screen-state builder once and freeze the graph.
    pub fn finalize(mut self) -> ScreenGraph {
        // Builders may declare further actions, which append to `nodes`.
        let builders = std::mem::take(&mut self.builders);
        for (idx, build) in builders {
            let mut screen = ScreenStateBuilder::new(self.nodes[idx].name());
            build(&mut screen);
            self.apply_screen_state(idx, screen);
        }

        let shortcuts = self
            .shortcuts
            .into_iter()
            .map(|(name, shortcut)| (name, shortcut.action))
            .collect();

        ScreenGraph::assemble(self.nodes, shortcuts, self.user_state, self.diagnostics)
    }

    fn lookup(&self, name: &str) -> Option<(NodeKind, DeclarationSite)> {
        self.index.get(name).map(|&idx| {
            let node = &self.nodes[idx];
            (node.kind(), node.site())
        })
    }

    fn push_node(&mut self, node: GraphNode) -> usize {
        let idx = self.nodes.len();
        self.index.insert(node.name().to_string(), idx);
        self.nodes.push(node);
        idx
    }

    fn record(&mut self, error: ConstructionError) {
        warn!(%error, "rejected graph declaration");
        self.diagnostics.push(error);
    }

    fn declare_action(
        &mut self,
        name: &str,
        destination: Option<String>,
        side_effects: SideEffects,
        site: DeclarationSite,
    ) {
        let Some(&idx) = self.index.get(name) else {
            self.push_node(GraphNode::ScreenAction(ScreenActionNode {
                name: name.to_string(),
                site,
                destination,
                side_effects,
            }));
            return;
        };

        let conflict = match &mut self.nodes[idx] {
            GraphNode::ScreenState(state) => Some(ConstructionError::NameConflict {
                name: name.to_string(),
                kind: NodeKind::ScreenAction,
                site,
                existing_kind: NodeKind::ScreenState,
                existing_site: state.site,
            }),
            GraphNode::ScreenAction(action) => {
                let clash = match (action.destination.as_deref(), destination.as_deref()) {
                    (Some(existing), Some(new)) if existing != new => {
                        Some((existing.to_string(), new.to_string()))
                    }
                    _ => None,
                };
                match clash {
                    Some((existing_destination, destination)) => {
                        Some(ConstructionError::DestinationConflict {
                            name: name.to_string(),
                            destination,
                            site,
                            existing_destination,
                            existing_site: action.site,
                        })
                    }
                    None => {
                        if action.destination.is_none() {
                            action.destination = destination;
                        }
                        action.side_effects.extend(side_effects);
                        None
                    }
                }
            }
        };

        if let Some(error) = conflict {
            self.record(error);
        }
    }

    fn apply_screen_state(&mut self, idx: usize, screen: ScreenStateBuilder) {
        let ScreenStateBuilder {
            edges,
            on_enter,
            back_action,
            dismiss_on_use,
            actions,
            ..
        } = screen;

        if let GraphNode::ScreenState(node) = &mut self.nodes[idx] {
            node.edges = edges;
            node.on_enter = on_enter;
            node.back_action = back_action;
            node.dismiss_on_use = dismiss_on_use;
        }

        for action in actions {
            self.declare_action(
                &action.name,
                action.destination,
                action.side_effects,
                action.site,
            );
        }
    }
}

struct PendingAction {
    name: String,
    destination: Option<String>,
    side_effects: SideEffects,
    site: DeclarationSite,
}

/// Handed to a screen-state builder closure to declare the state's exits,
/// callbacks and back-stack behaviour.
pub struct ScreenStateBuilder {
    name: String,
    edges: Vec<Edge>,
    on_enter: SideEffects,
    back_action: Option<SideEffects>,
    dismiss_on_use: bool,
    actions: Vec<PendingAction>,
}

impl ScreenStateBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            edges: Vec::new(),
            on_enter: SideEffects::new(),
            back_action: None,
            dismiss_on_use: false,
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unconditional transition to a screen state or action.
    pub fn edge(&mut self, to: &str) -> &mut Self {
        self.add_edge(to, None)
    }

    /// Transition enabled only while `guard` holds.
    pub fn edge_if(&mut self, to: &str, guard: impl Into<Guard>) -> &mut Self {
        self.add_edge(to, Some(guard.into()))
    }

    /// Declare an action reachable from this state.
    #[track_caller]
    pub fn action(&mut self, name: &str, to: Option<&str>) -> &mut Self {
        let site = DeclarationSite::caller();
        self.add_action(name, to, None, SideEffects::new(), site)
    }

    /// Declare an action reachable from this state that mutates user state.
    #[track_caller]
    pub fn action_with<F>(&mut self, name: &str, to: Option<&str>, effect: F) -> &mut Self
    where
        F: Fn(&mut UserState) + Send + Sync + 'static,
    {
        let site = DeclarationSite::caller();
        self.add_action(
            name,
            to,
            None,
            SideEffects::single(Arc::new(effect)),
            site,
        )
    }

    /// Declare an action reachable from this state only while `guard` holds.
    #[track_caller]
    pub fn action_if(
        &mut self,
        name: &str,
        to: Option<&str>,
        guard: impl Into<Guard>,
        effect: Option<SideEffect>,
    ) -> &mut Self {
        let site = DeclarationSite::caller();
        self.add_action(name, to, Some(guard.into()), SideEffects::from(effect), site)
    }

    /// Fired every time the navigator enters this state.
    pub fn on_enter<F>(&mut self, effect: F) -> &mut Self
    where
        F: Fn(&mut UserState) + Send + Sync + 'static,
    {
        self.on_enter.push(Arc::new(effect));
        self
    }

    /// Makes the state backable; `effect` fires when leaving it via back.
    pub fn back_action<F>(&mut self, effect: F) -> &mut Self
    where
        F: Fn(&mut UserState) + Send + Sync + 'static,
    {
        self.back_action = Some(SideEffects::single(Arc::new(effect)));
        self
    }

    /// Backable with no user-state effect.
    pub fn backable(&mut self) -> &mut Self {
        self.back_action = Some(SideEffects::new());
        self
    }

    /// Leave this state out of the back-stack once it is left.
    pub fn dismiss_on_use(&mut self) -> &mut Self {
        self.dismiss_on_use = true;
        self
    }

    fn add_edge(&mut self, to: &str, guard: Option<Guard>) -> &mut Self {
        match self.edges.iter_mut().find(|e| e.destination == to) {
            Some(existing) => existing.guard = guard,
            None => self.edges.push(Edge {
                destination: to.to_string(),
                guard,
            }),
        }
        self
    }

    fn add_action(
        &mut self,
        name: &str,
        to: Option<&str>,
        guard: Option<Guard>,
        side_effects: SideEffects,
        site: DeclarationSite,
    ) -> &mut Self {
        self.actions.push(PendingAction {
            name: name.to_string(),
            destination: to.map(str::to_string),
            side_effects,
            site,
        });
        self.add_edge(name, guard)
    }
}
