//! Read-only rendering surface over a finalized graph.
//!
//! [`ScreenGraph::render`] walks every node, then every resolved edge,
//! and hands them to a [`GraphRenderer`]. What the renderer produces is its
//! own business; [`DotRenderer`] emits Graphviz and [`ScreenGraph::describe`]
//! collects a serialisable snapshot.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::{ScreenGraph, Transition};
use crate::node::{GraphNode, NodeKind};

/// An edge as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEdge<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub destination_kind: NodeKind,
    pub label: Option<&'a str>,
    /// Guarded by a predicate, labelled or not.
    pub conditional: bool,
    /// The destination is a backable screen state.
    pub backable: bool,
}

pub trait GraphRenderer {
    fn begin(&mut self) {}
    fn render_screen_state(&mut self, name: &str, dismiss_on_use: bool);
    fn render_screen_action(&mut self, name: &str);
    fn render_edge(&mut self, edge: &RenderEdge<'_>);
    fn end(&mut self) {}
}

impl ScreenGraph {
    pub fn render<R: GraphRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.begin();

        for (_, node) in self.nodes() {
            match node {
                GraphNode::ScreenState(state) => {
                    renderer.render_screen_state(&state.name, state.dismiss_on_use)
                }
                GraphNode::ScreenAction(action) => renderer.render_screen_action(&action.name),
            }
        }

        for (id, node) in self.nodes() {
            for transition in self.transitions(id) {
                let Transition::Declared { target, edge } = *transition else {
                    continue;
                };
                let destination = self.node(target);
                let declared = edge.and_then(|idx| self.edge(id, idx));
                let label = declared.and_then(|edge| edge.label());
                let conditional = declared.is_some_and(|edge| edge.is_conditional());
                let backable = destination
                    .as_screen_state()
                    .is_some_and(|state| state.is_backable());
                renderer.render_edge(&RenderEdge {
                    source: node.name(),
                    destination: destination.name(),
                    destination_kind: destination.kind(),
                    label,
                    conditional,
                    backable,
                });
            }
        }

        renderer.end();
    }

    /// Serialisable snapshot of the graph's nodes and resolved edges.
    pub fn describe(&self) -> GraphDescription {
        let mut collector = DescriptionCollector::default();
        self.render(&mut collector);
        collector.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescription {
    pub name: String,
    pub kind: NodeKind,
    pub dismiss_on_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeDescription {
    pub source: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub conditional: bool,
    pub backable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphDescription {
    pub nodes: Vec<NodeDescription>,
    pub edges: Vec<EdgeDescription>,
}

#[derive(Default)]
struct DescriptionCollector {
    description: GraphDescription,
}

impl GraphRenderer for DescriptionCollector {
    fn render_screen_state(&mut self, name: &str, dismiss_on_use: bool) {
        self.description.nodes.push(NodeDescription {
            name: name.to_string(),
            kind: NodeKind::ScreenState,
            dismiss_on_use,
        });
    }

    fn render_screen_action(&mut self, name: &str) {
        self.description.nodes.push(NodeDescription {
            name: name.to_string(),
            kind: NodeKind::ScreenAction,
            dismiss_on_use: false,
        });
    }

    fn render_edge(&mut self, edge: &RenderEdge<'_>) {
        self.description.edges.push(EdgeDescription {
            source: edge.source.to_string(),
            destination: edge.destination.to_string(),
            label: edge.label.map(str::to_string),
            conditional: edge.conditional,
            backable: edge.backable,
        });
    }
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

const ACTION_COLOR: &str = "lightblue";
const ACTION_FONT_COLOR: &str = "white";

/// Graphviz `dot` output.
///
/// Screen states are boxes (grey when dismissed on use), actions are blue
/// eggs, conditional edges are dashed (labelled when the guard is), and
/// edges into a backable state are drawn double-ended.
#[derive(Debug, Default)]
pub struct DotRenderer {
    lines: Vec<String>,
    ids: HashMap<String, String>,
}

impl DotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_extension(&self) -> &'static str {
        "dot"
    }

    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    fn id(&mut self, name: &str) -> String {
        let next = self.ids.len();
        self.ids
            .entry(name.to_string())
            .or_insert_with(|| format!("_{next}"))
            .clone()
    }
}

impl GraphRenderer for DotRenderer {
    fn begin(&mut self) {
        self.lines.clear();
        self.ids.clear();
        self.lines.extend(
            [
                "digraph G {",
                "fontsize=15;",
                "labelloc=t;",
                "splines=true;",
                "overlap=false;",
                "rankdir=LR;",
                "node [ shape = box ]",
            ]
            .map(str::to_string),
        );
    }

    fn render_screen_state(&mut self, name: &str, dismiss_on_use: bool) {
        let id = self.id(name);
        let style = if dismiss_on_use {
            "fillcolor=lightgray; color=gray; style=filled"
        } else {
            "color=black"
        };
        let name = escape(name);
        self.lines
            .push(format!("{id} [ label=\"{name}\"; {style} ];"));
    }

    fn render_screen_action(&mut self, name: &str) {
        let id = self.id(name);
        let name = escape(name);
        self.lines.push(format!(
            "{id} [ label=\"{name}\"; shape=egg; style=filled; color={ACTION_COLOR}; \
             fillcolor={ACTION_COLOR}; fontcolor={ACTION_FONT_COLOR}; fontsize=10 ];"
        ));
    }

    fn render_edge(&mut self, edge: &RenderEdge<'_>) {
        let src = self.id(edge.source);
        let dest = self.id(edge.destination);
        let mut style = match (edge.label, edge.conditional) {
            (Some(label), _) => format!("label=\"{}\"; style=dashed", escape(label)),
            (None, true) => "style=dashed".to_string(),
            (None, false) => "style=solid".to_string(),
        };
        match edge.destination_kind {
            NodeKind::ScreenAction => style.push_str(&format!("; color={ACTION_COLOR}")),
            _ if edge.backable => style.push_str("; dir=both; arrowtail=obox; arrowhead=normal"),
            _ => {}
        }
        self.lines.push(format!("{src} -> {dest} [ {style} ];"));
    }

    fn end(&mut self) {
        self.lines.push("}".to_string());
    }
}
