//! Screen graph construction, route finding and navigation.
//!
//! Declare screens and actions on a [`ScreenGraphBuilder`], [`finalize`]
//! it into an immutable [`ScreenGraph`], then start any number of
//! [`Navigator`] sessions over it.
//!
//! [`finalize`]: ScreenGraphBuilder::finalize

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod node;
pub mod render;
pub mod traversal;
pub mod validate;

pub use builder::{NavigatorAction, ScreenGraphBuilder, ScreenStateBuilder};
pub use config::{parse_config, ConfigError, NavigatorConfig};
pub use error::{InitializationError, NavigationError};
pub use graph::{ConditionalEdge, ScreenGraph, Transition};
pub use node::{DeclarationSite, GraphNode, NodeId, NodeKind};
pub use render::{DotRenderer, GraphDescription, GraphRenderer, RenderEdge};
pub use traversal::executor::{
    Interaction, InteractionExecutor, InteractionKind, InteractionOutcome, ModelOnlyExecutor,
};
pub use traversal::navigator::Navigator;
pub use traversal::path::{PathFinder, Route, RouteStep};
pub use traversal::trace::{NavigationTrace, TraceStep, TraceStepKind};
pub use validate::ConstructionError;
