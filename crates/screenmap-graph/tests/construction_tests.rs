use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use screenmap_graph::{ConstructionError, NodeKind, ScreenGraph, ScreenGraphBuilder, Transition};
use screenmap_model::{side_effect, UserState};

fn append(tag: &'static str) -> screenmap_model::SideEffect {
    side_effect(move |s: &mut UserState| {
        let log = format!("{}{tag}", s.get_str("log").unwrap_or(""));
        s.set_field("log", log);
    })
}

#[test]
fn test_builders_run_once_across_navigators() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut builder = ScreenGraph::builder();
    let counter = Arc::clone(&runs);
    builder.add_screen_state("Home", move |s| {
        counter.fetch_add(1, Ordering::SeqCst);
        s.edge("Settings");
    });
    builder.add_screen_state("Settings", |s| {
        s.backable();
    });
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let graph = builder.finalize();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let mut first = graph.navigator(Some("Home")).unwrap();
    first.goto("Settings").unwrap();
    let mut second = graph.navigator(Some("Home")).unwrap();
    second.goto("Settings").unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_merged_action_side_effects_run_in_declaration_order() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |s| {
        s.edge("X");
    });
    builder.add_screen_state("Y", |_| {});
    builder.add_screen_action("X", Some("Y"), Some(append("a")));
    builder.add_screen_action("X", None, Some(append("b")));
    let graph = builder.finalize();
    assert!(graph.check().is_ok());

    let mut nav = graph.navigator(Some("Home")).unwrap();
    nav.goto("Y").unwrap();
    assert_eq!(nav.user_state().get_str("log"), Some("ab"));
}

#[test]
fn test_unset_destination_is_filled_by_later_declaration() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Y", |_| {});
    builder.add_screen_action("X", None, None);
    builder.add_screen_action("X", Some("Y"), None);
    let graph = builder.finalize();

    assert!(graph.diagnostics().is_empty());
    let action = graph.node_by_name("X").unwrap().as_screen_action().unwrap();
    assert_eq!(action.destination.as_deref(), Some("Y"));
}

#[test]
fn test_conflicting_destinations_are_reported_with_both_sites() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Y", |_| {});
    builder.add_screen_state("Z", |_| {});
    builder.add_screen_action("X", Some("Y"), None);
    builder.add_screen_action("X", Some("Z"), None);
    let graph = builder.finalize();

    let errors = graph.check().unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConstructionError::DestinationConflict {
            name,
            destination,
            existing_destination,
            site,
            existing_site,
        } => {
            assert_eq!(name, "X");
            assert_eq!(destination, "Z");
            assert_eq!(existing_destination, "Y");
            assert!(existing_site.line < site.line);
            assert!(site.file.ends_with("construction_tests.rs"));
        }
        other => panic!("unexpected diagnostic: {other}"),
    }
    assert_eq!(errors[0].sites().len(), 2);
    assert!(errors[0].to_string().contains("'Y'"));

    // The first declaration stands.
    let action = graph.node_by_name("X").unwrap().as_screen_action().unwrap();
    assert_eq!(action.destination.as_deref(), Some("Y"));
}

#[test]
fn test_action_named_like_a_screen_state_is_rejected() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |_| {});
    builder.add_screen_action("Home", None, None);

    assert_eq!(builder.diagnostics().len(), 1);
    assert!(matches!(
        builder.diagnostics()[0],
        ConstructionError::NameConflict {
            kind: NodeKind::ScreenAction,
            existing_kind: NodeKind::ScreenState,
            ..
        }
    ));

    let graph = builder.finalize();
    assert!(graph.node_by_name("Home").unwrap().is_screen_state());
}

#[test]
fn test_duplicate_screen_state_keeps_the_first() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |s| {
        s.edge("A");
    });
    builder.add_screen_state("Home", |s| {
        s.edge("B");
    });
    builder.add_screen_state("A", |_| {});
    builder.add_screen_state("B", |_| {});
    let graph = builder.finalize();

    assert_eq!(graph.diagnostics().len(), 1);
    let home = graph.node_by_name("Home").unwrap().as_screen_state().unwrap();
    assert!(home.edge_to("A").is_some());
    assert!(home.edge_to("B").is_none());
}

#[test]
fn test_construction_continues_after_conflicts() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |_| {});
    builder.add_screen_action("Home", None, None);
    builder.add_screen_action("X", Some("Home"), None);
    builder.add_screen_action("X", Some("Elsewhere"), None);
    builder.add_screen_state("Later", |_| {});
    let graph = builder.finalize();

    assert_eq!(graph.check().unwrap_err().len(), 2);
    assert!(graph.node_id("Later").is_some());
}

#[test]
fn test_action_chain_links_actions_to_final_state() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Start", |s| {
        s.edge("open");
    });
    builder.add_screen_state("End", |_| {});
    builder.add_action_chain(
        &["open", "confirm", "done"],
        Some("End"),
        side_effect(|s: &mut UserState| {
            s.increment("count", 1);
        }),
    );
    let graph = builder.finalize();
    assert!(graph.check().is_ok());

    let mut nav = graph.navigator(Some("Start")).unwrap();
    let route = nav.plan("End").unwrap();
    assert_eq!(route.node_names(&graph), vec!["open", "confirm", "done", "End"]);

    nav.goto("End").unwrap();
    assert_eq!(nav.current_screen(), "End");
    assert_eq!(nav.user_state().get_int("count"), Some(1));
}

#[test]
fn test_action_chain_with_existing_head_is_rejected() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("End", |_| {});
    builder.add_screen_action("open", None, None);
    builder.add_action_chain(&["open", "confirm"], Some("End"), side_effect(|_| {}));
    let graph = builder.finalize();

    assert!(matches!(
        graph.diagnostics(),
        [ConstructionError::DuplicateChainHead { name, .. }] if name == "open"
    ));
    assert!(graph.node_id("confirm").is_none());
}

#[test]
fn test_action_chain_to_undeclared_state_adds_nothing() {
    let mut builder = ScreenGraph::builder();
    builder.add_action_chain(&["open", "confirm"], Some("Nowhere"), side_effect(|_| {}));
    let graph = builder.finalize();

    assert!(matches!(
        graph.diagnostics(),
        [ConstructionError::NotAScreenState { name, .. }] if name == "Nowhere"
    ));
    assert!(graph.is_empty());
}

#[test]
fn test_empty_action_chain_is_a_no_op() {
    let mut builder = ScreenGraph::builder();
    builder.add_action_chain(&[], None, side_effect(|_| {}));
    let graph = builder.finalize();
    assert!(graph.is_empty());
    assert!(graph.check().is_ok());
}

#[test]
fn test_duplicate_navigator_action_is_rejected() {
    let mut builder = ScreenGraphBuilder::new();
    builder.add_navigator_action("reset", |_| Ok(()));
    builder.add_navigator_action("reset", |_| Ok(()));

    assert!(matches!(
        builder.diagnostics(),
        [ConstructionError::NameConflict {
            kind: NodeKind::NavigatorAction,
            ..
        }]
    ));
}

#[test]
fn test_edges_to_undeclared_nodes_are_dropped() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |s| {
        s.edge("Ghost").edge("Real");
    });
    builder.add_screen_state("Real", |_| {});
    let graph = builder.finalize();

    let home = graph.node_id("Home").unwrap();
    let real = graph.node_id("Real").unwrap();
    assert_eq!(
        graph.transitions(home),
        &[Transition::Declared {
            target: real,
            edge: Some(1)
        }]
    );
    assert!(graph.check().is_ok());
}

#[test]
fn test_backable_states_get_a_trailing_back_transition() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |s| {
        s.edge("Detail");
    });
    builder.add_screen_state("Detail", |s| {
        s.edge("Home").backable();
    });
    let graph = builder.finalize();

    let detail = graph.node_id("Detail").unwrap();
    let transitions = graph.transitions(detail);
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions.last(), Some(&Transition::Back));
}

#[test]
fn test_repeated_edge_replaces_guard() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Home", |s| {
        s.edge_if("Detail", screenmap_model::Condition::eq("ready", true))
            .edge("Detail");
    });
    builder.add_screen_state("Detail", |_| {});
    let graph = builder.finalize();

    let home = graph.node_by_name("Home").unwrap().as_screen_state().unwrap();
    assert_eq!(home.edges.len(), 1);
    assert!(!home.edges[0].is_conditional());
    assert!(graph.conditional_edges().is_empty());
}
