use screenmap_graph::{NavigationError, PathFinder, RouteStep, ScreenGraph};
use screenmap_model::{Condition, Guard, UserState};

fn diamond(first: &'static str, second: &'static str) -> ScreenGraph {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("A", move |s| {
        s.edge(first).edge(second);
    });
    builder.add_screen_state("B", |s| {
        s.edge("D");
    });
    builder.add_screen_state("C", |s| {
        s.edge("D");
    });
    builder.add_screen_state("D", |_| {});
    builder.finalize()
}

#[test]
fn test_unconditional_route_is_shortest() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("A", |s| {
        s.edge("B").edge("D");
    });
    builder.add_screen_state("B", |s| {
        s.edge("C");
    });
    builder.add_screen_state("C", |_| {});
    builder.add_screen_state("D", |s| {
        s.edge("C");
    });
    let graph = builder.finalize();
    let finder = PathFinder::new(&graph);
    let a = graph.node_id("A").unwrap();

    let route = finder.find_route(a, "C", &UserState::new(), &[]).unwrap();
    assert_eq!(route.len(), 2);
    assert_eq!(route.node_names(&graph), vec!["B", "C"]);
}

#[test]
fn test_tie_break_follows_declaration_order() {
    let state = UserState::new();

    let graph = diamond("B", "C");
    let a = graph.node_id("A").unwrap();
    let route = PathFinder::new(&graph).find_route(a, "D", &state, &[]).unwrap();
    assert_eq!(route.node_names(&graph), vec!["B", "D"]);

    let graph = diamond("C", "B");
    let a = graph.node_id("A").unwrap();
    let route = PathFinder::new(&graph).find_route(a, "D", &state, &[]).unwrap();
    assert_eq!(route.node_names(&graph), vec!["C", "D"]);
}

#[test]
fn test_same_route_on_repeated_searches() {
    let graph = diamond("B", "C");
    let finder = PathFinder::new(&graph);
    let a = graph.node_id("A").unwrap();
    let state = UserState::new();

    let first = finder.find_route(a, "D", &state, &[]).unwrap();
    for _ in 0..10 {
        assert_eq!(finder.find_route(a, "D", &state, &[]).unwrap(), first);
    }
}

#[test]
fn test_guards_are_evaluated_against_the_state_passed_in() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Login", |s| {
        s.edge_if("Home", Condition::eq("loggedIn", true));
    });
    builder.add_screen_state("Home", |_| {});
    let graph = builder.finalize();
    let finder = PathFinder::new(&graph);
    let login = graph.node_id("Login").unwrap();

    let mut state = UserState::new();
    assert_eq!(finder.blocked_edges(&state).len(), 1);
    assert_eq!(
        finder.find_route(login, "Home", &state, &[]),
        Err(NavigationError::UnreachableTarget {
            from: "Login".into(),
            to: "Home".into(),
        })
    );

    state.set_field("loggedIn", true);
    assert!(finder.blocked_edges(&state).is_empty());
    assert_eq!(finder.find_route(login, "Home", &state, &[]).unwrap().len(), 1);

    state.set_field("loggedIn", false);
    assert!(finder.find_route(login, "Home", &state, &[]).is_err());
}

#[test]
fn test_blocked_edge_forces_a_detour() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("A", |s| {
        s.edge_if("C", Guard::new("shortcut", |s| s.get_bool("fast").unwrap_or(false)))
            .edge("B");
    });
    builder.add_screen_state("B", |s| {
        s.edge("C");
    });
    builder.add_screen_state("C", |_| {});
    let graph = builder.finalize();
    let finder = PathFinder::new(&graph);
    let a = graph.node_id("A").unwrap();

    let slow = finder.find_route(a, "C", &UserState::new(), &[]).unwrap();
    assert_eq!(slow.node_names(&graph), vec!["B", "C"]);

    let fast_state = UserState::new().with_field("fast", true);
    let fast = finder.find_route(a, "C", &fast_state, &[]).unwrap();
    assert_eq!(fast.node_names(&graph), vec!["C"]);
}

#[test]
fn test_route_to_self_is_empty() {
    let graph = diamond("B", "C");
    let a = graph.node_id("A").unwrap();
    let route = PathFinder::new(&graph)
        .find_route(a, "A", &UserState::new(), &[])
        .unwrap();
    assert!(route.is_empty());
}

#[test]
fn test_unknown_target_is_reported() {
    let graph = diamond("B", "C");
    let a = graph.node_id("A").unwrap();
    assert_eq!(
        PathFinder::new(&graph).find_route(a, "Nowhere", &UserState::new(), &[]),
        Err(NavigationError::UnknownScreen {
            name: "Nowhere".into()
        })
    );
}

#[test]
fn test_back_follows_history() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("A", |s| {
        s.edge("B").edge("C");
    });
    builder.add_screen_state("B", |s| {
        s.backable();
    });
    builder.add_screen_state("C", |_| {});
    let graph = builder.finalize();
    let finder = PathFinder::new(&graph);
    let a = graph.node_id("A").unwrap();
    let b = graph.node_id("B").unwrap();
    let c = graph.node_id("C").unwrap();
    let state = UserState::new();

    let route = finder.find_route(b, "C", &state, &[a]).unwrap();
    assert_eq!(
        route.steps(),
        &[
            RouteStep::Back { from: b, to: a },
            RouteStep::Forward { from: a, to: c },
        ]
    );

    // Without a back-stack there is nowhere to go back to.
    assert!(finder.find_route(b, "C", &state, &[]).is_err());
}

#[test]
fn test_back_chain_stops_at_non_backable_state() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("Root", |s| {
        s.edge("Middle");
    });
    builder.add_screen_state("Middle", |s| {
        s.edge("Leaf");
    });
    builder.add_screen_state("Leaf", |s| {
        s.backable();
    });
    let graph = builder.finalize();
    let finder = PathFinder::new(&graph);
    let root = graph.node_id("Root").unwrap();
    let middle = graph.node_id("Middle").unwrap();
    let leaf = graph.node_id("Leaf").unwrap();
    let state = UserState::new();

    let to_middle = finder.find_route(leaf, "Middle", &state, &[root, middle]).unwrap();
    assert_eq!(to_middle.steps(), &[RouteStep::Back { from: leaf, to: middle }]);

    // Middle is not backable, so Root is out of reach.
    assert!(finder.find_route(leaf, "Root", &state, &[root, middle]).is_err());
}

#[test]
fn test_back_chain_skips_dismissed_entries() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("A", |s| {
        s.edge("Popup");
    });
    builder.add_screen_state("Popup", |s| {
        s.edge("C").dismiss_on_use();
    });
    builder.add_screen_state("C", |s| {
        s.backable();
    });
    let graph = builder.finalize();
    let a = graph.node_id("A").unwrap();
    let popup = graph.node_id("Popup").unwrap();
    let c = graph.node_id("C").unwrap();

    let route = PathFinder::new(&graph)
        .find_route(c, "A", &UserState::new(), &[a, popup])
        .unwrap();
    assert_eq!(route.steps(), &[RouteStep::Back { from: c, to: a }]);
}

#[test]
fn test_route_through_action_to_destination() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("List", |s| {
        s.action("openSettings", Some("Settings"));
    });
    builder.add_screen_state("Settings", |_| {});
    let graph = builder.finalize();
    let list = graph.node_id("List").unwrap();

    let route = PathFinder::new(&graph)
        .find_route(list, "Settings", &UserState::new(), &[])
        .unwrap();
    assert_eq!(route.node_names(&graph), vec!["openSettings", "Settings"]);
}

#[test]
fn test_tie_break_at_intermediate_node() {
    fn build(first: &'static str, second: &'static str) -> ScreenGraph {
        let mut builder = ScreenGraph::builder();
        builder.add_screen_state("A", |s| {
            s.edge("B");
        });
        builder.add_screen_state("B", move |s| {
            s.edge(first).edge(second);
        });
        builder.add_screen_state("C", |s| {
            s.edge("E");
        });
        builder.add_screen_state("D", |s| {
            s.edge("E");
        });
        builder.add_screen_state("E", |_| {});
        builder.finalize()
    }
    let state = UserState::new();

    let graph = build("C", "D");
    let a = graph.node_id("A").unwrap();
    let route = PathFinder::new(&graph).find_route(a, "E", &state, &[]).unwrap();
    assert_eq!(route.node_names(&graph), vec!["B", "C", "E"]);

    let graph = build("D", "C");
    let a = graph.node_id("A").unwrap();
    let route = PathFinder::new(&graph).find_route(a, "E", &state, &[]).unwrap();
    assert_eq!(route.node_names(&graph), vec!["B", "D", "E"]);
}

#[test]
fn test_back_chain_through_node_also_reachable_forward() {
    let mut builder = ScreenGraph::builder();
    builder.add_screen_state("P", |s| {
        s.edge("Q");
    });
    builder.add_screen_state("Q", |s| {
        s.edge("S").backable();
    });
    builder.add_screen_state("S", |s| {
        s.edge("Q").backable();
    });
    let graph = builder.finalize();
    let p = graph.node_id("P").unwrap();
    let q = graph.node_id("Q").unwrap();
    let s = graph.node_id("S").unwrap();

    let route = PathFinder::new(&graph)
        .find_route(s, "P", &UserState::new(), &[p, q])
        .unwrap();
    assert_eq!(
        route.steps(),
        &[
            RouteStep::Back { from: s, to: q },
            RouteStep::Back { from: q, to: p },
        ]
    );
}
