use patchbay::{EngineConfig, GraphError, NodeGraph, NodeId};

fn graph() -> NodeGraph {
    NodeGraph::new(EngineConfig::default())
}

/// Every registered type wired in a loose web, some inputs left open.
fn busy_graph() -> NodeGraph {
    let mut graph = graph();
    let out = graph.output().unwrap();
    let types = graph.registry().type_names();
    let mut ids = Vec::new();
    for type_name in types {
        if type_name == "Output" {
            continue;
        }
        ids.push(graph.add_node(type_name).unwrap());
    }

    // Chain each node into the next one's first input where both ports exist
    for pair in ids.windows(2) {
        let _ = graph.connect(pair[0], 0, pair[1], 0);
    }
    let last = *ids.last().unwrap();
    graph.connect(last, 0, out, 0).unwrap();
    graph
}

fn assert_topological(graph: &NodeGraph) {
    let order = graph.order();
    let position = |id: NodeId| order.iter().position(|&n| n == id);
    for link in graph.links() {
        if let (Some(from), Some(to)) = (position(link.from), position(link.to)) {
            assert!(from < to, "{} scheduled after {}", link.from, link.to);
        }
    }
}

#[test]
fn every_sample_is_finite_and_bounded() {
    let mut graph = busy_graph();
    for _ in 0..20_000 {
        let sample = graph.solve();
        assert!(sample.is_finite());
        assert!((-1.0..=1.0).contains(&sample));
    }
}

#[test]
fn zeroed_parameters_stay_finite() {
    let mut graph = busy_graph();
    for id in graph.node_ids() {
        let names: Vec<&str> = graph
            .node(id)
            .unwrap()
            .params()
            .iter()
            .map(|(name, _)| name)
            .collect();
        for name in names {
            graph.set_param(id, name, 0.0).unwrap();
        }
    }
    let mut block = vec![0.0; 4_096];
    graph.render(&mut block);
    assert!(block.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
}

#[test]
fn order_respects_links() {
    let graph = busy_graph();
    assert_topological(&graph);
    assert_eq!(graph.order().last(), graph.output().as_ref());
}

#[test]
fn rebuilding_is_idempotent() {
    let mut graph = busy_graph();
    let first = graph.order().to_vec();
    graph.rebuild();
    assert_eq!(graph.order(), &first[..]);
    graph.rebuild();
    assert_eq!(graph.order(), &first[..]);
}

#[test]
fn removal_purges_links_and_schedule() {
    let mut graph = busy_graph();
    let victim = graph.order()[graph.order().len() / 2];
    graph.remove_node(victim).unwrap();

    assert!(graph.links().iter().all(|link| !link.touches(victim)));
    assert!(!graph.order().contains(&victim));
    assert_topological(&graph);
    for _ in 0..1_000 {
        assert!(graph.solve().is_finite());
    }
}

#[test]
fn cycles_leave_the_graph_untouched() {
    let mut graph = graph();
    let a = graph.add_node("Math").unwrap();
    let b = graph.add_node("Math").unwrap();
    let c = graph.add_node("Math").unwrap();
    graph.connect(a, 0, b, 0).unwrap();
    graph.connect(b, 0, c, 0).unwrap();

    let links = graph.links();
    let order = graph.order().to_vec();
    assert_eq!(graph.connect(c, 0, a, 1), Err(GraphError::Cycle { from: c, to: a }));
    assert_eq!(graph.links(), links);
    assert_eq!(graph.order(), &order[..]);
}

#[test]
fn replacing_a_link_may_break_what_would_be_a_cycle() {
    // Relinking b's first input from c removes the only a -> b path
    let mut graph = graph();
    let a = graph.add_node("Math").unwrap();
    let b = graph.add_node("Math").unwrap();
    graph.connect(a, 0, b, 0).unwrap();
    assert!(matches!(graph.connect(b, 0, a, 0), Err(GraphError::Cycle { .. })));

    graph.connect(b, 0, b, 0).unwrap_err();
    let c = graph.add_node("Value").unwrap();
    graph.connect(c, 0, b, 0).unwrap();
    assert_eq!(graph.links().len(), 1);
    // With a no longer feeding b, b may now feed a
    graph.connect(b, 0, a, 0).unwrap();
    assert_topological(&graph);
}

#[test]
fn identical_connect_returns_the_existing_link() {
    let mut graph = graph();
    let value = graph.add_node("Value").unwrap();
    let out = graph.output().unwrap();
    let first = graph.connect(value, 0, out, 0).unwrap();
    let again = graph.connect(value, 0, out, 0).unwrap();
    assert_eq!(first, again);
    assert_eq!(graph.links().len(), 1);
}

#[test]
fn writers_run_without_consumers() {
    let mut graph = graph();
    let value = graph.add_node_with("Value", &[("value", 0.3)]).unwrap();
    let writer = graph.add_node_with("Writer", &[("slot", 2.0)]).unwrap();
    graph.connect(value, 0, writer, 0).unwrap();
    assert!(graph.order().contains(&writer));

    graph.solve();
    assert_eq!(graph.storage().read(2)[0], 0.3);
}

#[test]
fn reader_follows_writer_through_storage() {
    let mut graph = graph();
    let out = graph.output().unwrap();
    let value = graph.add_node_with("Value", &[("value", 0.6)]).unwrap();
    let writer = graph.add_node_with("Writer", &[("slot", 5.0)]).unwrap();
    let reader = graph.add_node_with("Reader", &[("slot", 5.0)]).unwrap();
    graph.connect(value, 0, writer, 0).unwrap();
    graph.connect(reader, 0, out, 0).unwrap();

    // Sinks run before the root's own dependencies
    assert!((graph.solve() - 0.6).abs() < 1e-4);
}
