use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use patchbay::{engine::render_offline, EngineConfig, NodeGraph, SharedGraph};

#[test]
fn edits_from_another_thread_never_corrupt_rendering() {
    let mut graph = NodeGraph::new(EngineConfig::default());
    let out = graph.output().unwrap();
    let osc = graph.add_node("Oscillator").unwrap();
    graph.connect(osc, 0, out, 0).unwrap();
    let shared = SharedGraph::new(graph);

    let done = Arc::new(AtomicBool::new(false));
    let editor = {
        let shared = shared.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut round = 0u32;
            while !done.load(Ordering::Relaxed) {
                shared.edit(|graph| {
                    let filter = graph.add_node_with("Filter", &[("cutoff", 200.0 + round as f32)]).unwrap();
                    graph.connect(osc, 0, filter, 0).unwrap();
                    graph.connect(filter, 0, out, 0).unwrap();
                    graph.set_param(osc, "frequency", 100.0 + (round % 50) as f32 * 10.0).unwrap();
                    if round % 2 == 1 {
                        graph.remove_node(filter).unwrap();
                    }
                });
                round += 1;
                thread::yield_now();
            }
            round
        })
    };

    let mut block = [0.0f32; 128];
    for _ in 0..500 {
        shared.render(&mut block);
        assert!(block.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }
    done.store(true, Ordering::Relaxed);
    let rounds = editor.join().unwrap();
    assert!(rounds > 0);

    shared.read(|graph| {
        let order = graph.order();
        assert_eq!(order.last(), graph.output().as_ref());
        for link in graph.links() {
            assert!(graph.contains(link.from) && graph.contains(link.to));
        }
    });
}

#[test]
fn renders_in_blocks_match_a_single_render() {
    let build = || {
        let mut graph = NodeGraph::new(EngineConfig::default());
        let out = graph.output().unwrap();
        let seq = graph.add_node("Sequencer").unwrap();
        let osc = graph.add_node_with("Oscillator", &[("waveform", 4.0)]).unwrap();
        graph.connect_named(seq, "frequency", osc, "frequency").unwrap();
        graph.connect_named(osc, "mix", out, "in").unwrap();
        SharedGraph::new(graph)
    };

    let whole = render_offline(&build(), 10_000, 10_000);
    let chunked = render_offline(&build(), 10_000, 61);
    assert_eq!(whole, chunked);
}

#[test]
fn note_sender_works_across_threads() {
    let mut graph = NodeGraph::new(EngineConfig::default());
    let out = graph.output().unwrap();
    let keys = graph.add_node("Keys").unwrap();
    graph.connect_named(keys, "gate", out, "in").unwrap();
    let mut sender = graph.note_sender(keys).unwrap().unwrap();
    let shared = SharedGraph::new(graph);

    thread::spawn(move || assert!(sender.note_on(69, 127))).join().unwrap();
    assert!((shared.solve() - 1.0).abs() < 1e-4);
}
