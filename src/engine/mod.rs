//! Render thread feeding a lock-free sample queue.
//!
//! The device callback must not block on the graph lock, so a dedicated
//! thread renders blocks ahead of time into an `rtrb` ring buffer and the
//! callback only pops finished samples.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info};

use crate::{config::EngineConfig, graph::SharedGraph};

/// How long the render thread waits when the queue has no room for a block.
const IDLE_WAIT: Duration = Duration::from_millis(1);

pub struct AudioEngine {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AudioEngine {
    /// Spawn the render thread and return the consuming end of its queue.
    pub fn start(graph: SharedGraph, config: &EngineConfig) -> std::io::Result<(Self, Consumer<f32>)> {
        let block_size = config.block_size.max(1);
        let capacity = config.ring_capacity.max(block_size);
        let (producer, consumer) = RingBuffer::new(capacity);
        let running = Arc::new(AtomicBool::new(true));

        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("patchbay-render".into())
            .spawn(move || render_loop(graph, producer, flag, block_size))?;

        info!(block_size, capacity, "render thread started");
        Ok((
            Self {
                running,
                handle: Some(handle),
            },
            consumer,
        ))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the render thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("render thread panicked");
            }
            info!("render thread stopped");
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn render_loop(graph: SharedGraph, mut producer: Producer<f32>, running: Arc<AtomicBool>, block_size: usize) {
    let mut block = vec![0.0f32; block_size];
    while running.load(Ordering::Acquire) {
        if producer.is_abandoned() {
            debug!("output queue abandoned");
            break;
        }
        if producer.slots() < block_size {
            thread::sleep(IDLE_WAIT);
            continue;
        }
        graph.render(&mut block);
        for &sample in &block {
            if producer.push(sample).is_err() {
                break;
            }
        }
    }
    running.store(false, Ordering::Release);
}

/// Render `frames` samples on the calling thread, `block_size` per lock.
pub fn render_offline(graph: &SharedGraph, frames: usize, block_size: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; frames];
    for chunk in out.chunks_mut(block_size.max(1)) {
        graph.render(chunk);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeGraph;

    fn constant(value: f32) -> SharedGraph {
        let mut graph = NodeGraph::new(EngineConfig::default());
        let source = graph.add_node_with("Value", &[("value", value)]).unwrap();
        let out = graph.output().unwrap();
        graph.set_param(out, "dc_block", 0.0).unwrap();
        graph.connect(source, 0, out, 0).unwrap();
        SharedGraph::new(graph)
    }

    #[test]
    fn engine_fills_the_queue() {
        let config = EngineConfig::default().with_block_size(32).with_ring_capacity(256);
        let (mut engine, mut consumer) = AudioEngine::start(constant(0.5), &config).unwrap();

        let mut received = Vec::new();
        while received.len() < 512 {
            match consumer.pop() {
                Ok(sample) => received.push(sample),
                Err(_) => thread::sleep(Duration::from_millis(1)),
            }
        }
        engine.stop();

        assert!(!engine.is_running());
        assert!(received.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn dropping_the_consumer_ends_the_thread() {
        let config = EngineConfig::default().with_block_size(16).with_ring_capacity(64);
        let (engine, consumer) = AudioEngine::start(constant(0.1), &config).unwrap();
        drop(consumer);
        for _ in 0..1_000 {
            if !engine.is_running() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!engine.is_running());
    }

    #[test]
    fn offline_render_matches_solve() {
        let shared = constant(0.25);
        let rendered = render_offline(&shared, 100, 7);
        assert_eq!(rendered.len(), 100);
        assert!(rendered.iter().all(|&s| s == 0.25));
        assert_eq!(shared.read(|graph| graph.tick()), 100);
    }
}
