use std::sync::{Arc, Mutex, MutexGuard};

use super::NodeGraph;

/// A [`NodeGraph`] shared between an editor thread and the audio thread.
///
/// Every edit runs to completion under one lock, including the order
/// rebuild, so a concurrent `solve` sees either the graph before the edit or
/// after it. A panic while the lock was held does not wedge audio: the
/// poisoned guard is recovered and used as is.
#[derive(Clone)]
pub struct SharedGraph {
    inner: Arc<Mutex<NodeGraph>>,
}

impl SharedGraph {
    pub fn new(graph: NodeGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeGraph> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply an edit atomically with respect to `solve`.
    pub fn edit<R>(&self, f: impl FnOnce(&mut NodeGraph) -> R) -> R {
        let mut graph = self.lock();
        f(&mut graph)
    }

    /// Read-only access under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&NodeGraph) -> R) -> R {
        let graph = self.lock();
        f(&graph)
    }

    pub fn solve(&self) -> f32 {
        self.lock().solve()
    }

    /// Render a block under a single lock acquisition.
    pub fn render(&self, out: &mut [f32]) {
        self.lock().render(out);
    }
}
