//! Shared, lock-protected graph handle
//!
//! `Graph` itself is a single-owner value; the borrow checker keeps queries
//! and mutations apart. `SharedGraph` is for callers that hand one graph to
//! several threads: reads run concurrently, writes are serialized.

use super::Graph;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Run a query under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a mutation under the write lock
    pub fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Take the graph back if this is the last handle
    pub fn try_unwrap(self) -> Result<Graph, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Alignment, NewAnnotation};
    use std::thread;

    #[test]
    fn test_concurrent_reads_and_writes() {
        let mut graph = Graph::new("shared");
        graph
            .add_layer("turn", "transcript", Alignment::Interval)
            .unwrap();
        let shared = SharedGraph::new(graph);

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.write(|g| {
                        g.add_annotation(NewAnnotation::new("turn", format!("t{}", i)))
                            .unwrap();
                    })
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }

        assert_eq!(shared.read(|g| g.labels("turn").unwrap().len()), 4);
        assert_eq!(shared.read(|g| g.anchors().len()), 8);

        let graph = shared.try_unwrap().unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_try_unwrap_with_other_handles() {
        let shared = SharedGraph::from(Graph::new("g"));
        let other = shared.clone();
        let shared = shared.try_unwrap().unwrap_err();
        drop(other);
        assert!(shared.try_unwrap().is_ok());
    }
}
