use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide counter handing out graph identifiers.
static GRAPH_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A unique identifier for a graph instance, stamped into every node and edge
/// identifier the graph hands out so that identifiers from one graph are
/// rejected by another.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct GraphId(usize);

impl GraphId {
    /// Creates a new unique graph identifier.
    pub fn new() -> Self {
        GraphId(GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}
