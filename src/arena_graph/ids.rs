use std::fmt::Debug;

use derivative::Derivative;

use crate::{graph_id::GraphId, id_vec::IdVecKey};

/// Node identifier for [`ArenaGraph`](super::ArenaGraph).
///
/// Wraps the arena key of the node slot together with the owning graph's ID.
#[derive(Derivative)]
#[derivative(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(super) key: IdVecKey,
    #[derivative(Hash = "ignore", PartialOrd = "ignore", Ord = "ignore")]
    pub(super) graph_id: GraphId,
}

impl NodeId {
    pub(super) fn new(key: IdVecKey, graph_id: GraphId) -> Self {
        Self { key, graph_id }
    }

    /// Gets the position of the node in insertion order across the lifetime
    /// of the graph.
    pub fn index(&self) -> usize {
        self.key.index()
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.key.index())
    }
}

impl crate::graph::NodeId for NodeId {}

/// Edge identifier for [`ArenaGraph`](super::ArenaGraph).
///
/// Carries the arena key of the edge slot and the keys of both ends, so the
/// ends can be read without consulting the graph.  Identity is decided by the
/// edge key alone; parallel edges between the same nodes are distinct.
#[derive(Derivative)]
#[derivative(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    pub(super) key: IdVecKey,
    #[derivative(PartialEq = "ignore", Hash = "ignore", PartialOrd = "ignore", Ord = "ignore")]
    pub(super) from: IdVecKey,
    #[derivative(PartialEq = "ignore", Hash = "ignore", PartialOrd = "ignore", Ord = "ignore")]
    pub(super) into: IdVecKey,
    #[derivative(Hash = "ignore", PartialOrd = "ignore", Ord = "ignore")]
    pub(super) graph_id: GraphId,
}

impl EdgeId {
    pub(super) fn new(key: IdVecKey, from: IdVecKey, into: IdVecKey, graph_id: GraphId) -> Self {
        Self {
            key,
            from,
            into,
            graph_id,
        }
    }

    /// Gets the position of the edge in insertion order across the lifetime
    /// of the graph.
    pub fn index(&self) -> usize {
        self.key.index()
    }
}

impl Debug for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EdgeId({}: {} -> {})",
            self.key.index(),
            self.from.index(),
            self.into.index()
        )
    }
}

impl crate::graph::EdgeId for EdgeId {
    type NodeId = NodeId;

    fn source(&self) -> NodeId {
        NodeId::new(self.from, self.graph_id)
    }

    fn target(&self) -> NodeId {
        NodeId::new(self.into, self.graph_id)
    }
}
