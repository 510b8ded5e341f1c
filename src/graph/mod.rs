use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
};

use crate::search::{BfsIterator, SearchState};

/// A trait representing a node identifier in a graph.
///
/// This trait has no methods but serves as a marker for types that can be used
/// as node identifiers.
pub trait NodeId: Eq + Hash + Clone + Debug {}

/// A trait representing a directed edge identifier in a graph.  An edge
/// identifier knows both of its ends without consulting the graph.
pub trait EdgeId: Eq + Hash + Clone + Debug {
    type NodeId: NodeId;

    /// Gets the source node of the edge.
    fn source(&self) -> Self::NodeId;

    /// Gets the target node of the edge.
    fn target(&self) -> Self::NodeId;

    /// Gets both ends of the edge as a tuple (source, target).
    fn ends(&self) -> (Self::NodeId, Self::NodeId) {
        (self.source(), self.target())
    }

    /// Checks whether the given node is one of the ends of the edge.
    fn touches(&self, node: &Self::NodeId) -> bool {
        &self.source() == node || &self.target() == node
    }

    /// Checks whether `other` runs between the same nodes in the opposite
    /// direction.
    fn is_reverse_of(&self, other: &Self) -> bool {
        self.source() == other.target() && self.target() == other.source()
    }
}

/// A trait representing a directed graph.  Methods that return iterators
/// over nodes or edges return them in an unspecified order unless otherwise
/// noted by the implementation.
///
/// For the sake of performance, it is recommended that implementations of
/// this trait override the following methods, whose default implementations
/// scan every edge in the graph:
///
/// - [`Self::check_valid_node_id`]
/// - [`Self::edges_from`]
/// - [`Self::edges_into`]
/// - [`Self::num_edges_from`]
/// - [`Self::num_edges_into`]
pub trait Graph: Sized {
    type NodeData;
    type NodeId: NodeId;
    type EdgeData;
    type EdgeId: EdgeId<NodeId = Self::NodeId>;

    // Nodes

    /// Gets an iterator over all NodeIds in the graph.
    fn node_ids(&self) -> impl Iterator<Item = Self::NodeId> + '_;

    /// Gets the data associated with a node.
    fn node_data(&self, id: Self::NodeId) -> &Self::NodeData;

    /// Gets the number of nodes in the graph.
    fn num_nodes(&self) -> usize {
        self.node_ids().count()
    }

    /// Checks whether the graph has no nodes.
    fn is_empty(&self) -> bool {
        self.num_nodes() == 0
    }

    /// Checks if a NodeId is valid in the graph, returning a reason if it is
    /// not.
    fn check_valid_node_id(&self, id: &Self::NodeId) -> Result<(), &'static str> {
        if self.node_ids().any(|nid| &nid == id) {
            Ok(())
        } else {
            Err("NodeId not found in graph")
        }
    }

    /// Checks whether the graph contains the given node.
    fn contains_node(&self, id: &Self::NodeId) -> bool {
        self.check_valid_node_id(id).is_ok()
    }

    /// Panics if the given NodeId is not valid in the graph.  Skipped
    /// entirely when the `unchecked` feature is enabled.
    fn assert_valid_node_id(&self, id: &Self::NodeId) {
        #[cfg(not(feature = "unchecked"))]
        if let Err(reason) = self.check_valid_node_id(id) {
            panic!("Invalid NodeId: {:?}: {}", id, reason);
        }
        #[cfg(feature = "unchecked")]
        let _ = id;
    }

    /// Gets an iterator over the predecessor nodes of a given node, i.e.
    /// those nodes reachable by incoming edges.
    fn predecessors(&self, node: Self::NodeId) -> impl Iterator<Item = Self::NodeId> + '_ {
        let mut visited = HashSet::new();
        self.edges_into(node).filter_map(move |eid| {
            let nid = eid.source();
            visited.insert(nid.clone()).then_some(nid)
        })
    }

    /// Gets an iterator over the successor nodes of a given node, i.e.
    /// those nodes reachable by outgoing edges.
    fn successors(&self, node: Self::NodeId) -> impl Iterator<Item = Self::NodeId> + '_ {
        let mut visited = HashSet::new();
        self.edges_from(node).filter_map(move |eid| {
            let nid = eid.target();
            visited.insert(nid.clone()).then_some(nid)
        })
    }

    // Edges

    /// Gets the data associated with an edge.
    fn edge_data(&self, id: Self::EdgeId) -> &Self::EdgeData;

    /// Gets an iterator over all edges in the graph.
    fn edge_ids(&self) -> impl Iterator<Item = Self::EdgeId> + '_;

    /// Checks if an EdgeId is valid in the graph, returning a reason if it is
    /// not.
    fn check_valid_edge_id(&self, id: &Self::EdgeId) -> Result<(), &'static str> {
        if self.edge_ids().any(|eid| &eid == id) {
            Ok(())
        } else {
            Err("EdgeId not found in graph")
        }
    }

    /// Checks whether the graph contains the given edge.
    fn contains_edge(&self, id: &Self::EdgeId) -> bool {
        self.check_valid_edge_id(id).is_ok()
    }

    /// Panics if the given EdgeId is not valid in the graph.  Skipped
    /// entirely when the `unchecked` feature is enabled.
    fn assert_valid_edge_id(&self, id: &Self::EdgeId) {
        #[cfg(not(feature = "unchecked"))]
        if let Err(reason) = self.check_valid_edge_id(id) {
            panic!("Invalid EdgeId: {:?}: {}", id, reason);
        }
        #[cfg(feature = "unchecked")]
        let _ = id;
    }

    /// Gets an iterator over the outgoing edges from a given node.
    fn edges_from(&self, from: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.edge_ids().filter(move |eid| eid.source() == from)
    }

    /// Gets an iterator over the incoming edges to a given node.
    fn edges_into(&self, into: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.edge_ids().filter(move |eid| eid.target() == into)
    }

    /// Gets an iterator over the edges from one node to another.
    fn edges_from_into(
        &self,
        from: Self::NodeId,
        into: Self::NodeId,
    ) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.edges_from(from).filter(move |eid| eid.target() == into)
    }

    /// Checks if there is at least one edge from one node to another.
    fn has_edge_from_into(&self, from: Self::NodeId, into: Self::NodeId) -> bool {
        self.edges_from_into(from, into).next().is_some()
    }

    /// Checks if there is at least one outgoing edge from the given node.
    fn has_edge_from(&self, from: Self::NodeId) -> bool {
        self.edges_from(from).next().is_some()
    }

    /// Checks if there is at least one incoming edge to the given node.
    fn has_edge_into(&self, into: Self::NodeId) -> bool {
        self.edges_into(into).next().is_some()
    }

    /// Gets the number of edges in the graph.
    fn num_edges(&self) -> usize {
        self.edge_ids().count()
    }

    /// Gets the number of incoming edges to a given node.
    fn num_edges_into(&self, into: Self::NodeId) -> usize {
        self.edges_into(into).count()
    }

    /// Gets the number of outgoing edges from a given node.
    fn num_edges_from(&self, from: Self::NodeId) -> usize {
        self.edges_from(from).count()
    }

    // Searches

    /// Performs a breadth-first search starting from the given node.
    fn bfs(&self, start: Self::NodeId) -> BfsIterator<'_, Self> {
        BfsIterator::new(self, vec![start])
    }

    /// Runs a breadth-first search from `start`, recording the tree edge
    /// used to reach every discovered node.  The returned state can be
    /// queried for node colours and predecessors.
    fn bfs_tree(&self, start: Self::NodeId) -> SearchState<Self::NodeId, Self::EdgeId> {
        let mut state = SearchState::new();
        state.run(self, start);
        state
    }
}

/// A trait for graphs that support mutation operations.
///
/// This trait extends [`Graph`] with methods for adding and removing nodes
/// and edges.  Identifiers handed out by `add_node` and `add_edge` must be
/// distinct from every identifier previously handed out by the same graph.
pub trait GraphMut: Graph {
    /// Creates a new, empty graph.
    fn new() -> Self;

    /// Removes all nodes and edges from the graph.
    fn clear(&mut self) {
        for nid in self.node_ids().collect::<Vec<_>>() {
            self.remove_node(nid);
        }
    }

    /// Adds a node with the given data to the graph, returning its `NodeId`.
    fn add_node(&mut self, data: Self::NodeData) -> Self::NodeId;

    /// Removes a node from the graph, returning its data.  Any edges
    /// connected to the node are also removed.
    fn remove_node(&mut self, id: Self::NodeId) -> Self::NodeData;

    /// Adds a new edge with the given data between two nodes and returns its
    /// `EdgeId`.  Parallel edges are permitted.
    fn add_edge(
        &mut self,
        from: Self::NodeId,
        into: Self::NodeId,
        data: Self::EdgeData,
    ) -> Self::EdgeId;

    /// Removes an edge, returning its data.
    fn remove_edge(&mut self, id: Self::EdgeId) -> Self::EdgeData;

    /// Copies all nodes and edges from another graph into this graph,
    /// transforming the node and edge data using the provided mapping
    /// functions.  Returns the mapping from source node IDs to new node IDs.
    fn copy_from_with<S, F, H>(
        &mut self,
        source: &S,
        mut map_node: F,
        mut map_edge: H,
    ) -> HashMap<S::NodeId, Self::NodeId>
    where
        S: Graph,
        F: FnMut(&S::NodeData) -> Self::NodeData,
        H: FnMut(&S::EdgeData) -> Self::EdgeData,
    {
        let mut node_map = HashMap::new();
        for nid in source.node_ids() {
            let new_nid = self.add_node(map_node(source.node_data(nid.clone())));
            node_map.insert(nid, new_nid);
        }
        for eid in source.edge_ids() {
            let (from, into) = eid.ends();
            let data = map_edge(source.edge_data(eid));
            self.add_edge(node_map[&from].clone(), node_map[&into].clone(), data);
        }
        node_map
    }
}
