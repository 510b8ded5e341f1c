use std::fmt::Debug;

use crate::{
    Graph, GraphMut,
    format_debug::format_debug,
    graph_id::GraphId,
    id_vec::{IdVec, IdVecKey},
};

mod ids;

pub use ids::{EdgeId, NodeId};

struct NodeSlot<N> {
    data: N,
    edges_out: Vec<IdVecKey>,
    edges_in: Vec<IdVecKey>,
}

struct EdgeSlot<E> {
    data: E,
    from: IdVecKey,
    into: IdVecKey,
}

/// A directed multigraph storing nodes and edges in two arenas addressed by
/// integer keys.
///
/// Nodes are enumerated in insertion order.  Each node keeps its outgoing and
/// incoming edges in insertion order, so [`Graph::edges_from`] and
/// [`Graph::edges_into`] are deterministic, and so is every search built on
/// them.  Keys are never reused: a `NodeId` or `EdgeId` whose entity has been
/// removed is rejected rather than silently aliasing a newer entity.
///
/// # Type Parameters
/// * `N` - The type of data stored in nodes
/// * `E` - The type of data stored in edges
pub struct ArenaGraph<N, E> {
    nodes: IdVec<NodeSlot<N>>,
    edges: IdVec<EdgeSlot<E>>,
    id: GraphId,
}

impl<N, E> ArenaGraph<N, E> {
    fn node_id(&self, key: IdVecKey) -> NodeId {
        NodeId::new(key, self.id)
    }

    fn edge_id(&self, key: IdVecKey) -> EdgeId {
        let slot = self.edges.get(key).expect("no such edge");
        EdgeId::new(key, slot.from, slot.into, self.id)
    }

    fn node(&self, id: &NodeId) -> &NodeSlot<N> {
        self.assert_valid_node_id(id);
        self.nodes.get(id.key).expect("no such node")
    }

    fn node_mut(&mut self, key: IdVecKey) -> &mut NodeSlot<N> {
        self.nodes.get_mut(key).expect("no such node")
    }

    fn edge(&self, id: &EdgeId) -> &EdgeSlot<E> {
        self.assert_valid_edge_id(id);
        self.edges.get(id.key).expect("no such edge")
    }

    /// Detaches an edge from its end nodes and frees its slot.
    fn unlink_edge(&mut self, key: IdVecKey) -> E {
        let slot = self.edges.remove(key).expect("no such edge");
        if let Some(from) = self.nodes.get_mut(slot.from) {
            from.edges_out.retain(|&k| k != key);
        }
        if let Some(into) = self.nodes.get_mut(slot.into) {
            into.edges_in.retain(|&k| k != key);
        }
        slot.data
    }
}

impl<N, E> Graph for ArenaGraph<N, E> {
    type NodeId = NodeId;
    type NodeData = N;
    type EdgeId = EdgeId;
    type EdgeData = E;

    /// Gets an iterator over all node identifiers in insertion order.
    fn node_ids(&self) -> impl Iterator<Item = Self::NodeId> + '_ {
        self.nodes.iter_keys().map(|key| self.node_id(key))
    }

    fn node_data(&self, id: Self::NodeId) -> &Self::NodeData {
        &self.node(&id).data
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn check_valid_node_id(&self, id: &Self::NodeId) -> Result<(), &'static str> {
        if self.id != id.graph_id {
            return Err("NodeId graph_id does not match graph");
        }
        if !self.nodes.contains(id.key) {
            return Err("NodeId refers to a removed node");
        }
        Ok(())
    }

    fn edge_data(&self, id: Self::EdgeId) -> &Self::EdgeData {
        &self.edge(&id).data
    }

    /// Gets an iterator over all edge identifiers, grouped by source node in
    /// node insertion order, then by edge insertion order.
    fn edge_ids(&self) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.edges_out.iter().map(|&key| self.edge_id(key)))
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn check_valid_edge_id(&self, id: &Self::EdgeId) -> Result<(), &'static str> {
        if self.id != id.graph_id {
            return Err("EdgeId graph_id does not match graph");
        }
        if !self.edges.contains(id.key) {
            return Err("EdgeId refers to a removed edge");
        }
        Ok(())
    }

    /// Gets an iterator over the edges outgoing from the given node in
    /// insertion order.
    fn edges_from(&self, from: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.node(&from)
            .edges_out
            .iter()
            .map(|&key| self.edge_id(key))
    }

    /// Gets an iterator over the edges incoming to the given node in
    /// insertion order.
    fn edges_into(&self, into: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.node(&into)
            .edges_in
            .iter()
            .map(|&key| self.edge_id(key))
    }

    fn num_edges_from(&self, from: Self::NodeId) -> usize {
        self.node(&from).edges_out.len()
    }

    fn num_edges_into(&self, into: Self::NodeId) -> usize {
        self.node(&into).edges_in.len()
    }
}

impl<N, E> GraphMut for ArenaGraph<N, E> {
    fn new() -> Self {
        Self {
            nodes: IdVec::new(),
            edges: IdVec::new(),
            id: GraphId::new(),
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    fn add_node(&mut self, data: Self::NodeData) -> Self::NodeId {
        let key = self.nodes.insert(NodeSlot {
            data,
            edges_out: Vec::new(),
            edges_in: Vec::new(),
        });
        self.node_id(key)
    }

    fn remove_node(&mut self, id: Self::NodeId) -> Self::NodeData {
        let node = self.node(&id);
        let mut incident: Vec<IdVecKey> = node.edges_out.clone();
        // Self-loops appear in both lists.
        incident.extend(node.edges_in.iter().filter(|&&key| {
            self.edges
                .get(key)
                .is_some_and(|edge| edge.from != id.key)
        }));
        for key in incident {
            self.unlink_edge(key);
        }
        self.nodes.remove(id.key).expect("no such node").data
    }

    fn add_edge(
        &mut self,
        from: Self::NodeId,
        into: Self::NodeId,
        data: Self::EdgeData,
    ) -> Self::EdgeId {
        self.assert_valid_node_id(&from);
        self.assert_valid_node_id(&into);
        let key = self.edges.insert(EdgeSlot {
            data,
            from: from.key,
            into: into.key,
        });
        self.node_mut(from.key).edges_out.push(key);
        self.node_mut(into.key).edges_in.push(key);
        EdgeId::new(key, from.key, into.key, self.id)
    }

    fn remove_edge(&mut self, id: Self::EdgeId) -> Self::EdgeData {
        self.assert_valid_edge_id(&id);
        self.unlink_edge(id.key)
    }
}

impl<N, E> Default for ArenaGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Clone for ArenaGraph<N, E>
where
    N: Clone,
    E: Clone,
{
    /// Clones the graph structure.  The clone is a distinct graph: identifiers
    /// from the original are not valid in it.
    fn clone(&self) -> Self {
        let mut new_graph = ArenaGraph::new();
        new_graph.copy_from_with(self, Clone::clone, Clone::clone);
        new_graph
    }
}

impl<N, E> Debug for ArenaGraph<N, E>
where
    N: Debug,
    E: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_debug(self, f, "ArenaGraph")
    }
}
