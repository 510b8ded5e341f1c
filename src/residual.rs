use std::{collections::HashMap, fmt::Debug};

use crate::{Graph, format_debug::format_debug};

/// A view of a graph restricted to the edges with positive residual
/// capacity.
///
/// The view borrows both the graph and the residual map, so it always
/// reflects the current residuals.  Edges missing from the map count as
/// saturated.  All nodes of the underlying graph are visible.
pub struct ResidualGraph<'a, G: Graph> {
    inner: &'a G,
    residuals: &'a HashMap<G::EdgeId, f64>,
}

impl<'a, G: Graph> ResidualGraph<'a, G> {
    pub fn new(inner: &'a G, residuals: &'a HashMap<G::EdgeId, f64>) -> Self {
        Self { inner, residuals }
    }

    /// Gets the residual capacity of an edge of the underlying graph.
    pub fn residual(&self, id: &G::EdgeId) -> f64 {
        self.residuals.get(id).copied().unwrap_or(0.0)
    }

    fn is_open(&self, id: &G::EdgeId) -> bool {
        self.residual(id) > 0.0
    }
}

impl<G: Graph> Graph for ResidualGraph<'_, G> {
    type NodeData = G::NodeData;
    type NodeId = G::NodeId;
    type EdgeData = G::EdgeData;
    type EdgeId = G::EdgeId;

    fn node_ids(&self) -> impl Iterator<Item = Self::NodeId> + '_ {
        self.inner.node_ids()
    }

    fn node_data(&self, id: Self::NodeId) -> &Self::NodeData {
        self.inner.node_data(id)
    }

    fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }

    fn check_valid_node_id(&self, id: &Self::NodeId) -> Result<(), &'static str> {
        self.inner.check_valid_node_id(id)
    }

    fn edge_data(&self, id: Self::EdgeId) -> &Self::EdgeData {
        self.inner.edge_data(id)
    }

    fn edge_ids(&self) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.inner.edge_ids().filter(|eid| self.is_open(eid))
    }

    fn check_valid_edge_id(&self, id: &Self::EdgeId) -> Result<(), &'static str> {
        self.inner.check_valid_edge_id(id)?;
        if self.is_open(id) {
            Ok(())
        } else {
            Err("EdgeId refers to a saturated edge")
        }
    }

    fn edges_from(&self, from: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.inner.edges_from(from).filter(|eid| self.is_open(eid))
    }

    fn edges_into(&self, into: Self::NodeId) -> impl Iterator<Item = Self::EdgeId> + '_ {
        self.inner.edges_into(into).filter(|eid| self.is_open(eid))
    }
}

impl<G> Debug for ResidualGraph<'_, G>
where
    G: Graph,
    G::NodeData: Debug,
    G::EdgeData: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_debug(self, f, "ResidualGraph")
    }
}
