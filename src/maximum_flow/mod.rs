//! Maximum flow between a source and a sink.

use std::collections::HashMap;

use crate::{
    Graph, GraphMut,
    error::Result,
    reverse_edges::ReverseEdgeAugmentor,
};

mod edmonds_karp;

pub use edmonds_karp::EdmondsKarp;

/// A maximum-flow algorithm over a capacity network.
///
/// Implementations keep the state of their last computation, so the
/// accessors describe the most recent successful or failed
/// [`compute`](Self::compute).
pub trait MaximumFlow<G: Graph> {
    /// Computes the maximum flow from `source` to `sink`, returning its
    /// value.
    fn compute(&mut self, source: G::NodeId, sink: G::NodeId) -> Result<f64>;

    /// Gets the value of the last computed flow.
    fn max_flow(&self) -> f64;

    fn residual_capacities(&self) -> &HashMap<G::EdgeId, f64>;

    fn residual_capacity(&self, edge: &G::EdgeId) -> Option<f64> {
        self.residual_capacities().get(edge).copied()
    }

    /// Gets the tree edges of the last augmenting-path search.
    fn predecessors(&self) -> &HashMap<G::NodeId, G::EdgeId>;

    fn source(&self) -> Option<&G::NodeId>;

    fn sink(&self) -> Option<&G::NodeId>;
}

/// Computes the maximum flow from `source` to `sink` in one call.
///
/// Pairs every edge with a reverse edge (synthesising missing ones with
/// `edge_factory`), runs [`EdmondsKarp`], then removes the synthesised edges
/// again, so the graph is left as it was found.  `capacities` is only asked
/// about edges that were in the graph beforehand; synthesised reverse edges
/// have capacity zero.
pub fn maximum_flow<G, C, EF>(
    graph: &mut G,
    capacities: C,
    source: G::NodeId,
    sink: G::NodeId,
    edge_factory: EF,
) -> Result<f64>
where
    G: GraphMut,
    C: Fn(&G::EdgeId) -> f64,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    let mut reverser = ReverseEdgeAugmentor::new(graph, edge_factory);
    reverser.add_reversed_edges()?;
    let flow = {
        let capacity = |edge: &G::EdgeId| {
            if reverser.is_synthesized(edge) {
                0.0
            } else {
                capacities(edge)
            }
        };
        let mut engine = EdmondsKarp::new(&reverser, capacity);
        engine.compute(source, sink)?
    };
    reverser.remove_reversed_edges()?;
    Ok(flow)
}
