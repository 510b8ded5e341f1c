//! Maximum bipartite matching by reduction to maximum flow.

use std::collections::HashSet;

use derivative::Derivative;

use crate::{
    EdgeId, GraphMut,
    augment::{AugmentStrategy, BipartiteToFlow, GraphAugmentor},
    cancel::CancellationToken,
    error::{FlowError, Result},
    maximum_flow::{EdmondsKarp, MaximumFlow},
    reverse_edges::ReverseEdgeAugmentor,
};

/// Residual capacity at or below which an edge counts as saturated.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Finds a maximum set of edges from the left partition to the right
/// partition such that no two edges share a node.
///
/// [`compute`](Self::compute) augments the graph with a super source and a
/// super sink, pairs every edge with a reverse edge, runs [`EdmondsKarp`]
/// with unit capacities on left-to-right edges, reads off the saturated edges and then undoes every
/// mutation, whether the computation succeeded or not.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct MaximumBipartiteMatching<'g, G, NF, EF>
where
    G: GraphMut,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    #[derivative(Debug = "ignore")]
    graph: &'g mut G,
    partitions: BipartiteToFlow<G::NodeId>,
    #[derivative(Debug = "ignore")]
    node_factory: NF,
    #[derivative(Debug = "ignore")]
    edge_factory: EF,
    matched: Vec<G::EdgeId>,
    tolerance: f64,
    cancellation: Option<CancellationToken>,
}

impl<'g, G, NF, EF> MaximumBipartiteMatching<'g, G, NF, EF>
where
    G: GraphMut,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    /// Creates a matcher for edges running from `left` to `right`.
    ///
    /// Fails with node-not-found if a partition names a node missing from
    /// the graph, and with invalid-argument if the partitions overlap.
    pub fn new(
        graph: &'g mut G,
        left: impl IntoIterator<Item = G::NodeId>,
        right: impl IntoIterator<Item = G::NodeId>,
        node_factory: NF,
        edge_factory: EF,
    ) -> Result<Self> {
        let partitions = BipartiteToFlow::new(left, right);
        <BipartiteToFlow<G::NodeId> as AugmentStrategy<G>>::validate(&partitions, graph)?;
        Ok(Self {
            graph,
            partitions,
            node_factory,
            edge_factory,
            matched: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
            cancellation: None,
        })
    }

    /// Sets the residual capacity at or below which an edge counts as
    /// saturated.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn left(&self) -> &[G::NodeId] {
        self.partitions.left()
    }

    pub fn right(&self) -> &[G::NodeId] {
        self.partitions.right()
    }

    /// Gets the edges of the last computed matching.
    pub fn matched_edges(&self) -> &[G::EdgeId] {
        &self.matched
    }

    pub fn matching_size(&self) -> usize {
        self.matched.len()
    }

    /// Computes a maximum matching.  The graph is restored before this
    /// returns, on success and on failure alike.
    pub fn compute(&mut self) -> Result<()> {
        let _span = tracing::debug_span!(
            "bipartite_matching",
            left = self.partitions.left().len(),
            right = self.partitions.right().len()
        )
        .entered();
        self.matched.clear();
        let tolerance = self.tolerance;
        let cancellation = self.cancellation.clone();
        let left: HashSet<_> = self.partitions.left().iter().cloned().collect();
        let right: HashSet<_> = self.partitions.right().iter().cloned().collect();

        let mut augmentor = GraphAugmentor::new(
            &mut *self.graph,
            self.partitions.clone(),
            &mut self.node_factory,
            &self.edge_factory,
        )?;
        if let Some(token) = &cancellation {
            augmentor = augmentor.with_cancellation(token.clone());
        }
        augmentor.compute()?;
        let (Some(source), Some(sink)) = (
            augmentor.super_source().cloned(),
            augmentor.super_sink().cloned(),
        ) else {
            return Err(FlowError::InvalidState("augmentation added no super nodes"));
        };

        let matched = {
            let mut reverser = ReverseEdgeAugmentor::new(augmentor.graph_mut(), &self.edge_factory);
            if let Some(token) = &cancellation {
                reverser = reverser.with_cancellation(token.clone());
            }
            reverser.add_reversed_edges()?;

            let matched = {
                // Only super edges and left-to-right edges carry flow.
                let capacity = |edge: &G::EdgeId| {
                    let forward = edge.touches(&source)
                        || edge.touches(&sink)
                        || (left.contains(&edge.source()) && right.contains(&edge.target()));
                    if forward && !reverser.is_synthesized(edge) {
                        1.0
                    } else {
                        0.0
                    }
                };
                let mut engine = EdmondsKarp::new(&reverser, capacity);
                if let Some(token) = &cancellation {
                    engine = engine.with_cancellation(token.clone());
                }
                engine.compute(source.clone(), sink.clone())?;
                reverser
                    .graph()
                    .edge_ids()
                    .filter(|edge| {
                        left.contains(&edge.source())
                            && right.contains(&edge.target())
                            && !reverser.is_synthesized(edge)
                            && engine
                                .residual_capacity(edge)
                                .is_some_and(|residual| residual <= tolerance)
                    })
                    .collect::<Vec<_>>()
            };
            reverser.remove_reversed_edges()?;
            matched
        };
        augmentor.rollback()?;

        self.matched = matched;
        tracing::debug!(size = self.matched.len(), "maximum matching computed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{ArenaGraph, Graph, arena_graph::NodeId};

    fn create_graph(
        left: &[u32],
        right: &[u32],
        edges: &[(u32, u32)],
    ) -> (ArenaGraph<u32, ()>, Vec<NodeId>, Vec<NodeId>) {
        let mut graph = ArenaGraph::new();
        let mut ids = std::collections::HashMap::new();
        for &label in left.iter().chain(right) {
            ids.insert(label, graph.add_node(label));
        }
        for &(from, into) in edges {
            graph.add_edge(ids[&from], ids[&into], ());
        }
        let left = left.iter().map(|label| ids[label]).collect();
        let right = right.iter().map(|label| ids[label]).collect();
        (graph, left, right)
    }

    fn assert_disjoint(graph: &ArenaGraph<u32, ()>, matched: &[crate::arena_graph::EdgeId]) {
        let mut seen = HashSet::new();
        for edge in matched {
            for node in [edge.source(), edge.target()] {
                assert!(
                    seen.insert(node),
                    "{:?} matched twice",
                    graph.node_data(node)
                );
            }
        }
    }

    #[test]
    fn test_small_matching() {
        let (mut graph, left, right) = create_graph(&[1, 2], &[3, 4], &[(1, 3), (1, 4), (2, 3)]);
        let edges_before: Vec<_> = graph.edge_ids().collect();
        let matched = {
            let mut matching =
                MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                    .unwrap();
            matching.compute().unwrap();
            assert_eq!(matching.matching_size(), 2);
            matching.matched_edges().to_vec()
        };
        assert_disjoint(&graph, &matched);
        let labels: HashSet<_> = matched
            .iter()
            .map(|edge| (*graph.node_data(edge.source()), *graph.node_data(edge.target())))
            .collect();
        assert_eq!(labels, HashSet::from([(1, 4), (2, 3)]));

        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.edge_ids().collect::<Vec<_>>(), edges_before);
    }

    #[test]
    fn test_no_edges_no_matching() {
        let (mut graph, left, right) = create_graph(&[1, 2], &[3], &[]);
        let mut matching =
            MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                .unwrap();
        matching.compute().unwrap();
        assert_eq!(matching.matching_size(), 0);
        assert_eq!(matching.graph().num_nodes(), 3);
        assert_eq!(matching.graph().num_edges(), 0);
    }

    #[test]
    fn test_complete_bipartite_graph() {
        let mut edges = Vec::new();
        for from in 1..=3 {
            for into in 4..=7 {
                edges.push((from, into));
            }
        }
        let (mut graph, left, right) = create_graph(&[1, 2, 3], &[4, 5, 6, 7], &edges);
        let mut matching =
            MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                .unwrap();
        matching.compute().unwrap();
        assert_eq!(matching.matching_size(), 3);
        let matched = matching.matched_edges().to_vec();
        assert_disjoint(matching.graph(), &matched);
    }

    #[test]
    fn test_compute_is_repeatable() {
        let (mut graph, left, right) = create_graph(&[1, 2], &[3, 4], &[(1, 3), (2, 3), (2, 4)]);
        let mut matching =
            MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                .unwrap();
        matching.compute().unwrap();
        let first = matching.matched_edges().to_vec();
        matching.compute().unwrap();
        assert_eq!(matching.matched_edges(), first);
        assert_eq!(matching.matching_size(), 2);
    }

    #[test]
    fn test_invalid_partitions() {
        let (mut graph, left, right) = create_graph(&[1], &[2], &[(1, 2)]);
        let overlapping = MaximumBipartiteMatching::new(
            &mut graph,
            left.clone(),
            vec![right[0], left[0]],
            || 0,
            |_: &_, _: &_| (),
        );
        assert!(matches!(overlapping, Err(FlowError::InvalidArgument(_))));
        drop(overlapping);

        let mut other = ArenaGraph::<u32, ()>::new();
        let stranger = other.add_node(9);
        let missing = MaximumBipartiteMatching::new(
            &mut graph,
            left,
            vec![stranger],
            || 0,
            |_: &_, _: &_| (),
        );
        assert!(matches!(missing, Err(FlowError::NodeNotFound(_))));
    }

    #[test]
    fn test_cancelled_matching_restores_graph() {
        let (mut graph, left, right) = create_graph(&[1, 2], &[3, 4], &[(1, 3), (2, 4)]);
        let token = CancellationToken::new();
        token.cancel();
        {
            let mut matching =
                MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                    .unwrap()
                    .with_cancellation(token);
            assert_eq!(matching.compute(), Err(FlowError::Cancelled));
            assert_eq!(matching.matching_size(), 0);
        }
        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_backward_edges_are_not_matched() {
        let (mut graph, left, right) = create_graph(
            &[1, 2, 3],
            &[4, 5, 6],
            &[(4, 2), (1, 4), (2, 5), (2, 6), (3, 4), (1, 2)],
        );
        let mut matching = MaximumBipartiteMatching::new(
            &mut graph,
            left.clone(),
            right.clone(),
            || 0,
            |_: &_, _: &_| (),
        )
        .unwrap();
        matching.compute().unwrap();
        assert_eq!(matching.matching_size(), 2);
        let matched = matching.matched_edges().to_vec();
        assert_disjoint(matching.graph(), &matched);
        assert!(
            matched
                .iter()
                .all(|edge| left.contains(&edge.source()) && right.contains(&edge.target()))
        );
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let (mut graph, left, right) = create_graph(&[1], &[2], &[(1, 2)]);
        let matching =
            MaximumBipartiteMatching::new(&mut graph, left, right, || 0, |_: &_, _: &_| ())
                .unwrap();
        assert_eq!(matching.tolerance(), DEFAULT_TOLERANCE);
        let mut matching = matching.with_tolerance(0.0);
        matching.compute().unwrap();
        assert_eq!(matching.matching_size(), 1);
    }
}
