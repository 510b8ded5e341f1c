use std::collections::HashSet;

use crate::{
    GraphMut,
    error::{FlowError, Result},
};

use super::AugmentStrategy;

/// Connects the super source to every node of the left partition and every
/// node of the right partition to the super sink.
///
/// Partitions are deduplicated, keeping first occurrences in order.  An
/// augmentor built with this strategy rejects partitions that name nodes
/// missing from the graph or that share a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BipartiteToFlow<N> {
    left: Vec<N>,
    right: Vec<N>,
}

fn dedup<N: crate::NodeId>(nodes: impl IntoIterator<Item = N>) -> Vec<N> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.clone()))
        .collect()
}

impl<N: crate::NodeId> BipartiteToFlow<N> {
    pub fn new(left: impl IntoIterator<Item = N>, right: impl IntoIterator<Item = N>) -> Self {
        Self {
            left: dedup(left),
            right: dedup(right),
        }
    }

    pub fn left(&self) -> &[N] {
        &self.left
    }

    pub fn right(&self) -> &[N] {
        &self.right
    }

    /// Checks whether `node` belongs to either partition.
    pub fn contains(&self, node: &N) -> bool {
        self.left.contains(node) || self.right.contains(node)
    }
}

impl<G: GraphMut> AugmentStrategy<G> for BipartiteToFlow<G::NodeId> {
    const NAME: &'static str = "bipartite_to_flow";

    fn validate(&self, graph: &G) -> Result<()> {
        if let Some(missing) = self
            .left
            .iter()
            .chain(&self.right)
            .find(|node| !graph.contains_node(node))
        {
            return Err(FlowError::node_not_found(missing));
        }
        let left: HashSet<_> = self.left.iter().collect();
        if let Some(shared) = self.right.iter().find(|node| left.contains(node)) {
            return Err(FlowError::InvalidArgument(format!(
                "node {:?} is in both partitions",
                shared
            )));
        }
        Ok(())
    }

    fn plan_edges(
        &self,
        _graph: &G,
        super_source: &G::NodeId,
        super_sink: &G::NodeId,
    ) -> Vec<(G::NodeId, G::NodeId)> {
        let mut plan: Vec<_> = self
            .left
            .iter()
            .map(|node| (super_source.clone(), node.clone()))
            .collect();
        plan.extend(
            self.right
                .iter()
                .map(|node| (node.clone(), super_sink.clone())),
        );
        plan
    }
}
