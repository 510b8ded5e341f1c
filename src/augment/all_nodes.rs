use crate::GraphMut;

use super::AugmentStrategy;

/// Connects the super source to every original node and every original node
/// to the super sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllNodes;

impl<G: GraphMut> AugmentStrategy<G> for AllNodes {
    const NAME: &'static str = "all_nodes";

    fn plan_edges(
        &self,
        graph: &G,
        super_source: &G::NodeId,
        super_sink: &G::NodeId,
    ) -> Vec<(G::NodeId, G::NodeId)> {
        let mut plan = Vec::new();
        for node in graph.node_ids() {
            if &node == super_source || &node == super_sink {
                continue;
            }
            plan.push((super_source.clone(), node.clone()));
            plan.push((node, super_sink.clone()));
        }
        plan
    }
}
