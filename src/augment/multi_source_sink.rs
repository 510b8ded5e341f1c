use crate::GraphMut;

use super::AugmentStrategy;

/// Connects the super source to every node without incoming edges and every
/// node without outgoing edges to the super sink.
///
/// Both conditions are sampled on the original graph before any edge is
/// added, so an isolated node is wired to both super nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MultiSourceSink;

impl<G: GraphMut> AugmentStrategy<G> for MultiSourceSink {
    const NAME: &'static str = "multi_source_sink";

    fn plan_edges(
        &self,
        graph: &G,
        super_source: &G::NodeId,
        super_sink: &G::NodeId,
    ) -> Vec<(G::NodeId, G::NodeId)> {
        let originals: Vec<_> = graph
            .node_ids()
            .filter(|node| node != super_source && node != super_sink)
            .collect();
        let sources: Vec<_> = originals
            .iter()
            .filter(|node| !graph.has_edge_into((*node).clone()))
            .cloned()
            .collect();
        let sinks: Vec<_> = originals
            .iter()
            .filter(|node| !graph.has_edge_from((*node).clone()))
            .cloned()
            .collect();

        let mut plan: Vec<_> = sources
            .into_iter()
            .map(|node| (super_source.clone(), node))
            .collect();
        plan.extend(sinks.into_iter().map(|node| (node, super_sink.clone())));
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ArenaGraph, EdgeId, Graph, GraphAugmentor, augment::MultiSourceSinkAugmentor,
    };

    #[test]
    fn test_wires_sources_and_sinks() {
        let mut graph = ArenaGraph::<&str, ()>::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        graph.add_edge(a, c, ());
        graph.add_edge(b, c, ());
        graph.add_edge(c, d, ());

        let mut augmentor: MultiSourceSinkAugmentor<'_, _, _, _> =
            GraphAugmentor::new(&mut graph, MultiSourceSink, || "super", |_: &_, _: &_| ())
                .unwrap();
        augmentor.compute().unwrap();
        let source = *augmentor.super_source().unwrap();
        let sink = *augmentor.super_sink().unwrap();
        let ends: Vec<_> = augmentor.augmented_edges().iter().map(|e| e.ends()).collect();
        assert_eq!(ends, vec![(source, a), (source, b), (d, sink)]);
    }

    #[test]
    fn test_isolated_node_is_both_source_and_sink() {
        let mut graph = ArenaGraph::<&str, ()>::new();
        let lonely = graph.add_node("lonely");
        let mut augmentor =
            GraphAugmentor::new(&mut graph, MultiSourceSink, || "super", |_: &_, _: &_| ())
                .unwrap();
        augmentor.compute().unwrap();
        let source = *augmentor.super_source().unwrap();
        let sink = *augmentor.super_sink().unwrap();
        assert!(augmentor.graph().has_edge_from_into(source, lonely));
        assert!(augmentor.graph().has_edge_from_into(lonely, sink));
        assert_eq!(augmentor.augmented_edges().len(), 2);
    }

    #[test]
    fn test_cycle_has_no_sources_or_sinks() {
        let mut graph = ArenaGraph::<&str, ()>::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b, ());
        graph.add_edge(b, a, ());
        let mut augmentor =
            GraphAugmentor::new(&mut graph, MultiSourceSink, || "super", |_: &_, _: &_| ())
                .unwrap();
        augmentor.compute().unwrap();
        assert!(augmentor.augmented_edges().is_empty());
        assert_eq!(augmentor.graph().num_nodes(), 4);
    }
}
