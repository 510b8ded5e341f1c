use std::collections::HashMap;

use quickcheck::{Arbitrary, Gen};

use crate::{
    ArenaGraph, EdgeId, Graph, GraphMut,
    arena_graph::{self, NodeId},
    tracing_support::{TimingScope, init_tracing, set_timing_scope},
};

pub type CapacityGraph = ArenaGraph<u32, f64>;

/// A random capacity network with distinct source and sink.  Capacities are
/// small whole numbers stored as edge data, so flow arithmetic is exact.
#[derive(Debug)]
pub struct ArbFlowNetwork {
    pub graph: CapacityGraph,
    pub source: NodeId,
    pub sink: NodeId,
}

impl ArbFlowNetwork {
    pub fn capacities(&self) -> HashMap<arena_graph::EdgeId, f64> {
        self.graph
            .edge_ids()
            .map(|edge| (edge, *self.graph.edge_data(edge)))
            .collect()
    }
}

// Cloning an `ArenaGraph` yields a distinct graph, so the terminals have to
// be carried over through the node map.
impl Clone for ArbFlowNetwork {
    fn clone(&self) -> Self {
        let mut graph = CapacityGraph::new();
        let node_map = graph.copy_from_with(&self.graph, Clone::clone, Clone::clone);
        ArbFlowNetwork {
            graph,
            source: node_map[&self.source],
            sink: node_map[&self.sink],
        }
    }
}

impl Arbitrary for ArbFlowNetwork {
    fn arbitrary(g: &mut Gen) -> Self {
        let num_nodes = 2 + usize::arbitrary(g) % 10;
        let num_edges = usize::arbitrary(g) % 30;

        let mut graph = CapacityGraph::new();
        let nodes: Vec<_> = (0..num_nodes as u32).map(|i| graph.add_node(i)).collect();
        for _ in 0..num_edges {
            let from = nodes[usize::arbitrary(g) % nodes.len()];
            let into = nodes[usize::arbitrary(g) % nodes.len()];
            let capacity = f64::from(u8::arbitrary(g) % 10);
            graph.add_edge(from, into, capacity);
        }

        let source = nodes[0];
        let sink = nodes[1 + usize::arbitrary(g) % (nodes.len() - 1)];
        ArbFlowNetwork {
            graph,
            source,
            sink,
        }
    }
}

/// Gets flow leaving `node` minus flow entering it, given per-edge flows.
pub fn net_outflow<G: Graph>(graph: &G, node: &G::NodeId, flow: impl Fn(&G::EdgeId) -> f64) -> f64 {
    let out: f64 = graph.edges_from(node.clone()).map(|edge| flow(&edge)).sum();
    let into: f64 = graph.edges_into(node.clone()).map(|edge| flow(&edge)).sum();
    out - into
}

/// Checks that the edge-level views of a graph agree with each other.
pub fn check_graph_consistency<G: Graph>(graph: &G) {
    let _scope = set_timing_scope(TimingScope::Invariants);
    init_tracing();
    let _span = tracing::info_span!("check_graph_consistency").entered();

    let mut out_total = 0;
    let mut in_total = 0;
    for node in graph.node_ids() {
        assert_eq!(graph.check_valid_node_id(&node), Ok(()));
        let num_from = graph.num_edges_from(node.clone());
        let num_into = graph.num_edges_into(node.clone());
        assert_eq!(num_from, graph.edges_from(node.clone()).count());
        assert_eq!(num_into, graph.edges_into(node.clone()).count());
        assert!(graph.edges_from(node.clone()).all(|edge| edge.source() == node));
        assert!(graph.edges_into(node.clone()).all(|edge| edge.target() == node));
        out_total += num_from;
        in_total += num_into;
    }
    assert_eq!(out_total, graph.num_edges());
    assert_eq!(in_total, graph.num_edges());
    for edge in graph.edge_ids() {
        assert_eq!(graph.check_valid_edge_id(&edge), Ok(()));
        assert!(graph.contains_node(&edge.source()));
        assert!(graph.contains_node(&edge.target()));
    }
}
