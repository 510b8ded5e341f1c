use std::collections::HashSet;

use crate::{
    AllNodes, EdgeId, Graph, GraphAugmentor, MultiSourceSink,
    graph_test_support::{ArbFlowNetwork, check_graph_consistency, net_outflow},
    maximum_flow::{EdmondsKarp, MaximumFlow},
    reverse_edges::ReverseEdgeAugmentor,
    tracing_support::init_tracing,
};

fn prop_flow_is_conserved(mut network: ArbFlowNetwork) -> bool {
    init_tracing();
    let capacities = network.capacities();
    let (source, sink) = (network.source, network.sink);
    let mut reverser = ReverseEdgeAugmentor::new(&mut network.graph, |_: &_, _: &_| 0.0);
    reverser.add_reversed_edges().unwrap();
    let capacity = |edge: &_| {
        if reverser.is_synthesized(edge) {
            0.0
        } else {
            capacities[edge]
        }
    };
    let mut engine = EdmondsKarp::new(&reverser, capacity);
    let max_flow = engine.compute(source, sink).unwrap();
    let graph = reverser.graph();

    graph.node_ids().all(|node| {
        let net = net_outflow(graph, &node, |edge| engine.flow(edge));
        if node == source {
            net == max_flow
        } else if node == sink {
            net == -max_flow
        } else {
            net == 0.0
        }
    })
}

fn prop_residuals_are_non_negative(mut network: ArbFlowNetwork) -> bool {
    let capacities = network.capacities();
    let (source, sink) = (network.source, network.sink);
    let mut reverser = ReverseEdgeAugmentor::new(&mut network.graph, |_: &_, _: &_| 0.0);
    reverser.add_reversed_edges().unwrap();
    let mut engine = EdmondsKarp::new(&reverser, |edge: &_| {
        capacities.get(edge).copied().unwrap_or(0.0)
    });
    engine.compute(source, sink).unwrap();
    engine.residual_capacities().len() == reverser.graph().num_edges()
        && engine.residual_capacities().values().all(|residual| *residual >= 0.0)
}

fn prop_max_flow_equals_min_cut(mut network: ArbFlowNetwork) -> bool {
    let capacities = network.capacities();
    let (source, sink) = (network.source, network.sink);
    let mut reverser = ReverseEdgeAugmentor::new(&mut network.graph, |_: &_, _: &_| 0.0);
    reverser.add_reversed_edges().unwrap();
    let mut engine = EdmondsKarp::new(&reverser, |edge: &_| {
        capacities.get(edge).copied().unwrap_or(0.0)
    });
    let max_flow = engine.compute(source, sink).unwrap();
    let cut = engine.min_cut_source_side();
    let cut_capacity: f64 = capacities
        .iter()
        .filter(|(edge, _)| cut.contains(&edge.source()) && !cut.contains(&edge.target()))
        .map(|(_, capacity)| capacity)
        .sum();
    cut.contains(&source) && !cut.contains(&sink) && cut_capacity == max_flow
}

fn prop_reversed_edges_round_trip(mut network: ArbFlowNetwork) -> bool {
    let nodes_before: Vec<_> = network.graph.node_ids().collect();
    let edges_before: Vec<_> = network.graph.edge_ids().collect();
    {
        let mut reverser = ReverseEdgeAugmentor::new(&mut network.graph, |_: &_, _: &_| 0.0);
        reverser.add_reversed_edges().unwrap();
        check_graph_consistency(reverser.graph());
        let symmetric = reverser
            .reversed_edges()
            .iter()
            .all(|(edge, reversed)| reverser.reversed_edge(reversed) == Some(edge));
        if !symmetric {
            return false;
        }
        reverser.remove_reversed_edges().unwrap();
    }
    check_graph_consistency(&network.graph);
    network.graph.node_ids().collect::<Vec<_>>() == nodes_before
        && network.graph.edge_ids().collect::<Vec<_>>() == edges_before
}

fn prop_augmentation_round_trip(mut network: ArbFlowNetwork) -> bool {
    let nodes_before: Vec<_> = network.graph.node_ids().collect();
    let edges_before: HashSet<_> = network.graph.edge_ids().collect();
    let mut super_nodes = Vec::new();
    {
        let mut augmentor =
            GraphAugmentor::new(&mut network.graph, AllNodes, || u32::MAX, |_: &_, _: &_| 0.0)
                .unwrap();
        augmentor.compute().unwrap();
        check_graph_consistency(augmentor.graph());
        super_nodes.extend(augmentor.super_source().copied());
        super_nodes.extend(augmentor.super_sink().copied());
        augmentor.rollback().unwrap();
    }
    {
        let mut augmentor = GraphAugmentor::new(
            &mut network.graph,
            MultiSourceSink,
            || u32::MAX,
            |_: &_, _: &_| 0.0,
        )
        .unwrap();
        augmentor.compute().unwrap();
        super_nodes.extend(augmentor.super_source().copied());
        super_nodes.extend(augmentor.super_sink().copied());
    }
    let graph = &network.graph;
    graph.node_ids().collect::<Vec<_>>() == nodes_before
        && graph.edge_ids().collect::<HashSet<_>>() == edges_before
        && super_nodes.len() == 4
        && super_nodes.iter().all(|node| !graph.contains_node(node))
}

macro_rules! quickcheck_test {
    ($test_name:ident) => {
        #[test]
        fn $test_name() {
            let f: fn(ArbFlowNetwork) -> bool = super::$test_name;
            quickcheck::quickcheck(f);
        }
    };
}

mod properties {
    use super::ArbFlowNetwork;

    quickcheck_test!(prop_flow_is_conserved);
    quickcheck_test!(prop_residuals_are_non_negative);
    quickcheck_test!(prop_max_flow_equals_min_cut);
    quickcheck_test!(prop_reversed_edges_round_trip);
    quickcheck_test!(prop_augmentation_round_trip);
}
