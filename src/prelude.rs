pub use crate::{
    AllNodes, ArenaGraph, AugmentEvent, AugmentStrategy, BipartiteToFlow, CancellationToken,
    EdgeId, EdmondsKarp, FlowError, Graph, GraphAugmentor, GraphBalancer, GraphMut,
    MaximumBipartiteMatching, MaximumFlow, MultiSourceSink, NodeId, ReverseEdgeAugmentor,
};
