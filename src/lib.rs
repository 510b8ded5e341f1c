//! Maximum flow, bipartite matching and pre-flow balancing over directed
//! graphs.
//!
//! The algorithms temporarily mutate the graph they work on: augmentors add
//! super nodes, the reverse-edge augmentor pairs every edge with an opposite
//! one, and the balancer adds balancing nodes.  Each of these holds a
//! mutable borrow of the graph and removes its additions when dropped, so a
//! pipeline such as
//!
//! ```
//! use graphflow::prelude::*;
//!
//! let mut graph = ArenaGraph::<&str, f64>::new();
//! let a = graph.add_node("A");
//! let b = graph.add_node("B");
//! let c = graph.add_node("C");
//! graph.add_edge(a, b, 3.0);
//! graph.add_edge(b, c, 2.0);
//! graph.add_edge(a, c, 2.0);
//!
//! let mut reverser = ReverseEdgeAugmentor::new(&mut graph, |_: &_, _: &_| 0.0);
//! reverser.add_reversed_edges()?;
//! let mut flow = EdmondsKarp::new(&reverser, |edge: &_| *reverser.graph().edge_data(*edge));
//! assert_eq!(flow.compute(a, c)?, 4.0);
//! # Ok::<(), graphflow::FlowError>(())
//! ```
//!
//! unwinds in reverse order of construction, whether it finishes or bails
//! out early.

pub mod arena_graph;
pub mod augment;
pub mod balancer;
pub mod cancel;
pub mod error;
pub mod events;
pub mod graph;
pub mod matching;
pub mod maximum_flow;
pub mod prelude;
pub mod residual;
pub mod reverse_edges;
pub mod search;
pub mod tracing_support;

mod format_debug;
mod graph_id;
mod id_vec;

#[cfg(test)]
mod flow_tests;
#[cfg(test)]
mod graph_test_support;

pub use arena_graph::ArenaGraph;
pub use augment::{AllNodes, AugmentStrategy, BipartiteToFlow, GraphAugmentor, MultiSourceSink};
pub use balancer::GraphBalancer;
pub use cancel::CancellationToken;
pub use error::{FlowError, Result};
pub use events::{AugmentEvent, GraphEvent};
pub use graph::{EdgeId, Graph, GraphMut, NodeId};
pub use matching::MaximumBipartiteMatching;
pub use maximum_flow::{EdmondsKarp, MaximumFlow, maximum_flow};
pub use residual::ResidualGraph;
pub use reverse_edges::ReverseEdgeAugmentor;
