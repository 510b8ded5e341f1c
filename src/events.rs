use std::fmt::Debug;

use crate::Graph;

/// A notification fired while an algorithm mutates a graph.
///
/// Every mutating operation has a `*_with` variant taking an observer
/// closure that receives these events synchronously, in the order the
/// mutations happen.  Events are for instrumentation only; observers cannot
/// influence the computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AugmentEvent<N, E> {
    /// A graph augmentor added its super source.
    SuperSourceAdded(N),
    /// A graph augmentor added its super sink.
    SuperSinkAdded(N),
    /// An augmentor or balancer added an edge.
    EdgeAdded(E),
    /// The reverse-edge augmentor synthesised `reversed` as the partner of
    /// `edge`.
    ReversedEdgeAdded { edge: E, reversed: E },
    /// The balancer added its balancing source.
    BalancingSourceAdded(N),
    /// The balancer added its balancing sink.
    BalancingSinkAdded(N),
    /// The balancer found a node with surplus pre-flow.
    SurplusNodeAdded(N),
    /// The balancer found a node with deficient pre-flow.
    DeficientNodeAdded(N),
}

/// The event type for a particular graph type.
pub type GraphEvent<G> = AugmentEvent<<G as Graph>::NodeId, <G as Graph>::EdgeId>;

/// Delivers an event to an observer, mirroring it as a trace event.
pub(crate) fn notify<N, E, F>(observer: &mut F, event: AugmentEvent<N, E>)
where
    N: Debug,
    E: Debug,
    F: FnMut(AugmentEvent<N, E>),
{
    tracing::trace!(?event, "graph mutated");
    observer(event);
}
