use std::collections::{HashMap, HashSet};

use derivative::Derivative;

use crate::{
    Graph, GraphMut,
    cancel::CancellationToken,
    error::{FlowError, Result},
    residual::ResidualGraph,
    reverse_edges::ReverseEdgeAugmentor,
    search::SearchState,
};

use super::MaximumFlow;

/// The Edmonds-Karp maximum-flow algorithm: repeatedly augment along a
/// shortest path of the residual network until the sink is unreachable.
///
/// The engine borrows a [`ReverseEdgeAugmentor`] for the graph and its
/// reverse-edge pairing, so the graph cannot change while the engine is
/// alive.  The capacity function is consulted for every edge of the graph,
/// including synthesised reverse edges, which normally have capacity zero.
///
/// One engine can compute flows for several source/sink pairs; each
/// [`compute`](MaximumFlow::compute) starts from fresh residuals.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct EdmondsKarp<'a, G, C>
where
    G: Graph,
    C: Fn(&G::EdgeId) -> f64,
{
    #[derivative(Debug = "ignore")]
    graph: &'a G,
    #[derivative(Debug = "ignore")]
    reversed: &'a HashMap<G::EdgeId, G::EdgeId>,
    reversed_ready: bool,
    #[derivative(Debug = "ignore")]
    capacity: C,
    capacities: HashMap<G::EdgeId, f64>,
    residuals: HashMap<G::EdgeId, f64>,
    search: SearchState<G::NodeId, G::EdgeId>,
    source: Option<G::NodeId>,
    sink: Option<G::NodeId>,
    max_flow: f64,
    cancellation: Option<CancellationToken>,
}

impl<'a, G, C> EdmondsKarp<'a, G, C>
where
    G: GraphMut,
    C: Fn(&G::EdgeId) -> f64,
{
    pub fn new<EF>(reverser: &'a ReverseEdgeAugmentor<'_, G, EF>, capacity: C) -> Self
    where
        EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
    {
        Self {
            graph: reverser.graph(),
            reversed: reverser.reversed_edges(),
            reversed_ready: reverser.augmented(),
            capacity,
            capacities: HashMap::new(),
            residuals: HashMap::new(),
            search: SearchState::new(),
            source: None,
            sink: None,
            max_flow: 0.0,
            cancellation: None,
        }
    }
}

impl<'a, G, C> EdmondsKarp<'a, G, C>
where
    G: Graph,
    C: Fn(&G::EdgeId) -> f64,
{
    /// Polls `token` before every augmenting-path search.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    /// Gets the capacity of an edge as seen by the last computation.
    pub fn capacity(&self, edge: &G::EdgeId) -> Option<f64> {
        self.capacities.get(edge).copied()
    }

    /// Gets the flow the last computation routed through `edge`: capacity
    /// minus residual, never negative.  Unknown edges carry no flow.
    pub fn flow(&self, edge: &G::EdgeId) -> f64 {
        match (self.capacities.get(edge), self.residuals.get(edge)) {
            (Some(capacity), Some(residual)) => (capacity - residual).max(0.0),
            _ => 0.0,
        }
    }

    /// Gets the nodes reachable from the source in the final residual
    /// network.  These form the source side of a minimum cut.
    pub fn min_cut_source_side(&self) -> HashSet<G::NodeId> {
        self.search.reached().cloned().collect()
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    fn validate(&self, source: &G::NodeId, sink: &G::NodeId) -> Result<()> {
        if !self.graph.contains_node(source) {
            return Err(FlowError::node_not_found(source));
        }
        if !self.graph.contains_node(sink) {
            return Err(FlowError::node_not_found(sink));
        }
        if source == sink {
            return Err(FlowError::InvalidArgument(format!(
                "source and sink are the same node {:?}",
                source
            )));
        }
        if !self.reversed_ready {
            return Err(FlowError::InvalidState("reversed edges not added"));
        }
        Ok(())
    }

    /// Reads every capacity, rejecting negative ones before any residual is
    /// stored.
    fn init_residuals(&mut self) -> Result<()> {
        let capacities: Vec<_> = self
            .graph
            .edge_ids()
            .map(|edge| {
                let capacity = (self.capacity)(&edge);
                (edge, capacity)
            })
            .collect();
        if let Some((edge, capacity)) = capacities.iter().find(|(_, capacity)| *capacity < 0.0) {
            return Err(FlowError::NegativeCapacity {
                edge: format!("{:?}", edge),
                capacity: *capacity,
            });
        }
        self.capacities = capacities.into_iter().collect();
        self.residuals = self.capacities.clone();
        Ok(())
    }

    /// Pushes the bottleneck amount along the path found by the last search.
    /// Returns the amount pushed.
    fn augment(&mut self, source: &G::NodeId, sink: &G::NodeId) -> Result<f64> {
        let path = self
            .search
            .path_to(source, sink)
            .ok_or(FlowError::InvalidState("sink not reached"))?;
        let bottleneck = path
            .iter()
            .map(|edge| self.residuals.get(edge).copied().unwrap_or(0.0))
            .fold(f64::INFINITY, f64::min);
        tracing::trace!(bottleneck, length = path.len(), "augmenting path");

        for edge in &path {
            let reversed = self
                .reversed
                .get(edge)
                .ok_or(FlowError::InvalidState("edge has no reversed edge"))?;
            if let Some(residual) = self.residuals.get_mut(edge) {
                *residual -= bottleneck;
            }
            *self.residuals.entry(reversed.clone()).or_insert(0.0) += bottleneck;
        }
        Ok(bottleneck)
    }

    fn outflow(&self, source: &G::NodeId) -> f64 {
        self.graph
            .edges_from(source.clone())
            .map(|edge| {
                let capacity = self.capacities.get(&edge).copied().unwrap_or(0.0);
                let residual = self.residuals.get(&edge).copied().unwrap_or(0.0);
                capacity - residual
            })
            .sum()
    }
}

impl<'a, G, C> MaximumFlow<G> for EdmondsKarp<'a, G, C>
where
    G: Graph,
    C: Fn(&G::EdgeId) -> f64,
{
    /// Runs the algorithm from scratch.
    ///
    /// Fails if either terminal is missing from the graph, if they are the
    /// same node, if the reverse edges have not been added, or if any
    /// capacity is negative.  A path of unbounded capacity makes the flow
    /// infinite; the computation stops there.
    fn compute(&mut self, source: G::NodeId, sink: G::NodeId) -> Result<f64> {
        let _span = tracing::debug_span!("edmonds_karp", ?source, ?sink).entered();
        self.validate(&source, &sink)?;
        self.init_residuals()?;
        self.source = Some(source.clone());
        self.sink = Some(sink.clone());
        self.max_flow = 0.0;
        self.search.reset();

        let mut paths = 0usize;
        loop {
            self.check_cancelled()?;
            self.search
                .run(&ResidualGraph::new(self.graph, &self.residuals), source.clone());
            if !self.search.is_reached(&sink) {
                break;
            }
            paths += 1;
            if self.augment(&source, &sink)?.is_infinite() {
                tracing::warn!("augmenting path of unbounded capacity");
                self.max_flow = f64::INFINITY;
                return Ok(self.max_flow);
            }
        }

        self.max_flow = self.outflow(&source);
        tracing::debug!(max_flow = self.max_flow, paths, "maximum flow computed");
        Ok(self.max_flow)
    }

    fn max_flow(&self) -> f64 {
        self.max_flow
    }

    fn residual_capacities(&self) -> &HashMap<G::EdgeId, f64> {
        &self.residuals
    }

    fn predecessors(&self) -> &HashMap<G::NodeId, G::EdgeId> {
        self.search.predecessors()
    }

    fn source(&self) -> Option<&G::NodeId> {
        self.source.as_ref()
    }

    fn sink(&self) -> Option<&G::NodeId> {
        self.sink.as_ref()
    }
}
