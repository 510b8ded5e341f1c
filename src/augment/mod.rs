//! Graph augmentors: temporarily add a super source and a super sink to a
//! graph and wire them to existing nodes, reducing multi-terminal problems
//! to a single-source, single-sink flow problem.
//!
//! A [`GraphAugmentor`] mutably borrows its graph for as long as it lives
//! and owns every node and edge it adds.  Dropping it removes them again, so
//! the graph is restored on every exit path, including early returns through
//! `?` and panics that unwind.

use derivative::Derivative;

use crate::{
    GraphMut,
    cancel::CancellationToken,
    error::{FlowError, Result},
    events::{AugmentEvent, GraphEvent, notify},
};

mod all_nodes;
mod bipartite;
mod multi_source_sink;

pub use all_nodes::AllNodes;
pub use bipartite::BipartiteToFlow;
pub use multi_source_sink::MultiSourceSink;

/// Decides which edges an augmentor wires to its super source and super
/// sink.
pub trait AugmentStrategy<G: GraphMut> {
    /// Short name used in log output.
    const NAME: &'static str;

    /// Checks the strategy against the graph before anything is added.
    fn validate(&self, graph: &G) -> Result<()> {
        let _ = graph;
        Ok(())
    }

    /// Lists the `(from, into)` pairs to connect, in wiring order.  Called
    /// after both super nodes are in the graph; the strategy must not list
    /// edges between the super nodes themselves.
    fn plan_edges(
        &self,
        graph: &G,
        super_source: &G::NodeId,
        super_sink: &G::NodeId,
    ) -> Vec<(G::NodeId, G::NodeId)>;
}

/// Adds a super source and a super sink to a graph and wires them according
/// to an [`AugmentStrategy`].
///
/// Protocol: [`compute`](Self::compute) once, then
/// [`rollback`](Self::rollback) (or drop the augmentor) before computing
/// again.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct GraphAugmentor<'g, G, S, NF, EF>
where
    G: GraphMut,
    S: AugmentStrategy<G>,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    #[derivative(Debug = "ignore")]
    graph: &'g mut G,
    #[derivative(Debug = "ignore")]
    strategy: S,
    #[derivative(Debug = "ignore")]
    node_factory: NF,
    #[derivative(Debug = "ignore")]
    edge_factory: EF,
    super_source: Option<G::NodeId>,
    super_sink: Option<G::NodeId>,
    augmented_edges: Vec<G::EdgeId>,
    augmented: bool,
    cancellation: Option<CancellationToken>,
}

/// Augmentor connecting every node to both super nodes.
pub type AllNodesAugmentor<'g, G, NF, EF> = GraphAugmentor<'g, G, AllNodes, NF, EF>;

/// Augmentor connecting the left partition to the super source and the right
/// partition to the super sink.
pub type BipartiteAugmentor<'g, G, NF, EF> =
    GraphAugmentor<'g, G, BipartiteToFlow<<G as crate::Graph>::NodeId>, NF, EF>;

/// Augmentor connecting in-degree-zero nodes to the super source and
/// out-degree-zero nodes to the super sink.
pub type MultiSourceSinkAugmentor<'g, G, NF, EF> = GraphAugmentor<'g, G, MultiSourceSink, NF, EF>;

impl<'g, G, S, NF, EF> GraphAugmentor<'g, G, S, NF, EF>
where
    G: GraphMut,
    S: AugmentStrategy<G>,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    /// Creates an augmentor over `graph`.  The node factory supplies the data
    /// of the super nodes; the edge factory supplies the data of every added
    /// edge.  Fails if the strategy rejects the graph.
    pub fn new(graph: &'g mut G, strategy: S, node_factory: NF, edge_factory: EF) -> Result<Self> {
        strategy.validate(graph)?;
        Ok(Self {
            graph,
            strategy,
            node_factory,
            edge_factory,
            super_source: None,
            super_sink: None,
            augmented_edges: Vec::new(),
            augmented: false,
            cancellation: None,
        })
    }

    /// Polls `token` between augmentation steps.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    /// Gets mutable access to the augmented graph, typically to layer a
    /// [`ReverseEdgeAugmentor`](crate::ReverseEdgeAugmentor) on top.
    pub fn graph_mut(&mut self) -> &mut G {
        self.graph
    }

    pub fn super_source(&self) -> Option<&G::NodeId> {
        self.super_source.as_ref()
    }

    pub fn super_sink(&self) -> Option<&G::NodeId> {
        self.super_sink.as_ref()
    }

    /// Checks whether the last [`compute`](Self::compute) completed and has
    /// not been rolled back.
    pub fn augmented(&self) -> bool {
        self.augmented
    }

    /// Gets the edges added by the strategy, in the order they were added.
    pub fn augmented_edges(&self) -> &[G::EdgeId] {
        &self.augmented_edges
    }

    /// Checks whether `node` is the super source or the super sink.
    pub fn is_super_node(&self, node: &G::NodeId) -> bool {
        self.super_source.as_ref() == Some(node) || self.super_sink.as_ref() == Some(node)
    }

    fn has_leftovers(&self) -> bool {
        self.super_source.is_some() || self.super_sink.is_some()
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Adds the super nodes and the strategy's edges.
    pub fn compute(&mut self) -> Result<()> {
        self.compute_with(|_| ())
    }

    /// Like [`compute`](Self::compute), reporting every addition to
    /// `observer`.
    ///
    /// On error (including cancellation) whatever was already added stays in
    /// the graph until [`rollback`](Self::rollback) or drop.
    pub fn compute_with(&mut self, mut observer: impl FnMut(GraphEvent<G>)) -> Result<()> {
        let _span = tracing::debug_span!("augment", strategy = S::NAME).entered();
        if self.augmented {
            return Err(FlowError::InvalidState("graph is already augmented"));
        }
        if self.has_leftovers() {
            return Err(FlowError::InvalidState(
                "a failed augmentation must be rolled back first",
            ));
        }
        // The graph may have changed through `graph_mut` since `new`.
        self.strategy.validate(self.graph)?;

        self.check_cancelled()?;
        let super_source = self.graph.add_node((self.node_factory)());
        self.super_source = Some(super_source.clone());
        notify(&mut observer, AugmentEvent::SuperSourceAdded(super_source.clone()));

        self.check_cancelled()?;
        let super_sink = self.graph.add_node((self.node_factory)());
        self.super_sink = Some(super_sink.clone());
        notify(&mut observer, AugmentEvent::SuperSinkAdded(super_sink.clone()));

        let plan = self.strategy.plan_edges(self.graph, &super_source, &super_sink);
        for (from, into) in plan {
            self.check_cancelled()?;
            self.add_augmented_edge(from, into, &mut observer);
        }

        self.augmented = true;
        tracing::debug!(
            edges = self.augmented_edges.len(),
            "graph augmented with super source and sink"
        );
        Ok(())
    }

    fn add_augmented_edge(
        &mut self,
        from: G::NodeId,
        into: G::NodeId,
        observer: &mut impl FnMut(GraphEvent<G>),
    ) {
        let data = (self.edge_factory)(&from, &into);
        let edge = self.graph.add_edge(from, into, data);
        self.augmented_edges.push(edge.clone());
        notify(observer, AugmentEvent::EdgeAdded(edge));
    }

    /// Removes the super nodes, and with them every augmented edge.
    ///
    /// Also undoes a partially completed augmentation left behind by a
    /// failed or cancelled [`compute`](Self::compute).  Fails with an
    /// invalid-state error when there is nothing to undo.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.augmented && !self.has_leftovers() {
            return Err(FlowError::InvalidState("graph is not augmented"));
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.augmented = false;
        // Removing the super nodes cascades to their incident edges, which
        // are exactly the augmented edges.
        if let Some(super_source) = self.super_source.take() {
            self.graph.remove_node(super_source);
        }
        if let Some(super_sink) = self.super_sink.take() {
            self.graph.remove_node(super_sink);
        }
        self.augmented_edges.clear();
        tracing::debug!("graph augmentation rolled back");
    }
}

impl<'g, G, S, NF, EF> Drop for GraphAugmentor<'g, G, S, NF, EF>
where
    G: GraphMut,
    S: AugmentStrategy<G>,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    fn drop(&mut self) {
        if self.augmented || self.has_leftovers() {
            self.release();
        }
    }
}
