//! Balancing a pre-flow by routing every node's imbalance through a
//! balancing source and a balancing sink.

use std::collections::HashMap;

use derivative::Derivative;

use crate::{
    GraphMut,
    error::{FlowError, Result},
    events::{AugmentEvent, GraphEvent, notify},
};

/// Pre-flow assigned to every edge already in the graph.
pub const ORIGINAL_PRE_FLOW: f64 = 1.0;

/// Adds a balancing source and a balancing sink to a graph carrying a fixed
/// pre-flow, then links every node whose pre-flow is not conserved to one of
/// them.
///
/// Every existing edge has pre-flow [`ORIGINAL_PRE_FLOW`]; edges added by the
/// balancer have pre-flow zero.  A node whose in-flow exceeds its out-flow is
/// a surplus node and is fed from the balancing source; a node whose
/// out-flow exceeds its in-flow is a deficient node and drains into the
/// balancing sink.  The source and sink themselves are linked to the
/// balancing nodes with unbounded capacity and are never classified.
///
/// [`unbalance`](Self::unbalance), or dropping the balancer, removes every
/// addition.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct GraphBalancer<'g, G, NF, EF>
where
    G: GraphMut,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    #[derivative(Debug = "ignore")]
    graph: &'g mut G,
    #[derivative(Debug = "ignore")]
    node_factory: NF,
    #[derivative(Debug = "ignore")]
    edge_factory: EF,
    source: G::NodeId,
    sink: G::NodeId,
    capacities: HashMap<G::EdgeId, f64>,
    pre_flow: HashMap<G::EdgeId, f64>,
    balancing_source: Option<G::NodeId>,
    balancing_sink: Option<G::NodeId>,
    balancing_source_edge: Option<G::EdgeId>,
    balancing_sink_edge: Option<G::EdgeId>,
    surplus_nodes: Vec<G::NodeId>,
    surplus_edges: Vec<G::EdgeId>,
    deficient_nodes: Vec<G::NodeId>,
    deficient_edges: Vec<G::EdgeId>,
    balanced: bool,
}

impl<'g, G, NF, EF> GraphBalancer<'g, G, NF, EF>
where
    G: GraphMut,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    /// Creates a balancer in which every existing edge has unbounded
    /// capacity.
    pub fn new(
        graph: &'g mut G,
        source: G::NodeId,
        sink: G::NodeId,
        node_factory: NF,
        edge_factory: EF,
    ) -> Result<Self> {
        Self::with_capacities(graph, source, sink, node_factory, edge_factory, |_| {
            f64::INFINITY
        })
    }

    /// Creates a balancer taking the capacity of every existing edge from
    /// `capacity`.  Fails if `source` or `sink` is not in the graph.
    pub fn with_capacities(
        graph: &'g mut G,
        source: G::NodeId,
        sink: G::NodeId,
        node_factory: NF,
        edge_factory: EF,
        capacity: impl Fn(&G::EdgeId) -> f64,
    ) -> Result<Self> {
        if !graph.contains_node(&source) {
            return Err(FlowError::node_not_found(&source));
        }
        if !graph.contains_node(&sink) {
            return Err(FlowError::node_not_found(&sink));
        }
        let mut capacities = HashMap::new();
        let mut pre_flow = HashMap::new();
        for edge in graph.edge_ids() {
            capacities.insert(edge.clone(), capacity(&edge));
            pre_flow.insert(edge, ORIGINAL_PRE_FLOW);
        }
        Ok(Self {
            graph,
            node_factory,
            edge_factory,
            source,
            sink,
            capacities,
            pre_flow,
            balancing_source: None,
            balancing_sink: None,
            balancing_source_edge: None,
            balancing_sink_edge: None,
            surplus_nodes: Vec::new(),
            surplus_edges: Vec::new(),
            deficient_nodes: Vec::new(),
            deficient_edges: Vec::new(),
            balanced: false,
        })
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    pub fn source(&self) -> &G::NodeId {
        &self.source
    }

    pub fn sink(&self) -> &G::NodeId {
        &self.sink
    }

    pub fn balanced(&self) -> bool {
        self.balanced
    }

    pub fn balancing_source(&self) -> Option<&G::NodeId> {
        self.balancing_source.as_ref()
    }

    pub fn balancing_sink(&self) -> Option<&G::NodeId> {
        self.balancing_sink.as_ref()
    }

    /// Gets the edge from the balancing source to the source.
    pub fn balancing_source_edge(&self) -> Option<&G::EdgeId> {
        self.balancing_source_edge.as_ref()
    }

    /// Gets the edge from the sink to the balancing sink.
    pub fn balancing_sink_edge(&self) -> Option<&G::EdgeId> {
        self.balancing_sink_edge.as_ref()
    }

    pub fn surplus_nodes(&self) -> &[G::NodeId] {
        &self.surplus_nodes
    }

    pub fn surplus_edges(&self) -> &[G::EdgeId] {
        &self.surplus_edges
    }

    pub fn deficient_nodes(&self) -> &[G::NodeId] {
        &self.deficient_nodes
    }

    pub fn deficient_edges(&self) -> &[G::EdgeId] {
        &self.deficient_edges
    }

    pub fn capacities(&self) -> &HashMap<G::EdgeId, f64> {
        &self.capacities
    }

    pub fn capacity(&self, edge: &G::EdgeId) -> Option<f64> {
        self.capacities.get(edge).copied()
    }

    pub fn pre_flow(&self, edge: &G::EdgeId) -> Option<f64> {
        self.pre_flow.get(edge).copied()
    }

    /// Gets the pre-flow leaving `node` minus the pre-flow entering it.
    pub fn balancing_index(&self, node: &G::NodeId) -> f64 {
        let pre_flow = |edge: G::EdgeId| self.pre_flow.get(&edge).copied().unwrap_or(0.0);
        let out_flow: f64 = self.graph.edges_from(node.clone()).map(pre_flow).sum();
        let in_flow: f64 = self.graph.edges_into(node.clone()).map(pre_flow).sum();
        out_flow - in_flow
    }

    fn is_balancing_node(&self, node: &G::NodeId) -> bool {
        self.balancing_source.as_ref() == Some(node) || self.balancing_sink.as_ref() == Some(node)
    }

    fn add_balancing_edge(
        &mut self,
        from: G::NodeId,
        into: G::NodeId,
        capacity: f64,
        observer: &mut impl FnMut(GraphEvent<G>),
    ) -> G::EdgeId {
        let data = (self.edge_factory)(&from, &into);
        let edge = self.graph.add_edge(from, into, data);
        self.capacities.insert(edge.clone(), capacity);
        self.pre_flow.insert(edge.clone(), 0.0);
        notify(observer, AugmentEvent::EdgeAdded(edge.clone()));
        edge
    }

    pub fn balance(&mut self) -> Result<()> {
        self.balance_with(|_| ())
    }

    /// Adds the balancing nodes and edges, reporting every addition to
    /// `observer`.
    pub fn balance_with(&mut self, mut observer: impl FnMut(GraphEvent<G>)) -> Result<()> {
        let _span = tracing::debug_span!("balance").entered();
        if self.balanced {
            return Err(FlowError::InvalidState("graph is already balanced"));
        }

        let balancing_source = self.graph.add_node((self.node_factory)());
        self.balancing_source = Some(balancing_source.clone());
        notify(
            &mut observer,
            AugmentEvent::BalancingSourceAdded(balancing_source.clone()),
        );
        let balancing_sink = self.graph.add_node((self.node_factory)());
        self.balancing_sink = Some(balancing_sink.clone());
        notify(
            &mut observer,
            AugmentEvent::BalancingSinkAdded(balancing_sink.clone()),
        );

        let edge = self.add_balancing_edge(
            balancing_source.clone(),
            self.source.clone(),
            f64::INFINITY,
            &mut observer,
        );
        self.balancing_source_edge = Some(edge);
        let edge = self.add_balancing_edge(
            self.sink.clone(),
            balancing_sink.clone(),
            f64::INFINITY,
            &mut observer,
        );
        self.balancing_sink_edge = Some(edge);

        let nodes: Vec<_> = self
            .graph
            .node_ids()
            .filter(|node| {
                node != &self.source && node != &self.sink && !self.is_balancing_node(node)
            })
            .collect();
        for node in nodes {
            let index = self.balancing_index(&node);
            if index < 0.0 {
                self.surplus_nodes.push(node.clone());
                notify(&mut observer, AugmentEvent::SurplusNodeAdded(node.clone()));
                let edge =
                    self.add_balancing_edge(balancing_source.clone(), node, -index, &mut observer);
                self.surplus_edges.push(edge);
            } else if index > 0.0 {
                self.deficient_nodes.push(node.clone());
                notify(&mut observer, AugmentEvent::DeficientNodeAdded(node.clone()));
                let edge =
                    self.add_balancing_edge(node, balancing_sink.clone(), index, &mut observer);
                self.deficient_edges.push(edge);
            }
        }

        self.balanced = true;
        tracing::debug!(
            surplus = self.surplus_nodes.len(),
            deficient = self.deficient_nodes.len(),
            "graph balanced"
        );
        Ok(())
    }

    /// Removes every node and edge added by [`balance`](Self::balance).
    pub fn unbalance(&mut self) -> Result<()> {
        if !self.balanced {
            return Err(FlowError::InvalidState("graph is not balanced"));
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.balanced = false;
        let added = self
            .surplus_edges
            .drain(..)
            .chain(self.deficient_edges.drain(..))
            .chain(self.balancing_source_edge.take())
            .chain(self.balancing_sink_edge.take());
        for edge in added {
            self.capacities.remove(&edge);
            self.pre_flow.remove(&edge);
            self.graph.remove_edge(edge);
        }
        self.surplus_nodes.clear();
        self.deficient_nodes.clear();
        if let Some(node) = self.balancing_source.take() {
            self.graph.remove_node(node);
        }
        if let Some(node) = self.balancing_sink.take() {
            self.graph.remove_node(node);
        }
        tracing::debug!("graph unbalanced");
    }
}

impl<'g, G, NF, EF> Drop for GraphBalancer<'g, G, NF, EF>
where
    G: GraphMut,
    NF: FnMut() -> G::NodeData,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    fn drop(&mut self) {
        if self.balanced {
            self.release();
        }
    }
}
