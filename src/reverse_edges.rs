//! Pairing every edge with an edge running the opposite way, as the
//! residual network of a flow computation requires.

use std::collections::{HashMap, HashSet};

use derivative::Derivative;

use crate::{
    EdgeId, GraphMut,
    cancel::CancellationToken,
    error::{FlowError, Result},
    events::{AugmentEvent, GraphEvent, notify},
};

/// Pairs every edge of a graph with a reverse edge, reusing existing
/// opposite edges where possible and synthesising the rest.
///
/// The registry is symmetric: if `e` is paired with `r` then `r` is paired
/// with `e`, and `r` runs from `e.target()` to `e.source()`.  Synthesised
/// edges are removed again by [`remove_reversed_edges`] or on drop.
///
/// [`remove_reversed_edges`]: Self::remove_reversed_edges
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct ReverseEdgeAugmentor<'g, G, EF>
where
    G: GraphMut,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    #[derivative(Debug = "ignore")]
    graph: &'g mut G,
    #[derivative(Debug = "ignore")]
    edge_factory: EF,
    reversed: HashMap<G::EdgeId, G::EdgeId>,
    synthesized: Vec<G::EdgeId>,
    synthesized_set: HashSet<G::EdgeId>,
    augmented: bool,
    cancellation: Option<CancellationToken>,
}

impl<'g, G, EF> ReverseEdgeAugmentor<'g, G, EF>
where
    G: GraphMut,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    pub fn new(graph: &'g mut G, edge_factory: EF) -> Self {
        Self {
            graph,
            edge_factory,
            reversed: HashMap::new(),
            synthesized: Vec::new(),
            synthesized_set: HashSet::new(),
            augmented: false,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    pub fn augmented(&self) -> bool {
        self.augmented
    }

    /// Gets the synthesised reverse edges in creation order.
    pub fn augmented_edges(&self) -> &[G::EdgeId] {
        &self.synthesized
    }

    pub fn reversed_edges(&self) -> &HashMap<G::EdgeId, G::EdgeId> {
        &self.reversed
    }

    pub fn reversed_edge(&self, edge: &G::EdgeId) -> Option<&G::EdgeId> {
        self.reversed.get(edge)
    }

    /// Checks whether `edge` was created by this augmentor rather than
    /// found in the graph.
    pub fn is_synthesized(&self, edge: &G::EdgeId) -> bool {
        self.synthesized_set.contains(edge)
    }

    fn has_leftovers(&self) -> bool {
        !self.synthesized.is_empty() || !self.reversed.is_empty()
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    fn pair(&mut self, edge: G::EdgeId, reversed: G::EdgeId) {
        self.reversed.insert(edge.clone(), reversed.clone());
        self.reversed.insert(reversed, edge);
    }

    /// Looks for an unpaired edge running opposite to `edge`.  Candidates
    /// are taken in the enumeration order of the out-edges of
    /// `edge.target()`.
    fn find_reversed_edge(&self, edge: &G::EdgeId) -> Option<G::EdgeId> {
        let (source, target) = edge.ends();
        self.graph
            .edges_from_into(target, source)
            .find(|candidate| candidate != edge && !self.reversed.contains_key(candidate))
    }

    pub fn add_reversed_edges(&mut self) -> Result<()> {
        self.add_reversed_edges_with(|_| ())
    }

    /// Pairs every edge with a reverse edge, reporting each synthesised edge
    /// to `observer`.
    pub fn add_reversed_edges_with(
        &mut self,
        mut observer: impl FnMut(GraphEvent<G>),
    ) -> Result<()> {
        let _span = tracing::debug_span!("add_reversed_edges").entered();
        if self.augmented {
            return Err(FlowError::InvalidState("reversed edges already added"));
        }
        if self.has_leftovers() {
            return Err(FlowError::InvalidState(
                "a failed reverse-edge augmentation must be removed first",
            ));
        }

        let edges: Vec<_> = self.graph.edge_ids().collect();
        let mut unpaired = Vec::new();
        for edge in edges {
            if self.reversed.contains_key(&edge) {
                continue;
            }
            match self.find_reversed_edge(&edge) {
                Some(reversed) => self.pair(edge, reversed),
                None => unpaired.push(edge),
            }
        }
        let found = self.reversed.len() / 2;

        for edge in unpaired {
            self.check_cancelled()?;
            let (source, target) = edge.ends();
            let data = (self.edge_factory)(&target, &source);
            let reversed = self.graph.add_edge(target, source, data);
            self.synthesized.push(reversed.clone());
            self.synthesized_set.insert(reversed.clone());
            self.pair(edge.clone(), reversed.clone());
            notify(&mut observer, AugmentEvent::ReversedEdgeAdded { edge, reversed });
        }

        self.augmented = true;
        tracing::debug!(
            found,
            synthesized = self.synthesized.len(),
            "reversed edges added"
        );
        Ok(())
    }

    /// Removes every synthesised edge and forgets all pairings.
    ///
    /// Also cleans up after a cancelled [`add_reversed_edges`].  Fails with
    /// an invalid-state error when there is nothing to remove.
    ///
    /// [`add_reversed_edges`]: Self::add_reversed_edges
    pub fn remove_reversed_edges(&mut self) -> Result<()> {
        if !self.augmented && !self.has_leftovers() {
            return Err(FlowError::InvalidState("reversed edges not added"));
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.augmented = false;
        for edge in self.synthesized.drain(..) {
            self.graph.remove_edge(edge);
        }
        self.synthesized_set.clear();
        self.reversed.clear();
        tracing::debug!("reversed edges removed");
    }
}

impl<'g, G, EF> Drop for ReverseEdgeAugmentor<'g, G, EF>
where
    G: GraphMut,
    EF: Fn(&G::NodeId, &G::NodeId) -> G::EdgeData,
{
    fn drop(&mut self) {
        if self.augmented || self.has_leftovers() {
            self.release();
        }
    }
}
