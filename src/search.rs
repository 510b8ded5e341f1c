use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{EdgeId, Graph, NodeId};

const DEFAULT_HASH_SET_CAPACITY: usize = 64;

/// Iterator over the nodes reachable from a set of start nodes, in
/// breadth-first order.
pub struct BfsIterator<'g, G: Graph> {
    graph: &'g G,
    visited: HashSet<G::NodeId>,
    queue: VecDeque<G::NodeId>,
}

impl<'g, G> BfsIterator<'g, G>
where
    G: Graph,
{
    pub fn new(graph: &'g G, start: Vec<G::NodeId>) -> Self {
        Self {
            graph,
            visited: HashSet::with_capacity(DEFAULT_HASH_SET_CAPACITY),
            queue: start.into(),
        }
    }
}

impl<'g, G> Iterator for BfsIterator<'g, G>
where
    G: Graph,
{
    type Item = G::NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(nid) = self.queue.pop_front() {
            if !self.visited.insert(nid.clone()) {
                continue;
            }
            for eid in self.graph.edges_from(nid.clone()) {
                let neighbor = eid.target();
                if !self.visited.contains(&neighbor) {
                    self.queue.push_back(neighbor);
                }
            }
            return Some(nid);
        }
        None
    }
}

/// Visitation mark of a node during a breadth-first search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeColor {
    /// Not yet discovered.
    White,
    /// Discovered and queued, out-edges not yet examined.
    Gray,
    /// All out-edges examined.
    Black,
}

/// The state of one breadth-first search: node colours and the tree edge
/// through which each node was discovered.
///
/// A `SearchState` is reset at the start of every [`SearchState::run`], so
/// a single value can be reused across searches without leaking marks from
/// one search into the next.
#[derive(Debug, Clone)]
pub struct SearchState<N, E> {
    colors: HashMap<N, NodeColor>,
    predecessors: HashMap<N, E>,
}

impl<N, E> SearchState<N, E>
where
    N: NodeId,
    E: EdgeId<NodeId = N>,
{
    pub fn new() -> Self {
        Self {
            colors: HashMap::with_capacity(DEFAULT_HASH_SET_CAPACITY),
            predecessors: HashMap::with_capacity(DEFAULT_HASH_SET_CAPACITY),
        }
    }

    /// Forgets every colour and predecessor.
    pub fn reset(&mut self) {
        self.colors.clear();
        self.predecessors.clear();
    }

    /// Runs a breadth-first search from `start` over `graph`.  Out-edges are
    /// examined in the order the graph enumerates them, so the resulting tree
    /// is deterministic for a deterministic graph.
    pub fn run<G>(&mut self, graph: &G, start: N)
    where
        G: Graph<NodeId = N, EdgeId = E>,
    {
        self.reset();
        let mut queue = VecDeque::new();
        self.colors.insert(start.clone(), NodeColor::Gray);
        queue.push_back(start);
        while let Some(u) = queue.pop_front() {
            for eid in graph.edges_from(u.clone()) {
                let v = eid.target();
                if self.color(&v) == NodeColor::White {
                    self.colors.insert(v.clone(), NodeColor::Gray);
                    self.predecessors.insert(v.clone(), eid);
                    queue.push_back(v);
                }
            }
            self.colors.insert(u, NodeColor::Black);
        }
    }

    /// Gets the colour of a node; nodes never seen are white.
    pub fn color(&self, node: &N) -> NodeColor {
        self.colors.get(node).copied().unwrap_or(NodeColor::White)
    }

    /// Checks whether the last search reached the node.
    pub fn is_reached(&self, node: &N) -> bool {
        self.color(node) != NodeColor::White
    }

    /// Iterates over every node the last search reached.
    pub fn reached(&self) -> impl Iterator<Item = &N> + '_ {
        self.colors
            .iter()
            .filter(|(_, color)| **color != NodeColor::White)
            .map(|(node, _)| node)
    }

    /// Gets the tree edge through which `node` was discovered.
    pub fn predecessor(&self, node: &N) -> Option<&E> {
        self.predecessors.get(node)
    }

    /// Gets the whole predecessor map of the last search.
    pub fn predecessors(&self) -> &HashMap<N, E> {
        &self.predecessors
    }

    /// Reconstructs the tree path from `source` to `target`, as edges in
    /// forward order.  Returns `None` if `target` was not reached.
    pub fn path_to(&self, source: &N, target: &N) -> Option<Vec<E>> {
        if !self.is_reached(target) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = target.clone();
        while &current != source {
            let edge = self.predecessors.get(&current)?;
            current = edge.source();
            path.push(edge.clone());
        }
        path.reverse();
        Some(path)
    }
}

impl<N, E> Default for SearchState<N, E>
where
    N: NodeId,
    E: EdgeId<NodeId = N>,
{
    fn default() -> Self {
        Self::new()
    }
}
