use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

use crate::{EdgeId, Graph};

/// Writes a string verbatim, without the quotes `Debug for str` would add.
struct Tag<'a>(&'a str);

impl Debug for Tag<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

struct NodesDebug<'a, G: Graph> {
    graph: &'a G,
    node_tags: &'a [(G::NodeId, String)],
}

impl<G> Debug for NodesDebug<'_, G>
where
    G: Graph,
    G::NodeData: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.node_tags
                    .iter()
                    .map(|(nid, tag)| (Tag(tag), self.graph.node_data(nid.clone()))),
            )
            .finish()
    }
}

struct EdgesDebug<'a, G: Graph> {
    graph: &'a G,
    node_tags: &'a HashMap<G::NodeId, String>,
}

impl<G> Debug for EdgesDebug<'_, G>
where
    G: Graph,
    G::EdgeData: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for eid in self.graph.edge_ids() {
            let (from, into) = eid.ends();
            let tag = format!("{} -> {}", self.node_tags[&from], self.node_tags[&into]);
            map.entry(&Tag(&tag), self.graph.edge_data(eid));
        }
        map.finish()
    }
}

/// Formats a graph for debug output with automatic node numbering.
///
/// Nodes are labeled with sequential numbers (0, 1, 2, ...) in enumeration
/// order, and edges are shown as `from -> into` in enumeration order, each
/// followed by its data.
pub fn format_debug<G>(graph: &G, fmt: &mut Formatter<'_>, name: &str) -> std::fmt::Result
where
    G: Graph,
    G::NodeData: Debug,
    G::EdgeData: Debug,
{
    let ordered: Vec<(G::NodeId, String)> = graph
        .node_ids()
        .enumerate()
        .map(|(i, nid)| (nid, i.to_string()))
        .collect();
    let node_tags: HashMap<G::NodeId, String> = ordered.iter().cloned().collect();

    fmt.debug_struct(name)
        .field(
            "nodes",
            &NodesDebug {
                graph,
                node_tags: &ordered,
            },
        )
        .field(
            "edges",
            &EdgesDebug {
                graph,
                node_tags: &node_tags,
            },
        )
        .finish()
}

#[cfg(test)]
mod tests {
    use crate::{ArenaGraph, GraphMut};

    #[test]
    fn test_format_debug() {
        let mut graph = ArenaGraph::<&str, i32>::new();
        let n1 = graph.add_node("A");
        let n2 = graph.add_node("B");
        graph.add_edge(n1, n2, 10);

        // Single-line output.
        let output = format!("{:?}", &graph);
        let expected = r#"ArenaGraph { nodes: {0: "A", 1: "B"}, edges: {0 -> 1: 10} }"#;
        assert_eq!(output, expected);

        // Multi-line output.
        let output = format!("{:#?}", &graph);
        let expected = r#"ArenaGraph {
    nodes: {
        0: "A",
        1: "B",
    },
    edges: {
        0 -> 1: 10,
    },
}"#;
        assert_eq!(output, expected);
    }

    #[test]
    fn test_format_debug_renumbers_after_removal() {
        let mut graph = ArenaGraph::<&str, ()>::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let c = graph.add_node("C");
        graph.add_edge(b, c, ());
        graph.remove_node(a);
        let output = format!("{:?}", &graph);
        assert_eq!(
            output,
            r#"ArenaGraph { nodes: {0: "B", 1: "C"}, edges: {0 -> 1: ()} }"#
        );
    }
}
