use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use std::fmt::{Debug, Display};

pub trait GraphToDot<N: Debug + Display, E: Debug + Display> {
    /// Return the graph with display labels.
    fn to_labelled_graph(&self) -> DiGraph<N, E>;

    /// DOT `style` of an edge.
    fn get_edge_style(&self, _edge: &E) -> &'static str {
        "solid"
    }

    /// DOT `fillcolor` of a node.
    fn get_node_color(&self, _node: &N) -> &'static str {
        "gray"
    }

    /// Format graph as a DOT string.
    fn to_dot(&self) -> String {
        let graph = self.to_labelled_graph();

        let edge_attrs = |_, edge: EdgeReference<'_, E>| {
            format!(
                "label=\"{}\" style={}, arrowhead=box, arrowtail=box",
                edge.weight(),
                self.get_edge_style(edge.weight())
            )
        };

        let node_attrs = |_, (_, node): (NodeIndex, &N)| {
            format!(
                "label=\"{node}\" style=filled, shape=oval, fillcolor={}, fontcolor=black",
                self.get_node_color(node)
            )
        };

        let dot = Dot::with_attr_getters(
            &graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &edge_attrs,
            &node_attrs,
        );

        format!("{dot:?}")
    }
}
