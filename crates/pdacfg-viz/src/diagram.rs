//! State diagrams as petgraph graphs rendered to DOT.

use std::collections::HashMap;
use std::fmt::Write as _;

use pdacfg_core::{NormalizedAutomaton, PushdownAutomaton, State};
use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::{EdgeReference, NodeIndex, StableDiGraph};

type Graph = StableDiGraph<DiagramNode, String>;

/// A state as drawn in the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub state: State,
    pub initial: bool,
    pub accepting: bool,
    /// Introduced by normalization.
    pub fresh: bool,
}

/// Directed multigraph of states and labelled moves.
#[derive(Debug, Clone)]
pub struct AutomatonDiagram {
    graph: Graph,
    index: HashMap<State, NodeIndex>,
}

impl AutomatonDiagram {
    /// Diagram of the automaton as defined.
    pub fn from_automaton(automaton: &PushdownAutomaton) -> Self {
        let mut diagram = Self::with_states(
            automaton.states().iter(),
            automaton.initial(),
            |s| automaton.is_final(s),
            |_| false,
        );
        for transition in automaton.transitions() {
            diagram.add_edge(&transition.source, &transition.target, transition.label());
        }
        diagram
    }

    /// Diagram of the normalized relation; fresh states are drawn dashed.
    pub fn from_normalized(normalized: &NormalizedAutomaton) -> Self {
        let mut diagram = Self::with_states(
            normalized.states().iter(),
            normalized.initial(),
            |s| normalized.finals().contains(s),
            |s| normalized.fresh_states().contains(s),
        );
        for step in normalized.transitions() {
            diagram.add_edge(step.source(), step.target(), step.label());
        }
        diagram
    }

    fn with_states<'a>(
        states: impl Iterator<Item = &'a State>,
        initial: &State,
        accepting: impl Fn(&State) -> bool,
        fresh: impl Fn(&State) -> bool,
    ) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index = HashMap::new();
        for state in states {
            let idx = graph.add_node(DiagramNode {
                state: state.clone(),
                initial: state == initial,
                accepting: accepting(state),
                fresh: fresh(state),
            });
            index.insert(state.clone(), idx);
        }
        Self { graph, index }
    }

    fn add_edge(&mut self, source: &State, target: &State, label: String) {
        if let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) {
            self.graph.add_edge(from, to, label);
        }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Number of drawn states.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of drawn moves.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render as a Graphviz `digraph`, laid out left to right.
    pub fn to_dot(&self) -> String {
        let edge_attrs = |_: &Graph, edge: EdgeReference<'_, String>| {
            format!("label=\"{}\" ", escape(edge.weight()))
        };
        let node_attrs = |_: &Graph, (_, node): (NodeIndex, &DiagramNode)| {
            let shape = if node.accepting {
                "doublecircle"
            } else {
                "circle"
            };
            let style = if node.fresh { " style=dashed" } else { "" };
            format!(
                "label=\"{}\" shape={}{} ",
                escape(node.state.name()),
                shape,
                style
            )
        };
        let body = Dot::with_attr_getters(
            &self.graph,
            &[
                Config::EdgeNoLabel,
                Config::NodeNoLabel,
                Config::GraphContentOnly,
            ],
            &edge_attrs,
            &node_attrs,
        );

        let mut out = String::new();
        let _ = writeln!(out, "digraph pda_machine {{");
        let _ = writeln!(out, "    rankdir=LR;");
        let _ = writeln!(out, "    size=\"8,5\";");
        let _ = writeln!(out, "    entry [label=\"\" shape=plaintext];");
        let _ = write!(out, "{:?}", body);
        if let Some(initial) = self.graph.node_indices().find(|i| self.graph[*i].initial) {
            let _ = writeln!(out, "    entry -> {};", initial.index());
        }
        out.push_str("}\n");
        out
    }
}

/// Escape text for a double-quoted DOT string.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdacfg_core::{normalize, samples};

    #[test]
    fn test_diagram_counts() {
        let pda = samples::anbn();
        let diagram = AutomatonDiagram::from_automaton(&pda);
        assert_eq!(diagram.node_count(), 3);
        assert_eq!(diagram.edge_count(), 5);

        let normalized = AutomatonDiagram::from_normalized(&normalize(&pda));
        assert_eq!(normalized.node_count(), 8);
        assert_eq!(normalized.edge_count(), 10);
    }

    #[test]
    fn test_dot_layout_and_shapes() {
        let dot = AutomatonDiagram::from_automaton(&samples::anbn()).to_dot();

        assert!(dot.starts_with("digraph pda_machine {"));
        assert!(dot.contains("rankdir=LR;"));
        assert!(dot.contains("size=\"8,5\";"));
        assert!(dot.contains("entry [label=\"\" shape=plaintext];"));
        assert!(dot.contains("entry -> 0;"));
        assert!(dot.contains("label=\"q2\" shape=doublecircle"));
        assert!(dot.contains("label=\"q0\" shape=circle"));
        assert!(dot.contains("label=\"a,z,0z\""));
        assert!(dot.contains("label=\"λ,z,z\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_fresh_states_are_dashed() {
        let dot = AutomatonDiagram::from_normalized(&normalize(&samples::anbn())).to_dot();
        assert!(dot.contains("label=\"#1\" shape=circle style=dashed"));
        assert!(!dot.contains("label=\"q0\" shape=circle style=dashed"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
