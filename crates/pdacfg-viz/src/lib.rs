//! Graphviz rendering for pdacfg automata.
//!
//! Builds a petgraph diagram of an automaton (as defined, or after
//! normalization) and renders it to DOT. Image formats are produced by piping
//! the DOT source through the Graphviz `dot` binary.

mod diagram;
mod export;

pub use diagram::{AutomatonDiagram, DiagramNode};
pub use export::{export, ExportFormat, VizError, DEFAULT_GRAPHVIZ};
