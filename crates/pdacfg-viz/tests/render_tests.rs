//! Integration tests for pdacfg-viz.

use pdacfg_core::{load_definition, normalize, samples, save_definition};
use pdacfg_viz::{export, AutomatonDiagram, ExportFormat};

#[test]
fn test_loaded_definition_renders_to_gv() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("dyck.json");
    save_definition(&definition, &samples::dyck(), None).unwrap();

    let pda = load_definition(&definition).unwrap();
    let dot = AutomatonDiagram::from_automaton(&pda).to_dot();
    let out = dir.path().join("dyck.gv");
    export(&dot, ExportFormat::Gv, &out, "dot").unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("label=\"q\" shape=doublecircle"));
    assert!(written.contains("label=\"(,λ,X\""));
    assert!(written.contains("label=\"),X,λ\""));
}

#[test]
fn test_normalized_diagram_has_every_step() {
    let normalized = normalize(&samples::anbn());
    let diagram = AutomatonDiagram::from_normalized(&normalized);

    assert_eq!(diagram.node_count(), normalized.states().len());
    assert_eq!(diagram.edge_count(), normalized.transitions().len());
    let dashed = diagram.graph().node_weights().filter(|n| n.fresh).count();
    assert_eq!(dashed, normalized.fresh_states().len());
}
