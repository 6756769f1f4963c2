//! Plain-text scene graph dump
//!
//! Written alongside the level binary for human inspection: one line per
//! node, four spaces of indentation per depth level, `name (category)`.
//! Not part of the binary contract.

use std::fmt::Write;

use kartforge_scene::graph::{NodeId, SceneGraph};

/// Render the flattened forest as indented text.
pub fn graph_dump(graph: &SceneGraph) -> String {
    let mut out = String::new();
    for &root in graph.roots() {
        dump_node(graph, root, &mut out);
    }
    out
}

fn dump_node(graph: &SceneGraph, node_id: NodeId, out: &mut String) {
    let node = graph.node(node_id);
    let object = graph.object_of(node_id);

    for _ in 0..node.depth {
        out.push_str("    ");
    }
    let _ = writeln!(out, "{} ({})", object.name, object.category.label());

    for &child in &node.children {
        dump_node(graph, child, out);
    }
}
