//! Runtime assets export (`.kgr`)
//!
//! Template geometry the game spawns at runtime (barrel shrapnel, thrown
//! oil slicks), selected by the secondary runtime category rather than the
//! level category. Layout: version, shrapnel records, oil slick records.

use std::io::Write;
use std::path::Path;

use kartforge_core::{convert, Error, Result};
use kartforge_scene::graph::{NodeId, SceneGraph};
use kartforge_scene::source::Scene;
use kartforge_scene::RuntimeCategory;

use crate::mesh;
use crate::trace::ExportLog;
use crate::writer::SectionWriter;

/// Runtime assets format version.
pub const RUNTIME_ASSETS_VERSION: u32 = 1;

/// Export the runtime assets to `output`.
pub fn export_runtime_assets(scene: &Scene, output: &Path, log: &dyn ExportLog) -> Result<()> {
    let graph = SceneGraph::build(scene)?;
    let bytes = encode_runtime_assets(&graph, log)?;
    std::fs::write(output, &bytes)?;
    Ok(())
}

/// Encode the runtime assets into their binary form.
pub fn encode_runtime_assets(graph: &SceneGraph, log: &dyn ExportLog) -> Result<Vec<u8>> {
    let mut writer = SectionWriter::new(Vec::new());
    writer.write_u32(RUNTIME_ASSETS_VERSION)?;

    write_shrapnel(&mut writer, graph, log)?;
    write_oil_slicks(&mut writer, graph, log)?;

    Ok(writer.into_inner())
}

/// Per shrapnel piece: geometry, converted world transform, converted
/// bounding dimensions, the hull child's converted local transform.
fn write_shrapnel<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("shock barrel shrapnel");

    let nodes =
        graph.search_many(|_, object| object.runtime_category == RuntimeCategory::ShockBarrelShrapnel);
    writer.write_u32(nodes.len() as u32)?;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        let object = graph.object_of(node_id);
        log.entity(&node.unique_name);

        let source_mesh = mesh::object_mesh(graph.scene(), object, &node.unique_name)?;
        writer.write_indexed_buffer(&mesh::weld_local_attributes(source_mesh)?)?;

        writer.write_transform(&convert::transform_to_game(&node.world_matrix))?;
        writer.write_vec3(convert::scale_to_game(object.dimensions))?;

        let hull_id = hull_child(graph, node_id)?;
        writer.write_transform(&convert::transform_to_game(
            &graph.object_of(hull_id).local_transform,
        ))?;

        writer.write_cursor_check()?;
    }

    Ok(())
}

/// Per oil slick template: geometry, the hull child's converted local
/// transform and its position-only collision buffer.
fn write_oil_slicks<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("oil slicks");

    let nodes = graph.search_many(|_, object| object.runtime_category == RuntimeCategory::OilSlick);
    writer.write_u32(nodes.len() as u32)?;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        let object = graph.object_of(node_id);
        log.entity(&node.unique_name);

        let source_mesh = mesh::object_mesh(graph.scene(), object, &node.unique_name)?;
        writer.write_indexed_buffer(&mesh::weld_local_attributes(source_mesh)?)?;

        let hull_id = hull_child(graph, node_id)?;
        let hull_node = graph.node(hull_id);
        let hull_object = graph.object_of(hull_id);

        writer.write_transform(&convert::transform_to_game(&hull_object.local_transform))?;
        let hull_mesh = mesh::object_mesh(graph.scene(), hull_object, &hull_node.unique_name)?;
        writer.write_indexed_buffer(&mesh::weld_local_positions(hull_mesh)?)?;

        writer.write_cursor_check()?;
    }

    Ok(())
}

/// The hull child by runtime category; with several, the last one in child
/// order wins.
fn hull_child(graph: &SceneGraph, node_id: NodeId) -> Result<NodeId> {
    graph
        .node(node_id)
        .children
        .iter()
        .copied()
        .filter(|&child| graph.object_of(child).runtime_category == RuntimeCategory::Hull)
        .last()
        .ok_or_else(|| Error::MissingHull {
            entity: graph.node(node_id).unique_name.clone(),
        })
}
