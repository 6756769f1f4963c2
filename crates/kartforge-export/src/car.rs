//! Car export (`.kgc`)
//!
//! Unlike the level target this is a fixed-name lookup over a small graph:
//! the parts are found by object name, not by category. Layout: version,
//! body geometry, bottom hull transform, upper dome transform, wheel
//! geometry and radius, trailing sentinel.

use std::io::Write;
use std::path::Path;

use kartforge_core::{convert, Error, Result};
use kartforge_scene::graph::{NodeId, SceneGraph};
use kartforge_scene::source::Scene;

use crate::mesh;
use crate::trace::ExportLog;
use crate::writer::SectionWriter;

/// Car format version.
pub const CAR_VERSION: u32 = 1;

/// Export the car to `output`.
pub fn export_car(scene: &Scene, output: &Path, log: &dyn ExportLog) -> Result<()> {
    let graph = SceneGraph::build(scene)?;
    let bytes = encode_car(&graph, log)?;
    std::fs::write(output, &bytes)?;
    Ok(())
}

/// Encode the car into its binary form.
pub fn encode_car(graph: &SceneGraph, log: &dyn ExportLog) -> Result<Vec<u8>> {
    let mut writer = SectionWriter::new(Vec::new());
    writer.write_u32(CAR_VERSION)?;

    write_body_geometry(&mut writer, graph, log)?;
    write_part_transform(&mut writer, graph, "bottom_hull", log)?;
    write_part_transform(&mut writer, graph, "upper_dome", log)?;
    write_wheel(&mut writer, graph, log)?;

    writer.write_cursor_check()?;
    Ok(writer.into_inner())
}

fn write_body_geometry<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("car body");

    let node_id = named_part(graph, "car")?;
    let node = graph.node(node_id);
    log.entity(&node.unique_name);

    let source_mesh = mesh::object_mesh(graph.scene(), graph.object_of(node_id), &node.unique_name)?;
    writer.write_indexed_buffer(&mesh::weld_local_attributes(source_mesh)?)?;
    writer.write_cursor_check()
}

/// Fixed-size record: the part's converted local transform.
fn write_part_transform<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    part: &str,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section(part);

    let node_id = named_part(graph, part)?;
    log.entity(&graph.node(node_id).unique_name);

    writer.write_transform(&convert::transform_to_game(
        &graph.object_of(node_id).local_transform,
    ))
}

/// Wheel geometry plus its radius: half the bounding dimension along the
/// source up axis.
fn write_wheel<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("wheel");

    let node_id = named_part(graph, "wheel")?;
    let node = graph.node(node_id);
    let object = graph.object_of(node_id);
    log.entity(&node.unique_name);

    let source_mesh = mesh::object_mesh(graph.scene(), object, &node.unique_name)?;
    writer.write_indexed_buffer(&mesh::weld_local_attributes(source_mesh)?)?;

    writer.write_f32(object.dimensions.z / 2.0)?;
    writer.write_cursor_check()
}

fn named_part(graph: &SceneGraph, part: &str) -> Result<NodeId> {
    graph
        .search_one(|_, object| object.name == part)
        .ok_or_else(|| Error::MissingPart {
            part: part.to_string(),
        })
}
