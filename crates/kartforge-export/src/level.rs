//! Level export (`.kgl`)
//!
//! Section order is fixed: version, spawn point, ground collision meshes,
//! geometry pool, inanimate entities, rigid body islands, oil slicks,
//! bumpers, boost jets, AI path. Every pass searches the flattened graph for
//! its category, gathers its sub-data, and emits a fixed-layout record; each
//! variable-length record is terminated by the cursor check sentinel.
//!
//! All sections are encoded into memory first and hit the filesystem in one
//! write, so a failed export leaves nothing behind.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;

use glam::{Quat, Vec3};

use kartforge_core::{convert, Error, Result};
use kartforge_scene::graph::{NodeId, SceneGraph};
use kartforge_scene::source::{MeshId, Scene};
use kartforge_scene::{Category, HullKind};

use crate::dump;
use crate::mesh::{self, IndexedBuffer};
use crate::trace::ExportLog;
use crate::util::companion_path;
use crate::writer::SectionWriter;

/// Level format version.
pub const LEVEL_VERSION: u32 = 4;

/// Spawn placement when the scene has no spawn point (game space).
const DEFAULT_SPAWN_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);
const DEFAULT_SPAWN_ORIENTATION: Quat = Quat::IDENTITY;

/// Mesh identity to geometry pool index, built by the pool pass and
/// consumed by every entity record section after it.
type GeometryPool = HashMap<MeshId, u32>;

/// Export a level to `output`, with the graph dump at `<output>.txt` and an
/// empty `<output>.reload` trigger for a running game to pick up.
pub fn export_level(scene: &Scene, output: &Path, log: &dyn ExportLog) -> Result<()> {
    let graph = SceneGraph::build(scene)?;
    let bytes = encode_level(&graph, log)?;

    std::fs::write(output, &bytes)?;
    std::fs::write(companion_path(output, ".txt"), dump::graph_dump(&graph))?;
    std::fs::write(companion_path(output, ".reload"), "")?;

    Ok(())
}

/// Encode a level into its binary form.
pub fn encode_level(graph: &SceneGraph, log: &dyn ExportLog) -> Result<Vec<u8>> {
    let mut writer = SectionWriter::new(Vec::new());
    writer.write_u32(LEVEL_VERSION)?;

    write_spawn_point(&mut writer, graph, log)?;
    write_ground_collision_meshes(&mut writer, graph, log)?;
    let pool = write_geometry_pool(&mut writer, graph, log)?;
    write_inanimate_entities(&mut writer, graph, &pool, log)?;
    write_rigid_body_islands(&mut writer, graph, &pool, log)?;
    write_oil_slicks(&mut writer, graph, &pool, log)?;
    write_single_hull_entities(&mut writer, graph, &pool, Category::Bumper, HullKind::Cylinder, "bumpers", log)?;
    write_single_hull_entities(&mut writer, graph, &pool, Category::BoostJet, HullKind::Box, "boost jets", log)?;
    write_ai_path(&mut writer, graph, log)?;

    Ok(writer.into_inner())
}

/// Fixed-size section: game-space position and orientation, no sentinel.
/// The first spawn point in search order wins; its own world transform is
/// used, not the instance-composed one.
fn write_spawn_point<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("spawn point");

    let (position, orientation) =
        match graph.search_one(|_, object| object.category == Category::SpawnPoint) {
            Some(node_id) => {
                log.entity(&graph.node(node_id).unique_name);
                let transform = convert::transform_to_game(&graph.object_of(node_id).world_transform);
                (transform.position, transform.orientation)
            }
            None => {
                log.note("no spawn point, using the default placement");
                (DEFAULT_SPAWN_POSITION, DEFAULT_SPAWN_ORIENTATION)
            }
        };

    writer.write_vec3(position)?;
    writer.write_quat(orientation)
}

/// Grid extent (max |x|, |z| over every converted vertex of every ground
/// mesh) followed by the per-mesh global-space position buffers.
fn write_ground_collision_meshes<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("ground collision meshes");

    let nodes = graph.search_many(|_, object| object.category.is_ground_collision());

    let mut buffers: Vec<IndexedBuffer> = Vec::with_capacity(nodes.len());
    let mut extent = 0.0f32;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        log.entity(&node.unique_name);

        let source_mesh = mesh::object_mesh(graph.scene(), graph.object_of(node_id), &node.unique_name)?;
        let buffer = mesh::weld_global_positions(&node.world_matrix, source_mesh)?;

        for position in buffer.attributes.chunks_exact(3) {
            extent = extent.max(position[0].abs()).max(position[2].abs());
        }

        buffers.push(buffer);
    }

    writer.write_f32(extent)?;
    writer.write_u32(buffers.len() as u32)?;

    for buffer in &buffers {
        writer.write_indexed_buffer(buffer)?;
        writer.write_cursor_check()?;
    }

    Ok(())
}

/// One combined walk over every renderable category; each distinct mesh is
/// emitted once, indexed in first-seen order. Entity records refer back to
/// these indices.
fn write_geometry_pool<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<GeometryPool> {
    log.section("geometry pool");

    let mut pool = GeometryPool::new();
    let mut entries: Vec<MeshId> = Vec::new();

    for node_id in graph.breadth_first() {
        let object = graph.object_of(node_id);
        if !object.category.has_pooled_geometry() {
            continue;
        }

        let mesh_id = object.mesh.ok_or_else(|| Error::MissingMesh {
            entity: graph.node(node_id).unique_name.clone(),
        })?;

        if !pool.contains_key(&mesh_id) {
            pool.insert(mesh_id, entries.len() as u32);
            entries.push(mesh_id);
        }
    }

    writer.write_u32(entries.len() as u32)?;

    for &mesh_id in &entries {
        let source_mesh = &graph.scene().meshes[mesh_id];
        log.entity(&source_mesh.name);

        writer.write_string(&source_mesh.name)?;
        writer.write_indexed_buffer(&mesh::weld_local_attributes(source_mesh)?)?;
        writer.write_cursor_check()?;
    }

    Ok(pool)
}

fn write_inanimate_entities<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    pool: &GeometryPool,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("inanimate entities");

    let nodes = graph.search_many(|_, object| object.category.is_inanimate());
    writer.write_u32(nodes.len() as u32)?;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        log.entity(&node.unique_name);

        writer.write_string(&node.unique_name)?;
        writer.write_transform(&convert::transform_to_game(&node.world_matrix))?;
        writer.write_u32(pool_index(graph, pool, node_id)?)?;
        write_hull_list(writer, graph, node_id)?;
        writer.write_cursor_check()?;
    }

    Ok(())
}

/// Islands are found at any depth, but the search does not descend into an
/// island looking for further islands. Bodies inside an island are gathered
/// at unrestricted depth; an island without any is a structural error.
fn write_rigid_body_islands<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    pool: &GeometryPool,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("rigid body islands");

    let mut islands: Vec<Vec<NodeId>> = Vec::new();
    let mut to_visit: VecDeque<NodeId> = graph.roots().iter().copied().collect();

    while let Some(node_id) = to_visit.pop_front() {
        let node = graph.node(node_id);

        if graph.object_of(node_id).category != Category::RigidBodyIsland {
            to_visit.extend(node.children.iter().copied());
            continue;
        }

        log.entity(&node.unique_name);

        let mut bodies: Vec<NodeId> = Vec::new();
        let mut in_island: VecDeque<NodeId> = node.children.iter().copied().collect();

        while let Some(inner_id) = in_island.pop_front() {
            in_island.extend(graph.node(inner_id).children.iter().copied());
            if graph.object_of(inner_id).category == Category::RigidBody {
                bodies.push(inner_id);
            }
        }

        if bodies.is_empty() {
            return Err(Error::EmptyIsland {
                island: node.unique_name.clone(),
            });
        }

        islands.push(bodies);
    }

    writer.write_u32(islands.len() as u32)?;

    for island in &islands {
        writer.write_u32(island.len() as u32)?;

        for &body_id in island {
            let node = graph.node(body_id);
            let object = graph.object_of(body_id);
            log.entity(&node.unique_name);

            writer.write_string(&node.unique_name)?;
            writer.write_transform(&convert::transform_to_game(&node.world_matrix))?;
            writer.write_u32(pool_index(graph, pool, body_id)?)?;
            writer.write_f32(object.mass)?;
            // Scale comes from the bounding dimensions, not the transform.
            writer.write_vec3(convert::scale_to_game(object.dimensions))?;
            writer.write_bool(object.collision_exclude)?;
            writer.write_u32(object.status_effect.tag())?;
            write_hull_list(writer, graph, body_id)?;
            writer.write_cursor_check()?;
        }
    }

    Ok(())
}

fn write_oil_slicks<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    pool: &GeometryPool,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("oil slicks");

    let nodes = graph.search_many(|_, object| object.category == Category::OilSlick);
    writer.write_u32(nodes.len() as u32)?;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        let object = graph.object_of(node_id);
        log.entity(&node.unique_name);

        writer.write_string(&node.unique_name)?;
        writer.write_transform(&convert::transform_to_game(&node.world_matrix))?;
        writer.write_u32(pool_index(graph, pool, node_id)?)?;
        writer.write_u32(object.particle_count)?;

        let hull_id = required_hull_child(graph, node_id, HullKind::Mesh)?;
        let hull_node = graph.node(hull_id);
        let hull_object = graph.object_of(hull_id);

        writer.write_transform(&convert::transform_to_game(&hull_object.local_transform))?;
        let hull_mesh = mesh::object_mesh(graph.scene(), hull_object, &hull_node.unique_name)?;
        writer.write_indexed_buffer(&mesh::weld_local_positions(hull_mesh)?)?;

        writer.write_cursor_check()?;
    }

    Ok(())
}

/// Bumpers and boost jets share one record shape; only the category and the
/// required hull kind differ.
fn write_single_hull_entities<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    pool: &GeometryPool,
    category: Category,
    hull_kind: HullKind,
    title: &str,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section(title);

    let nodes = graph.search_many(|_, object| object.category == category);
    writer.write_u32(nodes.len() as u32)?;

    for &node_id in &nodes {
        let node = graph.node(node_id);
        log.entity(&node.unique_name);

        writer.write_string(&node.unique_name)?;
        writer.write_transform(&convert::transform_to_game(&node.world_matrix))?;
        writer.write_u32(pool_index(graph, pool, node_id)?)?;

        let hull_id = required_hull_child(graph, node_id, hull_kind)?;
        writer.write_transform(&convert::transform_to_game(
            &graph.object_of(hull_id).local_transform,
        ))?;

        writer.write_cursor_check()?;
    }

    Ok(())
}

/// The single AI path, resampled to cubic Bezier control points: per
/// consecutive segment the anchor, its outgoing handle and the next
/// anchor's incoming handle, then one trailing anchor. Absent path (or a
/// curve with nothing in its first spline) leaves the section body empty.
fn write_ai_path<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    log: &dyn ExportLog,
) -> Result<()> {
    log.section("ai path");

    if let Some(node_id) = graph.search_one(|_, object| object.category == Category::IdealPath) {
        let node = graph.node(node_id);
        let object = graph.object_of(node_id);

        let curve = object.curve.as_ref().ok_or_else(|| Error::MissingCurve {
            entity: node.unique_name.clone(),
        })?;

        match curve.splines.first() {
            Some(spline) if !spline.points.is_empty() => {
                log.entity(&node.unique_name);

                let world = object.world_transform;
                let points = &spline.points;

                writer.write_u32(((points.len() - 1) * 3 + 1) as u32)?;

                for pair in points.windows(2) {
                    writer.write_vec3(convert::position_to_game(world.transform_point3(pair[0].co)))?;
                    writer.write_vec3(convert::position_to_game(
                        world.transform_point3(pair[0].handle_right),
                    ))?;
                    writer.write_vec3(convert::position_to_game(
                        world.transform_point3(pair[1].handle_left),
                    ))?;
                }

                let last = &points[points.len() - 1];
                writer.write_vec3(convert::position_to_game(world.transform_point3(last.co)))?;
            }
            _ => log.note("ai path curve is empty, leaving the section empty"),
        }
    } else {
        log.note("no ai path");
    }

    writer.write_cursor_check()
}

/// Hull children of an inanimate entity or rigid body: direct children
/// only, box or cylinder kinds only.
fn write_hull_list<W: Write>(
    writer: &mut SectionWriter<W>,
    graph: &SceneGraph,
    node_id: NodeId,
) -> Result<()> {
    let node = graph.node(node_id);
    let hulls: Vec<NodeId> = node
        .children
        .iter()
        .copied()
        .filter(|&child| graph.object_of(child).category == Category::Hull)
        .collect();

    writer.write_u32(hulls.len() as u32)?;

    for hull_id in hulls {
        let hull_object = graph.object_of(hull_id);

        if hull_object.hull_kind == HullKind::Mesh {
            return Err(Error::MeshHullUnsupported {
                entity: node.unique_name.clone(),
                hull: graph.node(hull_id).unique_name.clone(),
            });
        }

        writer.write_transform(&convert::transform_to_game(&hull_object.local_transform))?;
        writer.write_u32(hull_object.hull_kind.tag())?;
    }

    Ok(())
}

/// The first hull child, which must exist and match the required kind.
fn required_hull_child(graph: &SceneGraph, node_id: NodeId, expected: HullKind) -> Result<NodeId> {
    let node = graph.node(node_id);

    let hull_id = node
        .children
        .iter()
        .copied()
        .find(|&child| graph.object_of(child).category == Category::Hull)
        .ok_or_else(|| Error::MissingHull {
            entity: node.unique_name.clone(),
        })?;

    let found = graph.object_of(hull_id).hull_kind;
    if found != expected {
        return Err(Error::HullKindMismatch {
            entity: node.unique_name.clone(),
            expected: expected.label().to_string(),
            found: found.label().to_string(),
        });
    }

    Ok(hull_id)
}

fn pool_index(graph: &SceneGraph, pool: &GeometryPool, node_id: NodeId) -> Result<u32> {
    let node = graph.node(node_id);
    let mesh_id = graph
        .object_of(node_id)
        .mesh
        .ok_or_else(|| Error::MissingMesh {
            entity: node.unique_name.clone(),
        })?;

    pool.get(&mesh_id).copied().ok_or_else(|| {
        Error::invalid_reference(format!(
            "mesh of '{}' missing from the geometry pool",
            node.unique_name
        ))
    })
}
