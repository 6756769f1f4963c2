//! Mesh welding
//!
//! Turns triangulated mesh data into deduplicated indexed vertex buffers.
//! Corners are visited in triangle order; every corner's attribute tuple is
//! converted to game space first, then mapped to an index. Tuples are
//! compared by exact bit pattern (with -0.0 unified to 0.0 so the two zeros
//! weld together), never within a tolerance, so identical input always
//! yields identical buffers.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use kartforge_core::convert;
use kartforge_core::{Error, Result};

use kartforge_scene::source::{AttributeDomain, ColorAttribute, Scene, SourceMesh, SourceObject, Triangle};

/// Deduplicated vertex attributes plus per-corner indices, three per
/// triangle. Attribute stride is 3 (position) or 9 (position + normal +
/// color), decided by the entry point that built the buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedBuffer {
    pub indices: Vec<u16>,
    pub attributes: Vec<f32>,
}

impl IndexedBuffer {
    pub fn unique_vertex_count(&self, stride: usize) -> usize {
        self.attributes.len() / stride
    }
}

/// Corner color when the mesh carries no color attribute.
const DEFAULT_COLOR: Vec3 = Vec3::new(0.2, 0.2, 0.2);

/// Position + flat normal + corner color tuples in mesh-local space
/// (stride 9). Feeds the geometry pool, car parts and runtime assets.
pub fn weld_local_attributes(mesh: &SourceMesh) -> Result<IndexedBuffer> {
    let colors = corner_colors(mesh)?;
    let mut welder = Welder::<9>::new(&mesh.name);

    for triangle in &mesh.triangles {
        let normal = convert::position_to_game(triangle_normal(mesh, triangle));

        for corner in 0..3 {
            let position = convert::position_to_game(corner_position(mesh, triangle, corner));
            let color = match colors {
                Some(attribute) => attribute.data[triangle.corners[corner] as usize],
                None => DEFAULT_COLOR,
            };

            welder.push([
                position.x, position.y, position.z,
                normal.x, normal.y, normal.z,
                color.x, color.y, color.z,
            ])?;
        }
    }

    Ok(welder.finish())
}

/// Position-only tuples in mesh-local space (stride 3). Feeds mesh hulls.
pub fn weld_local_positions(mesh: &SourceMesh) -> Result<IndexedBuffer> {
    let mut welder = Welder::<3>::new(&mesh.name);

    for triangle in &mesh.triangles {
        for corner in 0..3 {
            let position = convert::position_to_game(corner_position(mesh, triangle, corner));
            welder.push([position.x, position.y, position.z])?;
        }
    }

    Ok(welder.finish())
}

/// Position-only tuples with the node's world matrix applied before
/// conversion (stride 3). Feeds ground collision meshes.
pub fn weld_global_positions(world: &Mat4, mesh: &SourceMesh) -> Result<IndexedBuffer> {
    let mut welder = Welder::<3>::new(&mesh.name);

    for triangle in &mesh.triangles {
        for corner in 0..3 {
            let local = corner_position(mesh, triangle, corner);
            let position = convert::position_to_game(world.transform_point3(local));
            welder.push([position.x, position.y, position.z])?;
        }
    }

    Ok(welder.finish())
}

/// Resolve the mesh referenced by a renderable object, by the entity's
/// unique name when it has none.
pub fn object_mesh<'s>(
    scene: &'s Scene,
    object: &SourceObject,
    unique_name: &str,
) -> Result<&'s SourceMesh> {
    let mesh_id = object.mesh.ok_or_else(|| Error::MissingMesh {
        entity: unique_name.to_string(),
    })?;
    Ok(&scene.meshes[mesh_id])
}

fn corner_position(mesh: &SourceMesh, triangle: &Triangle, corner: usize) -> Vec3 {
    mesh.positions[triangle.vertices[corner] as usize]
}

/// Flat per-triangle normal in source space. Degenerate triangles get a
/// zero normal rather than NaNs.
fn triangle_normal(mesh: &SourceMesh, triangle: &Triangle) -> Vec3 {
    let [a, b, c] = triangle.vertices.map(|v| mesh.positions[v as usize]);
    (b - a).cross(c - a).normalize_or_zero()
}

fn corner_colors(mesh: &SourceMesh) -> Result<Option<&ColorAttribute>> {
    match &mesh.colors {
        None => Ok(None),
        Some(attribute) => {
            if attribute.domain != AttributeDomain::Corner {
                return Err(Error::ColorsNotPerCorner {
                    mesh: mesh.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
            Ok(Some(attribute))
        }
    }
}

/// Exact-tuple index assignment in first-seen order.
struct Welder<'a, const N: usize> {
    mesh_name: &'a str,
    seen: HashMap<[u32; N], u16>,
    indices: Vec<u16>,
    attributes: Vec<f32>,
}

impl<'a, const N: usize> Welder<'a, N> {
    fn new(mesh_name: &'a str) -> Self {
        Self {
            mesh_name,
            seen: HashMap::new(),
            indices: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn push(&mut self, tuple: [f32; N]) -> Result<()> {
        let key = tuple.map(canonical_bits);

        if let Some(&index) = self.seen.get(&key) {
            self.indices.push(index);
            return Ok(());
        }

        let next = self.seen.len();
        if next > u16::MAX as usize {
            return Err(Error::IndexOverflow {
                mesh: self.mesh_name.to_string(),
                count: next + 1,
            });
        }

        let index = next as u16;
        self.seen.insert(key, index);
        self.indices.push(index);
        self.attributes.extend_from_slice(&tuple);
        Ok(())
    }

    fn finish(self) -> IndexedBuffer {
        IndexedBuffer {
            indices: self.indices,
            attributes: self.attributes,
        }
    }
}

/// Bit pattern with the two float zeros unified.
fn canonical_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}
