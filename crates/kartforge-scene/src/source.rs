//! Scene document data model
//!
//! This is the serialized form of the editor scene the exporters consume:
//! arena arrays of objects, collections and meshes, cross-referenced by
//! index. The editor-side dumper that produces the document is not part of
//! this tool; anything that can provide the same JSON works.

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use kartforge_core::{Error, Result};

use crate::category::{Category, HullKind, RuntimeCategory, StatusEffect};

/// Index into [`Scene::objects`].
pub type ObjectId = usize;
/// Index into [`Scene::collections`].
pub type CollectionId = usize;
/// Index into [`Scene::meshes`].
pub type MeshId = usize;

/// A complete scene document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SourceObject>,
    #[serde(default)]
    pub collections: Vec<SourceCollection>,
    #[serde(default)]
    pub meshes: Vec<SourceMesh>,
}

impl Scene {
    /// Parse a scene document from JSON text and validate its references.
    pub fn from_json(data: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(data)
            .map_err(|e| Error::scene_document(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load and parse a scene document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Objects without a parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Native children of an object, in document order.
    pub fn children_of(&self, parent: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(move |(_, object)| object.parent == Some(parent))
            .map(|(id, _)| id)
    }

    /// Check every cross-reference in the document.
    pub fn validate(&self) -> Result<()> {
        for (id, object) in self.objects.iter().enumerate() {
            if let Some(parent) = object.parent {
                if parent >= self.objects.len() {
                    return Err(Error::invalid_reference(format!(
                        "object '{}' ({id}) has parent index {parent} out of range",
                        object.name
                    )));
                }
            }
            if let Some(collection) = object.instance_collection {
                if collection >= self.collections.len() {
                    return Err(Error::invalid_reference(format!(
                        "object '{}' ({id}) has collection index {collection} out of range",
                        object.name
                    )));
                }
            }
            if let Some(mesh) = object.mesh {
                if mesh >= self.meshes.len() {
                    return Err(Error::invalid_reference(format!(
                        "object '{}' ({id}) has mesh index {mesh} out of range",
                        object.name
                    )));
                }
            }
        }

        for collection in &self.collections {
            for &member in &collection.objects {
                if member >= self.objects.len() {
                    return Err(Error::invalid_reference(format!(
                        "collection '{}' has member index {member} out of range",
                        collection.name
                    )));
                }
            }
        }

        for mesh in &self.meshes {
            let positions = mesh.positions.len() as u32;
            for triangle in &mesh.triangles {
                if triangle.vertices.iter().any(|&v| v >= positions) {
                    return Err(Error::invalid_reference(format!(
                        "mesh '{}' has a triangle vertex index out of range",
                        mesh.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// One editor object occurrence in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceObject {
    pub name: String,
    pub category: Category,
    /// Secondary tag consumed only by the runtime-assets target.
    pub runtime_category: RuntimeCategory,
    pub parent: Option<ObjectId>,
    /// When set, this object stands in for a whole collection; its children
    /// in the flattened graph are the collection's parentless members.
    pub instance_collection: Option<CollectionId>,
    pub mesh: Option<MeshId>,
    pub curve: Option<SourceCurve>,
    /// Transform relative to the parent object (source space).
    pub local_transform: Mat4,
    /// Transform with the whole parent chain applied (source space).
    pub world_transform: Mat4,
    /// Axis-aligned bounding dimensions (source space).
    pub dimensions: Vec3,
    pub mass: f32,
    pub collision_exclude: bool,
    pub status_effect: StatusEffect,
    pub hull_kind: HullKind,
    /// Particle budget for oil slick entities.
    pub particle_count: u32,
    /// Excluded from the flattened graph along with the whole subtree.
    pub ignored: bool,
}

impl Default for SourceObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Category::None,
            runtime_category: RuntimeCategory::None,
            parent: None,
            instance_collection: None,
            mesh: None,
            curve: None,
            local_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
            dimensions: Vec3::ZERO,
            mass: 1.0,
            collision_exclude: false,
            status_effect: StatusEffect::None,
            hull_kind: HullKind::Box,
            particle_count: 0,
            ignored: false,
        }
    }
}

impl SourceObject {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            ..Self::default()
        }
    }
}

/// A named group of objects that can be instanced as a unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCollection {
    pub name: String,
    pub objects: Vec<ObjectId>,
}

/// Triangulated mesh data, modifiers already applied by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub triangles: Vec<Triangle>,
    #[serde(default)]
    pub colors: Option<ColorAttribute>,
}

/// One triangle: position indices plus the corner (loop) indices that
/// address per-corner attribute data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [u32; 3],
    pub corners: [u32; 3],
}

impl Triangle {
    pub fn new(vertices: [u32; 3], corners: [u32; 3]) -> Self {
        Self { vertices, corners }
    }

    /// Triangle whose corner indices coincide with its vertex indices,
    /// for meshes without per-corner attribute data.
    pub fn from_vertices(vertices: [u32; 3]) -> Self {
        Self {
            vertices,
            corners: vertices,
        }
    }
}

/// Which mesh domain a color attribute is laid out over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDomain {
    /// One value per face corner (loop).
    Corner,
    /// One value per vertex.
    Point,
}

/// A named RGB color attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorAttribute {
    pub name: String,
    pub domain: AttributeDomain,
    pub data: Vec<Vec3>,
}

/// Bezier curve data for AI path objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCurve {
    pub splines: Vec<SourceSpline>,
}

/// One spline of a curve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSpline {
    pub points: Vec<BezierPoint>,
}

/// One Bezier anchor with its two handles (source space, curve-local).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BezierPoint {
    pub co: Vec3,
    pub handle_left: Vec3,
    pub handle_right: Vec3,
}
