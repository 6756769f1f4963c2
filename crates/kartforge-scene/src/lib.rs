//! kartforge-scene
//!
//! The editor-side scene description consumed by the exporters, and the
//! flattened scene graph built from it.
//!
//! A scene document is a set of arena-style arrays (objects, collections,
//! meshes) cross-referenced by index. Objects form a hierarchy through
//! parent links and through collection instancing; [`graph::SceneGraph`]
//! flattens both into one forest of uniquely named, world-positioned nodes
//! that the exporters query by category.

pub mod category;
pub mod graph;
pub mod source;

pub use category::{Category, HullKind, RuntimeCategory, StatusEffect};
pub use graph::{NodeId, SceneGraph, SceneNode};
pub use source::{Scene, SourceMesh, SourceObject};
