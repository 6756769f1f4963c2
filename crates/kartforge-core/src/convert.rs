//! Source-to-game coordinate conversion
//!
//! The editor scene is Z-up, the game runtime is Y-up. Every position,
//! orientation and scale crossing the serialization boundary goes through
//! these mappings; raw source-space and converted values must never be mixed
//! in one record.
//!
//! - Position `(x, y, z)` -> `(x, z, -y)`
//! - Orientation `(x, y, z, w)` -> `(x, z, -y, w)`
//! - Scale `(x, y, z)` -> `(x, z, y)`
//!
//! Each mapping has an exact inverse; the pairs are used by round-trip tests
//! and by nothing else in the pipeline.

use glam::{Mat4, Quat, Vec3};

/// A source-space transform decomposed and converted to game space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameTransform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

/// Convert a source-space position (or direction) to game space.
pub fn position_to_game(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Inverse of [`position_to_game`].
pub fn position_from_game(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// Convert a source-space unit quaternion to game space.
pub fn orientation_to_game(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.z, -q.y, q.w)
}

/// Inverse of [`orientation_to_game`].
pub fn orientation_from_game(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, -q.z, q.y, q.w)
}

/// Convert a source-space scale (or bounding dimensions) to game space.
/// Swapping two axes is its own inverse.
pub fn scale_to_game(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// Inverse of [`scale_to_game`].
pub fn scale_from_game(v: Vec3) -> Vec3 {
    scale_to_game(v)
}

/// Decompose a source-space 4x4 transform and convert each component.
pub fn transform_to_game(matrix: &Mat4) -> GameTransform {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();

    GameTransform {
        position: position_to_game(translation),
        orientation: orientation_to_game(rotation),
        scale: scale_to_game(scale),
    }
}
