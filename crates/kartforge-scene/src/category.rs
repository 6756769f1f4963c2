//! Object category tags
//!
//! Categories are assigned per object in the editor and consumed read-only
//! by the export passes. They are closed enums so that adding a category is
//! a compile-checked change everywhere it is matched.

use serde::{Deserialize, Serialize};

/// Primary role of a scene object, driving the level export passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    None,
    SpawnPoint,
    GroundCollisionMesh,
    /// Dual role: exported both as a ground collision mesh and as an
    /// inanimate entity.
    GroundCollisionMeshAndInanimate,
    Inanimate,
    RigidBodyIsland,
    RigidBody,
    Hull,
    OilSlick,
    Bumper,
    BoostJet,
    IdealPath,
}

impl Category {
    /// Categories whose mesh lands in the shared geometry pool.
    pub fn has_pooled_geometry(self) -> bool {
        matches!(
            self,
            Category::Inanimate
                | Category::RigidBody
                | Category::OilSlick
                | Category::Bumper
                | Category::BoostJet
                | Category::GroundCollisionMeshAndInanimate
        )
    }

    /// Categories the ground collision pass picks up.
    pub fn is_ground_collision(self) -> bool {
        matches!(
            self,
            Category::GroundCollisionMesh | Category::GroundCollisionMeshAndInanimate
        )
    }

    /// Categories the inanimate entity pass picks up.
    pub fn is_inanimate(self) -> bool {
        matches!(
            self,
            Category::Inanimate | Category::GroundCollisionMeshAndInanimate
        )
    }

    /// Editor-facing label, used by the debug dump.
    pub fn label(self) -> &'static str {
        match self {
            Category::None => "none",
            Category::SpawnPoint => "spawn_point",
            Category::GroundCollisionMesh => "ground_collision_mesh",
            Category::GroundCollisionMeshAndInanimate => "ground_collision_mesh_and_inanimate",
            Category::Inanimate => "inanimate",
            Category::RigidBodyIsland => "rigid_body_island",
            Category::RigidBody => "rigid_body",
            Category::Hull => "hull",
            Category::OilSlick => "oil_slick",
            Category::Bumper => "bumper",
            Category::BoostJet => "boost_jet",
            Category::IdealPath => "ideal_path",
        }
    }
}

/// Secondary role used by the runtime-assets export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeCategory {
    #[default]
    None,
    ShockBarrelShrapnel,
    OilSlick,
    Hull,
}

/// Collision primitive kind of a hull object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HullKind {
    #[default]
    Box,
    Cylinder,
    Mesh,
}

impl HullKind {
    /// Wire tag serialized into hull records.
    pub fn tag(self) -> u32 {
        match self {
            HullKind::Box => 0,
            HullKind::Cylinder => 1,
            HullKind::Mesh => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HullKind::Box => "box",
            HullKind::Cylinder => "cylinder",
            HullKind::Mesh => "mesh",
        }
    }
}

/// Status effect a rigid body applies on contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    #[default]
    None,
    Shock,
    Fire,
    ExplodingShockBarrel,
    ExplodingFireBarrel,
}

impl StatusEffect {
    /// Wire tag serialized into rigid body records.
    pub fn tag(self) -> u32 {
        match self {
            StatusEffect::None => 0,
            StatusEffect::Shock => 1,
            StatusEffect::Fire => 2,
            StatusEffect::ExplodingShockBarrel => 3,
            StatusEffect::ExplodingFireBarrel => 4,
        }
    }
}
