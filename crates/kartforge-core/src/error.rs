//! Unified error handling for kartforge
//!
//! One error type covers the whole pipeline: scene document loading, graph
//! construction, and binary export. Every structural variant carries the
//! unique name of the offending entity so a failed batch export can report
//! exactly which object violated which invariant.

use thiserror::Error;

/// Unified error type for all kartforge operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Scene Document Errors ====================

    /// The scene document could not be parsed
    #[error("Invalid scene document: {message}")]
    SceneDocument { message: String },

    /// An index in the scene document points outside its arena
    #[error("Invalid scene reference: {message}")]
    InvalidReference { message: String },

    /// A collection is reachable from its own instancing chain
    #[error("Collection '{collection}' instances itself, directly or through a nested instance")]
    InstanceCycle { collection: String },

    // ==================== Structural Input Errors ====================

    /// A rigid-body island with nothing in it
    #[error("Rigid body island '{island}' has no rigid bodies")]
    EmptyIsland { island: String },

    /// An entity that requires a hull child has none
    #[error("'{entity}' has no hull child")]
    MissingHull { entity: String },

    /// The required hull child exists but is the wrong kind
    #[error("Hull of '{entity}' is a {found} hull, expected {expected}")]
    HullKindMismatch {
        entity: String,
        expected: String,
        found: String,
    },

    /// Mesh hulls are only valid on oil slicks
    #[error("Hull '{hull}' of '{entity}' is a mesh hull; only box and cylinder hulls are allowed here")]
    MeshHullUnsupported { entity: String, hull: String },

    /// More unique vertices than a u16 index can address
    #[error("Mesh '{mesh}' has {count} unique vertices, over the 16-bit index limit")]
    IndexOverflow { mesh: String, count: usize },

    /// Color data that is not laid out per face corner
    #[error("Color attribute '{attribute}' of mesh '{mesh}' is not a per-corner attribute")]
    ColorsNotPerCorner { mesh: String, attribute: String },

    /// An object in a renderable category without mesh data
    #[error("'{entity}' is marked for mesh export but has no mesh data")]
    MissingMesh { entity: String },

    /// An AI-path object without curve data
    #[error("'{entity}' is marked as the AI path but has no curve data")]
    MissingCurve { entity: String },

    /// A fixed-name car part is absent from the scene
    #[error("Required part '{part}' not found in the scene")]
    MissingPart { part: String },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a scene document error
    pub fn scene_document(message: impl Into<String>) -> Self {
        Error::SceneDocument {
            message: message.into(),
        }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Error::InvalidReference {
            message: message.into(),
        }
    }

    /// Check if this is a structural input error (bad scene content, as
    /// opposed to an unreadable document or a filesystem failure)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::EmptyIsland { .. }
                | Error::MissingHull { .. }
                | Error::HullKindMismatch { .. }
                | Error::MeshHullUnsupported { .. }
                | Error::IndexOverflow { .. }
                | Error::ColorsNotPerCorner { .. }
                | Error::MissingMesh { .. }
                | Error::MissingCurve { .. }
                | Error::MissingPart { .. }
                | Error::InstanceCycle { .. }
        )
    }
}
