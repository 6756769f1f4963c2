//! kartforge-export
//!
//! Binary exporters for the kart game's asset formats.
//!
//! # Formats
//!
//! | Target         | Extension | Version | Contents |
//! |----------------|-----------|---------|----------|
//! | Level          | `.kgl`    | 4       | Spawn point, ground collision, geometry pool, entities, AI path |
//! | Car            | `.kgc`    | 1       | Body geometry, hull transforms, wheel |
//! | Runtime assets | `.kgr`    | 1       | Shrapnel and oil slick templates |
//!
//! All three are little-endian throughout and share the same framing: a
//! `u32` version header, fixed section order, and the `0xAAAAAAAA` cursor
//! check sentinel after every variable-length section.
//!
//! # Example
//!
//! ```rust,ignore
//! use kartforge_export::{export_level, TracingLog};
//! use kartforge_scene::Scene;
//!
//! let scene = Scene::from_file("track.scene.json")?;
//! export_level(&scene, "track.kgl".as_ref(), &TracingLog)?;
//! ```

pub mod car;
pub mod dump;
pub mod level;
pub mod mesh;
pub mod runtime_assets;
pub mod trace;
pub mod writer;

mod util;

// Re-export main entry points
pub use car::{encode_car, export_car, CAR_VERSION};
pub use level::{encode_level, export_level, LEVEL_VERSION};
pub use runtime_assets::{encode_runtime_assets, export_runtime_assets, RUNTIME_ASSETS_VERSION};

pub use mesh::IndexedBuffer;
pub use trace::{ExportLog, NullLog, TracingLog};
pub use writer::{SectionWriter, CURSOR_CHECK};
