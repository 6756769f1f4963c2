//! Little-endian primitive writers
//!
//! Everything the three formats serialize goes through this module: IEEE-754
//! `f32`, `u32`/`u16` integers, `u8`-as-boolean, length-prefixed UTF-8
//! strings, vectors, quaternions, indexed vertex buffers, and the cursor
//! check sentinel written after every variable-length section.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Quat, Vec3};

use kartforge_core::convert::GameTransform;
use kartforge_core::Result;

use crate::mesh::IndexedBuffer;

/// Sentinel written after every variable-length section. A decoder whose
/// cursor drifted will not read this value back; it checks interleaving,
/// not content.
pub const CURSOR_CHECK: u32 = 0xAAAA_AAAA;

/// Primitive writer over any byte sink.
pub struct SectionWriter<W: Write> {
    inner: W,
}

impl<W: Write> SectionWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.inner.write_u8(u8::from(value))?;
        Ok(())
    }

    /// `u32` byte length followed by raw UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_u32(value.len() as u32)?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    /// (x, y, z, w) order, game space.
    pub fn write_quat(&mut self, q: Quat) -> Result<()> {
        self.write_f32(q.x)?;
        self.write_f32(q.y)?;
        self.write_f32(q.z)?;
        self.write_f32(q.w)
    }

    /// Position, orientation, scale of a converted transform.
    pub fn write_transform(&mut self, transform: &GameTransform) -> Result<()> {
        self.write_vec3(transform.position)?;
        self.write_quat(transform.orientation)?;
        self.write_vec3(transform.scale)
    }

    /// `u32` index count, the `u16` indices, `u32` attribute float count,
    /// the `f32` attributes.
    pub fn write_indexed_buffer(&mut self, buffer: &IndexedBuffer) -> Result<()> {
        self.write_u32(buffer.indices.len() as u32)?;
        for &index in &buffer.indices {
            self.write_u16(index)?;
        }

        self.write_u32(buffer.attributes.len() as u32)?;
        for &attribute in &buffer.attributes {
            self.write_f32(attribute)?;
        }

        Ok(())
    }

    pub fn write_cursor_check(&mut self) -> Result<()> {
        self.write_u32(CURSOR_CHECK)
    }
}
