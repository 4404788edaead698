//! Vertex and index buffers.

use std::ffi::c_void;

use bytemuck::Pod;
use gl::types::*;

use super::bindings::{self, Binding};
use super::debug::GlError;
use crate::gl_call;

/// Represents a [vertex buffer object (VBO)](vbo), which is a representation of vertex data that's
/// sent to the graphics card. Vertices don't have to be spatial; they can represent color, texture
/// coordinates, or any other data you want sent to the graphics card. How the bytes are read is
/// described separately by a [`VertexBufferLayout`](super::layout::VertexBufferLayout).
///
/// [vbo]: https://en.wikipedia.org/wiki/Vertex_buffer_object
pub struct VertexBuffer {
    id: u32,
    size: usize,
}

impl VertexBuffer {
    /// Uploads `data` into a new static buffer. Leaves the buffer bound.
    pub fn new<T: Pod>(data: &[T]) -> Result<Self, GlError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);

        let mut id = 0u32;
        gl_call!(gl::GenBuffers(1, &mut id))?;
        let vbo = Self { id, size: bytes.len() };

        vbo.bind()?;
        gl_call!(gl::BufferData(
            gl::ARRAY_BUFFER,
            bytes.len() as GLsizeiptr,
            bytes.as_ptr() as *const c_void,
            gl::STATIC_DRAW
        ))?;

        log::debug!("created vertex buffer {} ({} bytes)", vbo.id, vbo.size);
        Ok(vbo)
    }

    pub fn id(&self) -> u32 { self.id }

    /// Size of the uploaded data in bytes.
    pub fn size(&self) -> usize { self.size }

    pub fn bind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindBuffer(gl::ARRAY_BUFFER, self.id))?;
        bindings::record(Binding::ArrayBuffer(self.id));
        Ok(())
    }

    pub fn unbind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindBuffer(gl::ARRAY_BUFFER, 0))?;
        bindings::record(Binding::ArrayBuffer(0));
        Ok(())
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.id);
        }
        bindings::release(Binding::ArrayBuffer(self.id));
    }
}

/// The integer type an index buffer stores. The draw call has to be told the same type the buffer
/// was created with, so the buffer carries it around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    pub fn gl_enum(self) -> GLenum {
        match self {
            IndexType::U8 => gl::UNSIGNED_BYTE,
            IndexType::U16 => gl::UNSIGNED_SHORT,
            IndexType::U32 => gl::UNSIGNED_INT,
        }
    }

    /// Size of one index in bytes.
    pub fn size(self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Integer types usable as indices.
pub trait IndexElement: Pod {
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u8 {
    const INDEX_TYPE: IndexType = IndexType::U8;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::U16;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::U32;
}

/// Represents an element buffer object (EBO), which is a list of vertex ID's. This allows you to
/// reuse vertex data. This way, to draw a rectangle (which is two triangles that share a common
/// side), you don't need to send data for the shared vertices twice.
pub struct IndexBuffer {
    id: u32,
    count: usize,
    index_type: IndexType,
}

impl IndexBuffer {
    /// Uploads `indices` into a new static buffer. Leaves the buffer bound.
    pub fn new<T: IndexElement>(indices: &[T]) -> Result<Self, GlError> {
        let bytes: &[u8] = bytemuck::cast_slice(indices);

        let mut id = 0u32;
        gl_call!(gl::GenBuffers(1, &mut id))?;
        let ebo = Self {
            id,
            count: indices.len(),
            index_type: T::INDEX_TYPE,
        };

        ebo.bind()?;
        gl_call!(gl::BufferData(
            gl::ELEMENT_ARRAY_BUFFER,
            bytes.len() as GLsizeiptr,
            bytes.as_ptr() as *const c_void,
            gl::STATIC_DRAW
        ))?;

        log::debug!("created index buffer {} ({} x {:?})", ebo.id, ebo.count, ebo.index_type);
        Ok(ebo)
    }

    pub fn id(&self) -> u32 { self.id }

    /// Number of indices in the buffer.
    pub fn count(&self) -> usize { self.count }

    pub fn index_type(&self) -> IndexType { self.index_type }

    pub fn bind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.id))?;
        bindings::record(Binding::ElementBuffer(self.id));
        Ok(())
    }

    pub fn unbind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0))?;
        bindings::record(Binding::ElementBuffer(0));
        Ok(())
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.id);
        }
        bindings::release(Binding::ElementBuffer(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_types_map_to_unsigned_enums() {
        assert_eq!(u8::INDEX_TYPE.gl_enum(), gl::UNSIGNED_BYTE);
        assert_eq!(u16::INDEX_TYPE.gl_enum(), gl::UNSIGNED_SHORT);
        assert_eq!(u32::INDEX_TYPE.gl_enum(), gl::UNSIGNED_INT);
        assert_ne!(u32::INDEX_TYPE.gl_enum(), gl::INT);
    }

    #[test]
    fn index_sizes_match_rust_types() {
        assert_eq!(u8::INDEX_TYPE.size(), std::mem::size_of::<u8>());
        assert_eq!(u16::INDEX_TYPE.size(), std::mem::size_of::<u16>());
        assert_eq!(u32::INDEX_TYPE.size(), std::mem::size_of::<u32>());
    }
}
