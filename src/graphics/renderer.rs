use std::ptr::null;

use gl::types::*;
use glam::Vec4;

use super::buffer::{IndexBuffer, IndexType};
use super::debug::GlError;
use super::shader::Shader;
use super::vertex_array::VertexArray;
use crate::gl_call;

/// Arguments of one `glDrawElements` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRequest {
    pub mode: GLenum,
    pub count: GLsizei,
    pub index_type: GLenum,
}

impl DrawRequest {
    /// Draws `count` indices of `index_type` as triangles. The type always comes from the buffer
    /// holding the indices, never from a constant at the draw site.
    pub fn triangles(count: usize, index_type: IndexType) -> Self {
        Self {
            mode: gl::TRIANGLES,
            count: count as GLsizei,
            index_type: index_type.gl_enum(),
        }
    }

    pub fn for_indices(indices: &IndexBuffer) -> Self {
        Self::triangles(indices.count(), indices.index_type())
    }
}

/// Stateless helper that clears the frame and issues indexed draws.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn set_clear_color(&self, color: Vec4) -> Result<(), GlError> {
        gl_call!(gl::ClearColor(color.x, color.y, color.z, color.w))
    }

    pub fn clear(&self) -> Result<(), GlError> {
        gl_call!(gl::Clear(gl::COLOR_BUFFER_BIT))
    }

    /// Binds the program, the vertex array and then the index buffer (the element binding lives
    /// inside the vertex array, so the order matters), and draws every index. Callers don't need
    /// anything bound beforehand; the renderer binds all three itself.
    pub fn draw(
        &self,
        vertex_array: &VertexArray,
        indices: &IndexBuffer,
        shader: &Shader,
    ) -> Result<(), GlError> {
        shader.bind()?;
        vertex_array.bind()?;
        indices.bind()?;

        let request = DrawRequest::for_indices(indices);
        gl_call!(gl::DrawElements(
            request.mode,
            request.count,
            request.index_type,
            null()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_indices_draw_as_unsigned_int() {
        let request = DrawRequest::triangles(6, IndexType::U32);
        assert_eq!(
            request,
            DrawRequest {
                mode: gl::TRIANGLES,
                count: 6,
                index_type: gl::UNSIGNED_INT,
            }
        );
        assert_ne!(request.index_type, gl::INT);
    }

    #[test]
    fn request_count_matches_index_count() {
        for count in [0, 3, 6, 1024] {
            assert_eq!(DrawRequest::triangles(count, IndexType::U16).count, count as GLsizei);
        }
    }

    #[test]
    fn smaller_index_types_keep_their_type() {
        assert_eq!(DrawRequest::triangles(3, IndexType::U8).index_type, gl::UNSIGNED_BYTE);
        assert_eq!(DrawRequest::triangles(3, IndexType::U16).index_type, gl::UNSIGNED_SHORT);
    }
}
