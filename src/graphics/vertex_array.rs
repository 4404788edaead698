use std::ffi::c_void;

use gl::types::*;

use super::bindings::{self, Binding};
use super::buffer::VertexBuffer;
use super::debug::GlError;
use super::layout::VertexBufferLayout;
use crate::gl_call;

/// A vertex array object (VAO) remembers which buffers feed which attributes, so a draw only has to
/// bind the array instead of re-describing the layout every frame.
pub struct VertexArray {
    id: u32,
}

impl VertexArray {
    pub fn new() -> Result<Self, GlError> {
        let mut id = 0u32;
        gl_call!(gl::GenVertexArrays(1, &mut id))?;
        Ok(Self { id })
    }

    pub fn id(&self) -> u32 { self.id }

    /// Attaches `buffer` to this array, registering one attribute per layout element. Leaves both
    /// the array and the buffer bound.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexBufferLayout) -> Result<(), GlError> {
        self.bind()?;
        buffer.bind()?;

        let stride = layout.stride() as GLsizei;
        for attribute in layout.attributes() {
            let element = attribute.element;
            gl_call!(gl::EnableVertexAttribArray(attribute.index))?;
            gl_call!(gl::VertexAttribPointer(
                attribute.index,
                element.count as GLint,
                element.kind.gl_enum(),
                if element.normalized { gl::TRUE } else { gl::FALSE },
                stride,
                attribute.offset as *const c_void
            ))?;
        }

        log::debug!(
            "attached buffer {} to vertex array {} ({} attributes, stride {})",
            buffer.id(),
            self.id,
            layout.elements().len(),
            stride
        );
        Ok(())
    }

    pub fn bind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindVertexArray(self.id))?;
        bindings::record(Binding::VertexArray(self.id));
        Ok(())
    }

    pub fn unbind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindVertexArray(0))?;
        bindings::record(Binding::VertexArray(0));
        Ok(())
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.id);
        }
        bindings::release(Binding::VertexArray(self.id));
    }
}
