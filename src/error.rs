use thiserror::Error;

use crate::graphics::{GlError, ShaderError, TextureError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create window: {0}")]
    Window(#[from] glutin::CreationError),
    #[error("OpenGL context error: {0}")]
    Context(#[from] glutin::ContextError),
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
