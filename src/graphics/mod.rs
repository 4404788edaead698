//! A simple set of wrappers around the OpenGL API.
//!
//! Drawing a textured rectangle only takes a handful of driver objects, but setting them up is
//! still dozens of cryptic, unsafe function calls. So this is a small library that wraps those
//! calls in a safe interface, providing a documented level of indirection so readers of the code
//! can at least somewhat understand what's going on.
//!
//! Each wrapper owns exactly one driver handle. It is created in the constructor, deleted in
//! `Drop`, and never copied. What is *bound* is global state of the context rather than of any
//! wrapper, and is tracked in [`bindings`].
//!
//! Obviously, a knowledge of OpenGL is *necessary* to understand any of this. [Learn
//! OpenGL][learnopengl] is a classic set of tutorials on understanding and using OpenGL, and
//! [docs.gl][docsgl] documents every call used here.
//!
//! [learnopengl]: https://learnopengl.com/
//! [docsgl]: http://docs.gl/

pub mod bindings;
pub mod buffer;
pub mod debug;
pub mod layout;
pub mod renderer;
pub mod shader;
pub mod texture;
mod utils;
pub mod vertex_array;

pub use self::buffer::{IndexBuffer, IndexElement, IndexType, VertexBuffer};
pub use self::debug::{ErrorCode, GlError};
pub use self::layout::{ElementKind, LayoutElement, VertexBufferLayout};
pub use self::renderer::{DrawRequest, Renderer};
pub use self::shader::{Shader, ShaderError, ShaderProgramSource, ShaderStage};
pub use self::texture::{Texture, TextureError};
pub use self::vertex_array::VertexArray;
