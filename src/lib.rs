//! Safe wrappers around raw OpenGL handles, and a small demo that draws a textured quad with them.

pub mod app;
pub mod config;
pub mod error;
pub mod graphics;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
