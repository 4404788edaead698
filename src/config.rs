//! Command line configuration for the demo.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "glsandbox", version, about = "Draws a textured quad with raw OpenGL")]
pub struct Config {
    /// Shader file holding both stages, split by `#shader vertex` / `#shader fragment` lines
    #[arg(long, default_value = "res/shaders/Basic.shader")]
    pub shader: PathBuf,

    /// Image drawn on the quad
    #[arg(long, default_value = "res/textures/checker.png")]
    pub texture: PathBuf,

    /// Draw the quad in its flat color only
    #[arg(long)]
    pub no_texture: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 540)]
    pub height: u32,

    /// Window title
    #[arg(long, default_value = "glsandbox")]
    pub title: String,

    /// Don't wait for vertical sync when swapping buffers
    #[arg(long = "no-vsync", action = ArgAction::SetFalse)]
    pub vsync: bool,
}

impl Config {
    pub fn texture_path(&self) -> Option<&Path> {
        if self.no_texture {
            None
        } else {
            Some(&self.texture)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["glsandbox"])
    }
}
