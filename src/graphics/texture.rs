use std::ffi::c_void;
use std::path::{Path, PathBuf};

use gl::types::*;
use image::RgbaImage;
use thiserror::Error;

use super::bindings::{self, Binding};
use super::debug::GlError;
use crate::gl_call;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image is too large to upload ({width}x{height})")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// "Texture" is the OpenGL term for an image passed to the graphics pipeline. In the fragment
/// shader (which specifies the colors of the pixels, or "fragments"), a texture can be sampled and
/// its pixel data applied to the pixels in the pipeline.
///
/// Only the GPU copy is kept; the decoded pixels are freed once uploaded.
pub struct Texture {
    id: u32,
    path: Option<PathBuf>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Decodes the image at `path` with [`decode`] and uploads it.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let pixels = decode(path)?;

        let mut texture = Self::from_image(&pixels)?;
        texture.path = Some(path.to_owned());

        log::info!(
            "loaded texture {} ({}x{}) as {}",
            path.display(),
            texture.width,
            texture.height,
            texture.id
        );
        Ok(texture)
    }

    /// Uploads already decoded pixels as-is, bottom row first.
    pub fn from_image(pixels: &RgbaImage) -> Result<Self, TextureError> {
        let (width, height) = pixels.dimensions();
        let too_large = || TextureError::TooLarge { width, height };
        let gl_width = GLsizei::try_from(width).map_err(|_| too_large())?;
        let gl_height = GLsizei::try_from(height).map_err(|_| too_large())?;

        let mut id = 0u32;
        gl_call!(gl::GenTextures(1, &mut id))?;
        let texture = Self { id, path: None, width, height };

        let unit = bindings::active_unit();
        texture.bind(unit)?;

        gl_call!(gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint))?;
        gl_call!(gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint))?;
        gl_call!(gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint))?;
        gl_call!(gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint))?;

        gl_call!(gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            gl::RGBA8 as GLint,
            gl_width,
            gl_height,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            pixels.as_ptr() as *const c_void
        ))?;

        texture.unbind()?;
        Ok(texture)
    }

    pub fn id(&self) -> u32 { self.id }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Makes `slot` the active texture unit and binds this texture to it.
    pub fn bind(&self, slot: u32) -> Result<(), GlError> {
        gl_call!(gl::ActiveTexture(gl::TEXTURE0 + slot))?;
        gl_call!(gl::BindTexture(gl::TEXTURE_2D, self.id))?;
        bindings::record(Binding::Texture { unit: slot, id: self.id });
        Ok(())
    }

    /// Clears the 2D binding of the active texture unit.
    pub fn unbind(&self) -> Result<(), GlError> {
        gl_call!(gl::BindTexture(gl::TEXTURE_2D, 0))?;
        bindings::record(Binding::Texture { unit: bindings::active_unit(), id: 0 });
        Ok(())
    }
}

/// Decodes the image at `path` to RGBA8, bottom row first. Image files store their top row first
/// while OpenGL expects the bottom row first, so the pixels are flipped.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<RgbaImage, TextureError> {
    let path = path.as_ref();
    let pixels = image::open(path)
        .map_err(|source| TextureError::Decode {
            path: path.to_owned(),
            source,
        })?
        .flipv()
        .into_rgba8();

    Ok(pixels)
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &self.id);
        }
        bindings::release(Binding::Texture { unit: 0, id: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn decode_puts_the_bottom_row_first() {
        let path = std::env::temp_dir().join(format!("glsandbox-flip-{}.png", std::process::id()));
        let mut file_pixels = RgbaImage::new(1, 2);
        file_pixels.put_pixel(0, 0, RED);
        file_pixels.put_pixel(0, 1, BLUE);
        file_pixels.save(&path).unwrap();

        let decoded = decode(&path);
        let _ = std::fs::remove_file(&path);
        let decoded = decoded.unwrap();

        assert_eq!(decoded.dimensions(), (1, 2));
        assert_eq!(*decoded.get_pixel(0, 0), BLUE);
        assert_eq!(*decoded.get_pixel(0, 1), RED);
    }

    #[test]
    fn decode_reads_the_bundled_texture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/res/textures/checker.png");
        let decoded = decode(path).unwrap();
        assert_eq!(decoded.dimensions(), (64, 64));
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        match Texture::new("does/not/exist.png") {
            Err(TextureError::Decode { path, .. }) => {
                assert_eq!(path, PathBuf::from("does/not/exist.png"));
            }
            Err(other) => panic!("expected a decode error, got {}", other),
            Ok(_) => panic!("expected a decode error"),
        }
    }
}
