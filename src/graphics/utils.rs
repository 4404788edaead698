use gl::types::*;

use super::debug::GlError;
use crate::gl_call;

/// Signature shared by `gl::GetShaderiv` and `gl::GetProgramiv`.
pub type GetParameter = unsafe fn(GLuint, GLenum, *mut GLint);

/// Signature shared by `gl::GetShaderInfoLog` and `gl::GetProgramInfoLog`.
pub type GetInfoLog = unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar);

/// Reads a single integer parameter of a shader or program object.
pub fn parameter(id: GLuint, pname: GLenum, get: GetParameter) -> Result<GLint, GlError> {
    let mut value: GLint = 0;
    gl_call!(get(id, pname, &mut value))?;
    Ok(value)
}

/// Fetches the info log of a shader or program object, trimmed of the trailing nul and whitespace.
pub fn info_log(id: GLuint, get: GetParameter, get_log: GetInfoLog) -> Result<String, GlError> {
    let len = parameter(id, gl::INFO_LOG_LENGTH, get)?;
    if len <= 0 {
        return Ok(String::new());
    }

    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    gl_call!(get_log(id, len, &mut written, buf.as_mut_ptr() as *mut GLchar))?;
    buf.truncate(written.max(0) as usize);

    Ok(log_text(&buf))
}

fn log_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_owned()
}
