//! Shader programs built from a single source file holding both stages.
//!
//! The file format is plain GLSL with two extra directive lines:
//!
//! ```text
//! #shader vertex
//! #version 330 core
//! ...
//! #shader fragment
//! #version 330 core
//! ...
//! ```
//!
//! Every line after a directive belongs to the stage it names, until the next directive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr::null;

use gl::types::*;
use glam::{Mat4, Vec4};
use thiserror::Error;

use super::bindings::{self, Binding};
use super::debug::GlError;
use super::utils::{info_log, parameter};
use crate::gl_call;

const DIRECTIVE: &str = "#shader";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage} shader source contains a nul byte")]
    NulInSource { stage: ShaderStage },
    #[error("uniform name {name:?} contains a nul byte")]
    NulInUniformName { name: String },
    #[error("failed to compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program:\n{log}")]
    Link { log: String },
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// The two stage sources split out of one shader file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShaderProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramSource {
    /// Splits `text` at `#shader` directive lines.
    ///
    /// Text before the first directive is dropped. A directive naming neither stage is consumed
    /// and leaves the current stage unchanged. A stage that never appears comes back empty. Each
    /// kept line ends with a newline, including a final line that had none.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();
        let mut stage = None;

        for line in text.split_inclusive('\n') {
            if line.contains(DIRECTIVE) {
                if line.contains("vertex") {
                    stage = Some(ShaderStage::Vertex);
                } else if line.contains("fragment") {
                    stage = Some(ShaderStage::Fragment);
                }
                continue;
            }

            let bucket = match stage {
                Some(ShaderStage::Vertex) => &mut source.vertex,
                Some(ShaderStage::Fragment) => &mut source.fragment,
                None => continue,
            };

            bucket.push_str(line);
            if !line.ends_with('\n') {
                bucket.push('\n');
            }
        }

        source
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self::parse(&text))
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// A compiled stage. Only lives until the program is linked; dropping it deletes the shader
/// object, which is also how a failed compile gets cleaned up.
struct CompiledStage {
    id: u32,
}

impl CompiledStage {
    fn compile(stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let source = CString::new(source).map_err(|_| ShaderError::NulInSource { stage })?;

        let id = gl_call!(gl::CreateShader(stage.gl_enum()))?;
        let compiled = Self { id };

        gl_call!(gl::ShaderSource(id, 1, &source.as_ptr(), null()))?;
        gl_call!(gl::CompileShader(id))?;

        let status = parameter(id, gl::COMPILE_STATUS, gl::GetShaderiv)?;
        if status == GLint::from(gl::FALSE) {
            let log = info_log(id, gl::GetShaderiv, gl::GetShaderInfoLog)?;
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(compiled)
    }
}

impl Drop for CompiledStage {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.id);
        }
    }
}

/// A linked shader program.
///
/// Uniform locations are looked up by name the first time they're set and cached for the lifetime
/// of the program. The program has to be bound before any uniform is set on it.
pub struct Shader {
    id: u32,
    path: Option<PathBuf>,
    uniform_locations: RefCell<HashMap<String, GLint>>,
}

impl Shader {
    /// Reads, compiles and links the program at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let source = ShaderProgramSource::from_file(path)?;

        let mut shader = Self::from_source(&source)?;
        shader.path = Some(path.to_owned());

        log::info!("loaded shader {} as program {}", path.display(), shader.id);
        Ok(shader)
    }

    pub fn from_source(source: &ShaderProgramSource) -> Result<Self, ShaderError> {
        let (vertex, fragment) = Self::compile_stages(source)?;

        let id = gl_call!(gl::CreateProgram())?;
        let shader = Self {
            id,
            path: None,
            uniform_locations: RefCell::new(HashMap::new()),
        };

        for stage in [&vertex, &fragment] {
            gl_call!(gl::AttachShader(id, stage.id))?;
        }

        gl_call!(gl::LinkProgram(id))?;
        let linked = parameter(id, gl::LINK_STATUS, gl::GetProgramiv)?;
        if linked == GLint::from(gl::FALSE) {
            let log = info_log(id, gl::GetProgramiv, gl::GetProgramInfoLog)?;
            return Err(ShaderError::Link { log });
        }

        // Validation depends on whatever state is bound right now, so a failure here is only
        // worth a warning.
        gl_call!(gl::ValidateProgram(id))?;
        let valid = parameter(id, gl::VALIDATE_STATUS, gl::GetProgramiv)?;
        if valid == GLint::from(gl::FALSE) {
            let log = info_log(id, gl::GetProgramiv, gl::GetProgramInfoLog)?;
            log::warn!("program {} did not validate: {}", id, log);
        }

        for stage in [&vertex, &fragment] {
            gl_call!(gl::DetachShader(id, stage.id))?;
        }

        Ok(shader)
    }

    /// Compiles both stages even when the first one fails, so every broken stage gets reported.
    /// The first failure is returned; a second one is only logged.
    fn compile_stages(
        source: &ShaderProgramSource,
    ) -> Result<(CompiledStage, CompiledStage), ShaderError> {
        let vertex = CompiledStage::compile(ShaderStage::Vertex, &source.vertex);
        let fragment = CompiledStage::compile(ShaderStage::Fragment, &source.fragment);

        match (vertex, fragment) {
            (Ok(vertex), Ok(fragment)) => Ok((vertex, fragment)),
            (Err(first), Err(second)) => {
                log::error!("{}", second);
                Err(first)
            }
            (Err(error), Ok(_)) | (Ok(_), Err(error)) => Err(error),
        }
    }

    pub fn id(&self) -> u32 { self.id }

    /// The file this program was loaded from, if any.
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    pub fn bind(&self) -> Result<(), GlError> {
        gl_call!(gl::UseProgram(self.id))?;
        bindings::record(Binding::Program(self.id));
        Ok(())
    }

    pub fn unbind(&self) -> Result<(), GlError> {
        gl_call!(gl::UseProgram(0))?;
        bindings::record(Binding::Program(0));
        Ok(())
    }

    pub fn set_uniform_1i(&self, name: &str, value: i32) -> Result<(), ShaderError> {
        let location = self.prepare_uniform("set_uniform_1i", name)?;
        gl_call!(gl::Uniform1i(location, value))?;
        Ok(())
    }

    pub fn set_uniform_1f(&self, name: &str, value: f32) -> Result<(), ShaderError> {
        let location = self.prepare_uniform("set_uniform_1f", name)?;
        gl_call!(gl::Uniform1f(location, value))?;
        Ok(())
    }

    pub fn set_uniform_4f(&self, name: &str, value: Vec4) -> Result<(), ShaderError> {
        let location = self.prepare_uniform("set_uniform_4f", name)?;
        gl_call!(gl::Uniform4f(location, value.x, value.y, value.z, value.w))?;
        Ok(())
    }

    pub fn set_uniform_mat4f(&self, name: &str, matrix: &Mat4) -> Result<(), ShaderError> {
        let location = self.prepare_uniform("set_uniform_mat4f", name)?;
        let columns = matrix.to_cols_array();
        gl_call!(gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr()))?;
        Ok(())
    }

    fn prepare_uniform(&self, operation: &'static str, name: &str) -> Result<GLint, ShaderError> {
        bindings::require(operation, Binding::Program(self.id))?;
        self.uniform_location(name)
    }

    /// Resolves `name`, caching the answer. Missing uniforms resolve to `-1`, which the driver
    /// silently ignores; they're reported once, on the first lookup.
    fn uniform_location(&self, name: &str) -> Result<GLint, ShaderError> {
        if let Some(&location) = self.uniform_locations.borrow().get(name) {
            return Ok(location);
        }

        let c_name = CString::new(name).map_err(|_| ShaderError::NulInUniformName {
            name: name.to_owned(),
        })?;
        let location = gl_call!(gl::GetUniformLocation(self.id, c_name.as_ptr()))?;
        if location == -1 {
            log::warn!("uniform '{}' does not exist in program {}", name, self.id);
        }

        self.uniform_locations
            .borrow_mut()
            .insert(name.to_owned(), location);
        Ok(location)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
        bindings::release(Binding::Program(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_both_stages() {
        let source = ShaderProgramSource::parse("#shader vertex\nA\n#shader fragment\nB\n");
        assert_eq!(source.vertex, "A\n");
        assert_eq!(source.fragment, "B\n");
    }

    #[test]
    fn missing_fragment_stage_is_empty() {
        let source = ShaderProgramSource::parse("#shader vertex\nvoid main() {}\n");
        assert_eq!(source.vertex, "void main() {}\n");
        assert_eq!(source.fragment, "");
    }

    #[test]
    fn text_before_the_first_directive_is_dropped() {
        let source = ShaderProgramSource::parse("// header\n\n#shader fragment\nB\n#shader vertex\nA\n");
        assert_eq!(source.vertex, "A\n");
        assert_eq!(source.fragment, "B\n");
    }

    #[test]
    fn lines_follow_the_most_recent_directive() {
        let text = "#shader vertex\nv1\n#shader fragment\nf1\n#shader vertex\nv2\n#shader fragment\nf2\n";
        let source = ShaderProgramSource::parse(text);
        assert_eq!(source.vertex, "v1\nv2\n");
        assert_eq!(source.fragment, "f1\nf2\n");
    }

    #[test]
    fn unknown_directive_keeps_the_current_stage() {
        let source = ShaderProgramSource::parse("#shader vertex\nA\n#shader geometry\nB\n");
        assert_eq!(source.vertex, "A\nB\n");
        assert_eq!(source.fragment, "");
    }

    #[test]
    fn final_line_without_newline_gets_one() {
        let source = ShaderProgramSource::parse("#shader fragment\nB");
        assert_eq!(source.fragment, "B\n");
    }

    #[test]
    fn reinserting_directives_reproduces_the_input() {
        let vertex = "#version 330 core\r\nlayout(location = 0) in vec4 position;\n\nvoid main() { gl_Position = position; }\n";
        let fragment = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

        let forward = format!("#shader vertex\n{}#shader fragment\n{}", vertex, fragment);
        let source = ShaderProgramSource::parse(&forward);
        assert_eq!(
            format!("#shader vertex\n{}#shader fragment\n{}", source.vertex, source.fragment),
            forward
        );

        let reversed = format!("#shader fragment\n{}#shader vertex\n{}", fragment, vertex);
        let source = ShaderProgramSource::parse(&reversed);
        assert_eq!(
            format!("#shader fragment\n{}#shader vertex\n{}", source.fragment, source.vertex),
            reversed
        );
    }

    #[test]
    fn stage_accessor_matches_fields() {
        let source = ShaderProgramSource::parse("#shader vertex\nA\n#shader fragment\nB\n");
        assert_eq!(source.stage(ShaderStage::Vertex), "A\n");
        assert_eq!(source.stage(ShaderStage::Fragment), "B\n");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = ShaderProgramSource::from_file("does/not/exist.shader").unwrap_err();
        assert!(matches!(error, ShaderError::Io { .. }));
        assert!(error.to_string().contains("does/not/exist.shader"));
    }

    #[test]
    fn bundled_shader_has_both_stages() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/Basic.shader");
        let source = ShaderProgramSource::from_file(path).unwrap();
        assert!(source.vertex.starts_with("#version 330 core"));
        assert!(source.fragment.starts_with("#version 330 core"));
        assert!(source.vertex.contains("u_MVP"));
        assert!(source.fragment.contains("u_Texture"));
    }
}
