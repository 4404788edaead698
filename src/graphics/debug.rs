//! Error checking around raw OpenGL calls.
//!
//! OpenGL reports errors through a queue that is polled with `glGetError`, and an error code in the
//! queue may have been raised by *any* earlier call. So checking a single call takes two steps:
//! drain whatever is already pending, make the call, then poll the queue again. Anything found the
//! second time belongs to the call we just made.
//!
//! Every driver call in this crate goes through [`gl_call!`](crate::gl_call), which records the
//! call text, file and line so the report points at the offending line. Checking only happens in
//! debug builds; release builds run the call and move on.

use std::fmt;

use gl::types::GLenum;
use thiserror::Error;

use super::bindings::Binding;

/// Upper bound on codes collected per poll. A lost context can keep reporting errors, and we don't
/// want to spin on it.
const MAX_PENDING_ERRORS: usize = 32;

/// A decoded `glGetError` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    StackOverflow,
    StackUnderflow,
    OutOfMemory,
    InvalidFramebufferOperation,
    Unknown(GLenum),
}

impl ErrorCode {
    /// Decodes a raw code, returning `None` for `GL_NO_ERROR`.
    pub fn from_raw(code: GLenum) -> Option<Self> {
        let code = match code {
            gl::NO_ERROR => return None,
            gl::INVALID_ENUM => ErrorCode::InvalidEnum,
            gl::INVALID_VALUE => ErrorCode::InvalidValue,
            gl::INVALID_OPERATION => ErrorCode::InvalidOperation,
            gl::STACK_OVERFLOW => ErrorCode::StackOverflow,
            gl::STACK_UNDERFLOW => ErrorCode::StackUnderflow,
            gl::OUT_OF_MEMORY => ErrorCode::OutOfMemory,
            gl::INVALID_FRAMEBUFFER_OPERATION => ErrorCode::InvalidFramebufferOperation,
            other => ErrorCode::Unknown(other),
        };

        Some(code)
    }

    pub fn raw(self) -> GLenum {
        match self {
            ErrorCode::InvalidEnum => gl::INVALID_ENUM,
            ErrorCode::InvalidValue => gl::INVALID_VALUE,
            ErrorCode::InvalidOperation => gl::INVALID_OPERATION,
            ErrorCode::StackOverflow => gl::STACK_OVERFLOW,
            ErrorCode::StackUnderflow => gl::STACK_UNDERFLOW,
            ErrorCode::OutOfMemory => gl::OUT_OF_MEMORY,
            ErrorCode::InvalidFramebufferOperation => gl::INVALID_FRAMEBUFFER_OPERATION,
            ErrorCode::Unknown(code) => code,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ErrorCode::InvalidEnum => "GL_INVALID_ENUM",
            ErrorCode::InvalidValue => "GL_INVALID_VALUE",
            ErrorCode::InvalidOperation => "GL_INVALID_OPERATION",
            ErrorCode::StackOverflow => "GL_STACK_OVERFLOW",
            ErrorCode::StackUnderflow => "GL_STACK_UNDERFLOW",
            ErrorCode::OutOfMemory => "GL_OUT_OF_MEMORY",
            ErrorCode::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            ErrorCode::Unknown(_) => "unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.raw())
    }
}

/// Errors raised by the driver, or by calling into it without the required state bound.
#[derive(Debug, Error)]
pub enum GlError {
    #[error("{call} failed at {file}:{line}: {}", join_codes(.codes))]
    Call {
        call: &'static str,
        file: &'static str,
        line: u32,
        codes: Vec<ErrorCode>,
    },
    #[error("{operation} requires {required} to be bound")]
    NotBound {
        operation: &'static str,
        required: Binding,
    },
}

fn join_codes(codes: &[ErrorCode]) -> String {
    codes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Discards every error currently in the queue.
pub fn clear_errors() {
    drain_errors();
}

/// Collects every error currently in the queue, oldest first.
pub fn drain_errors() -> Vec<ErrorCode> {
    let mut codes = Vec::new();
    while codes.len() < MAX_PENDING_ERRORS {
        match ErrorCode::from_raw(unsafe { gl::GetError() }) {
            Some(code) => codes.push(code),
            None => break,
        }
    }

    codes
}

/// Runs `call` between a drain and a poll of the error queue. Use [`gl_call!`](crate::gl_call)
/// rather than calling this directly.
pub fn checked<T>(
    call: &'static str,
    file: &'static str,
    line: u32,
    f: impl FnOnce() -> T,
) -> Result<T, GlError> {
    if !cfg!(debug_assertions) {
        return Ok(f());
    }

    clear_errors();
    let value = f();
    let codes = drain_errors();

    if codes.is_empty() {
        Ok(value)
    } else {
        let error = GlError::Call { call, file, line, codes };
        log::debug!("{}", error);
        Err(error)
    }
}

/// Wraps a raw `gl::*` call in the drain-before / inspect-after check, evaluating to
/// `Result<T, GlError>` where `T` is the call's return type.
///
/// ```ignore
/// let mut id = 0;
/// gl_call!(gl::GenBuffers(1, &mut id))?;
/// ```
#[macro_export]
macro_rules! gl_call {
    ($call:expr) => {
        $crate::graphics::debug::checked(stringify!($call), file!(), line!(), || unsafe { $call })
    };
}
