//! Tracks what is currently bound on the GL context.
//!
//! Binding points are global state of the context and no single wrapper owns them. Rather than rely
//! on call order alone, every wrapper records the transitions it makes here, and operations that
//! depend on a binding check for it up front with [`require`]. Legal transitions:
//!
//! * bind an array buffer, element buffer, vertex array or program (id `0` unbinds),
//! * bind a texture to a texture unit, which also makes that unit active,
//! * release an object when it is deleted, which clears every slot holding it.
//!
//! Element buffer bindings are part of vertex array state, so binding a vertex array restores the
//! element buffer last bound while it was current.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use parking_lot::Mutex;

use super::debug::GlError;

lazy_static! {
    static ref CURRENT: Mutex<BindingState> = Mutex::new(BindingState::default());
}

/// A single binding point together with the object bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    ArrayBuffer(u32),
    ElementBuffer(u32),
    VertexArray(u32),
    Program(u32),
    Texture { unit: u32, id: u32 },
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::ArrayBuffer(id) => write!(f, "array buffer {}", id),
            Binding::ElementBuffer(id) => write!(f, "element buffer {}", id),
            Binding::VertexArray(id) => write!(f, "vertex array {}", id),
            Binding::Program(id) => write!(f, "program {}", id),
            Binding::Texture { unit, id } => write!(f, "texture {} on unit {}", id, unit),
        }
    }
}

/// Snapshot of the context's binding points.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BindingState {
    array_buffer: u32,
    vertex_array: u32,
    program: u32,
    active_unit: u32,
    element_buffers: HashMap<u32, u32>,
    textures: HashMap<u32, u32>,
}

impl BindingState {
    pub fn array_buffer(&self) -> u32 { self.array_buffer }

    pub fn vertex_array(&self) -> u32 { self.vertex_array }

    pub fn program(&self) -> u32 { self.program }

    pub fn active_unit(&self) -> u32 { self.active_unit }

    pub fn element_buffer(&self) -> u32 {
        self.element_buffers
            .get(&self.vertex_array)
            .copied()
            .unwrap_or(0)
    }

    pub fn texture(&self, unit: u32) -> u32 {
        self.textures.get(&unit).copied().unwrap_or(0)
    }

    pub fn bind(&mut self, binding: Binding) {
        match binding {
            Binding::ArrayBuffer(id) => self.array_buffer = id,
            Binding::ElementBuffer(id) => {
                self.element_buffers.insert(self.vertex_array, id);
            }
            Binding::VertexArray(id) => self.vertex_array = id,
            Binding::Program(id) => self.program = id,
            Binding::Texture { unit, id } => {
                self.active_unit = unit;
                self.textures.insert(unit, id);
            }
        }
    }

    /// Records the deletion of the object named by `binding`. Only the id and kind matter; the
    /// texture unit is ignored because a deleted texture is unbound from every unit.
    pub fn release(&mut self, binding: Binding) {
        match binding {
            Binding::ArrayBuffer(id) | Binding::ElementBuffer(id) => {
                if self.array_buffer == id {
                    self.array_buffer = 0;
                }
                if let Some(bound) = self.element_buffers.get_mut(&self.vertex_array) {
                    if *bound == id {
                        *bound = 0;
                    }
                }
            }
            Binding::VertexArray(id) => {
                self.element_buffers.remove(&id);
                if self.vertex_array == id {
                    self.vertex_array = 0;
                }
            }
            Binding::Program(id) => {
                if self.program == id {
                    self.program = 0;
                }
            }
            Binding::Texture { id, .. } => {
                for bound in self.textures.values_mut() {
                    if *bound == id {
                        *bound = 0;
                    }
                }
            }
        }
    }

    pub fn is_bound(&self, binding: Binding) -> bool {
        match binding {
            Binding::ArrayBuffer(id) => self.array_buffer == id,
            Binding::ElementBuffer(id) => self.element_buffer() == id,
            Binding::VertexArray(id) => self.vertex_array == id,
            Binding::Program(id) => self.program == id,
            Binding::Texture { unit, id } => self.texture(unit) == id,
        }
    }

    pub fn require(&self, operation: &'static str, binding: Binding) -> Result<(), GlError> {
        if self.is_bound(binding) {
            Ok(())
        } else {
            Err(GlError::NotBound { operation, required: binding })
        }
    }
}

/// Records a transition made on the current context.
pub fn record(binding: Binding) {
    log::trace!("bind {}", binding);
    CURRENT.lock().bind(binding);
}

/// Records the deletion of an object on the current context.
pub fn release(binding: Binding) {
    CURRENT.lock().release(binding);
}

/// Fails with [`GlError::NotBound`] unless `binding` is current.
pub fn require(operation: &'static str, binding: Binding) -> Result<(), GlError> {
    CURRENT.lock().require(operation, binding)
}

pub fn active_unit() -> u32 {
    CURRENT.lock().active_unit()
}

pub fn snapshot() -> BindingState {
    CURRENT.lock().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_nothing_bound() {
        let state = BindingState::default();
        assert_eq!(state.array_buffer(), 0);
        assert_eq!(state.element_buffer(), 0);
        assert_eq!(state.vertex_array(), 0);
        assert_eq!(state.program(), 0);
        assert_eq!(state.texture(0), 0);
    }

    #[test]
    fn binding_zero_unbinds() {
        let mut state = BindingState::default();
        state.bind(Binding::Program(4));
        assert!(state.is_bound(Binding::Program(4)));

        state.bind(Binding::Program(0));
        assert!(!state.is_bound(Binding::Program(4)));
        assert_eq!(state.program(), 0);
    }

    #[test]
    fn element_buffer_follows_vertex_array() {
        let mut state = BindingState::default();
        state.bind(Binding::VertexArray(1));
        state.bind(Binding::ElementBuffer(10));
        state.bind(Binding::VertexArray(2));
        assert_eq!(state.element_buffer(), 0);

        state.bind(Binding::ElementBuffer(20));
        state.bind(Binding::VertexArray(1));
        assert_eq!(state.element_buffer(), 10);
        assert!(state.is_bound(Binding::ElementBuffer(10)));
    }

    #[test]
    fn texture_binding_activates_its_unit() {
        let mut state = BindingState::default();
        state.bind(Binding::Texture { unit: 3, id: 7 });
        assert_eq!(state.active_unit(), 3);
        assert_eq!(state.texture(3), 7);
        assert_eq!(state.texture(0), 0);
    }

    #[test]
    fn released_objects_are_no_longer_bound() {
        let mut state = BindingState::default();
        state.bind(Binding::VertexArray(1));
        state.bind(Binding::ArrayBuffer(5));
        state.bind(Binding::ElementBuffer(6));
        state.bind(Binding::Program(9));
        state.bind(Binding::Texture { unit: 0, id: 2 });
        state.bind(Binding::Texture { unit: 1, id: 2 });

        state.release(Binding::ArrayBuffer(5));
        state.release(Binding::ElementBuffer(6));
        state.release(Binding::Program(9));
        state.release(Binding::Texture { unit: 0, id: 2 });

        assert_eq!(state.array_buffer(), 0);
        assert_eq!(state.element_buffer(), 0);
        assert_eq!(state.program(), 0);
        assert_eq!(state.texture(0), 0);
        assert_eq!(state.texture(1), 0);
        assert_eq!(state.vertex_array(), 1);
    }

    #[test]
    fn releasing_an_unbound_object_leaves_state_alone() {
        let mut state = BindingState::default();
        state.bind(Binding::Program(9));
        state.release(Binding::Program(8));
        assert_eq!(state.program(), 9);
    }

    #[test]
    fn releasing_a_vertex_array_forgets_its_element_buffer() {
        let mut state = BindingState::default();
        state.bind(Binding::VertexArray(1));
        state.bind(Binding::ElementBuffer(10));
        state.release(Binding::VertexArray(1));
        assert_eq!(state.vertex_array(), 0);

        state.bind(Binding::VertexArray(1));
        assert_eq!(state.element_buffer(), 0);
    }

    #[test]
    fn require_reports_the_missing_binding() {
        let mut state = BindingState::default();
        state.bind(Binding::Program(1));

        assert!(state.require("draw", Binding::Program(1)).is_ok());
        match state.require("draw", Binding::VertexArray(2)) {
            Err(GlError::NotBound { operation, required }) => {
                assert_eq!(operation, "draw");
                assert_eq!(required, Binding::VertexArray(2));
            }
            other => panic!("expected NotBound, got {:?}", other),
        }
    }
}
