//! Program parameters
//!
//! A parameter pairs a binding point with the function that pushes new data
//! to it. `Context::apply_program_parameters` calls those functions in the
//! order given and uploads subroutine selections once at the end.

use crate::driver::Driver;
use crate::state::ProgramState;
use bytemuck::Pod;
use keel_core::resource::{BufferRef, Program, ShaderStage};

/// Pushes `data` for `param` into the scope.
pub type ParameterFn = fn(&ProgramParameter, &mut ParameterScope<'_>, &ParameterData<'_>);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Plain uniform at a program location
    Uniform { location: u32 },
    /// Uniform buffer binding slot
    Buffer { slot: usize },
    /// Subroutine uniform `index` of `stage`
    Subroutine { stage: ShaderStage, index: usize },
}

#[derive(Clone)]
pub struct ProgramParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub update: ParameterFn,
}

impl std::fmt::Debug for ProgramParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramParameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl ProgramParameter {
    pub fn uniform(name: impl Into<String>, location: u32) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Uniform { location },
            update: update_uniform,
        }
    }

    pub fn buffer(name: impl Into<String>, slot: usize) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Buffer { slot },
            update: update_buffer,
        }
    }

    pub fn subroutine(name: impl Into<String>, stage: ShaderStage, index: usize) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Subroutine { stage, index },
            update: update_subroutine,
        }
    }

    /// Replace the update function, e.g. to convert data before uploading.
    pub fn with_update(mut self, update: ParameterFn) -> Self {
        self.update = update;
        self
    }
}

/// Data handed to a parameter's update function.
#[derive(Debug, Copy, Clone)]
pub enum ParameterData<'a> {
    Bytes(&'a [u8]),
    Buffer(Option<&'a BufferRef>),
    Subroutine(u32),
}

impl<'a> ParameterData<'a> {
    pub fn value<T: Pod>(value: &'a T) -> Self {
        ParameterData::Bytes(bytemuck::bytes_of(value))
    }

    pub fn values<T: Pod>(values: &'a [T]) -> Self {
        ParameterData::Bytes(bytemuck::cast_slice(values))
    }
}

/// What an update function may touch.
pub struct ParameterScope<'a> {
    pub driver: &'a mut dyn Driver,
    pub state: &'a mut ProgramState,
    pub program: &'a Program,
}

/// Upload bytes to a plain uniform.
pub fn update_uniform(param: &ProgramParameter, scope: &mut ParameterScope<'_>, data: &ParameterData<'_>) {
    match (param.kind, data) {
        (ParameterKind::Uniform { location }, ParameterData::Bytes(bytes)) => {
            scope.driver.upload_uniform(scope.program, location, bytes);
        }
        _ => debug_assert!(false, "parameter {} expects uniform bytes", param.name),
    }
}

/// Bind a uniform buffer, skipping the driver when the slot already holds it.
pub fn update_buffer(param: &ProgramParameter, scope: &mut ParameterScope<'_>, data: &ParameterData<'_>) {
    match (param.kind, data) {
        (ParameterKind::Buffer { slot }, &ParameterData::Buffer(buffer)) => {
            if scope.state.set_uniform_buffer(slot, buffer) {
                scope.driver.bind_uniform_buffer(slot, buffer.map(|b| &**b));
            }
        }
        _ => debug_assert!(false, "parameter {} expects a buffer", param.name),
    }
}

/// Record a subroutine selection; uploaded once all parameters ran.
pub fn update_subroutine(param: &ProgramParameter, scope: &mut ParameterScope<'_>, data: &ParameterData<'_>) {
    match (param.kind, data) {
        (ParameterKind::Subroutine { stage, index }, &ParameterData::Subroutine(value)) => {
            scope.state.set_subroutine(stage, index, value);
        }
        _ => debug_assert!(false, "parameter {} expects a subroutine selection", param.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::glam::Vec4;

    #[test]
    fn pod_values_as_bytes() {
        let color = Vec4::new(1.0, 0.5, 0.25, 1.0);
        match ParameterData::value(&color) {
            ParameterData::Bytes(bytes) => assert_eq!(bytes.len(), 16),
            other => panic!("unexpected {other:?}"),
        }
        let matrices = [[0.0f32; 16]; 3];
        match ParameterData::values(&matrices) {
            ParameterData::Bytes(bytes) => assert_eq!(bytes.len(), 3 * 64),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn constructors_pick_matching_updaters() {
        let p = ProgramParameter::buffer("lights", 2);
        assert_eq!(p.kind, ParameterKind::Buffer { slot: 2 });
        assert!(matches!(ProgramParameter::uniform("tint", 4).kind, ParameterKind::Uniform { location: 4 }));
    }
}
