//! Program activation and parameters

use super::Context;
use crate::driver::Driver;
use crate::parameter::{ParameterData, ParameterScope, ProgramParameter};
use crate::state::{bits, MAX_UNIFORM_BUFFERS};
use keel_core::handle::same;
use keel_core::resource::{BufferRef, ProgramRef, ShaderStage};
use keel_core::Resource;

impl<D: Driver> Context<D> {
    /// Make `program` current. Its subroutine selections start over.
    pub fn apply_program(&mut self, program: Option<&ProgramRef>) {
        tracing::trace!(program = ?program.map(|p| p.label()), "use program");
        self.driver.use_program(program.map(|p| &**p));
        self.mirror.program.switch_program(program);
        self.note("program.applied");
    }

    pub fn checked_program(&mut self, program: Option<&ProgramRef>) -> bool {
        if same(self.mirror.program.current.as_ref(), program) {
            self.note("program.skipped");
            return false;
        }
        self.apply_program(program);
        true
    }

    /// Run each parameter's update function on its data, in order, then
    /// upload subroutine selections once if any changed.
    ///
    /// `program` must be the current program.
    pub fn apply_program_parameters(
        &mut self,
        program: &ProgramRef,
        params: &[&ProgramParameter],
        data: &[ParameterData<'_>],
    ) {
        debug_assert!(
            same(self.mirror.program.current.as_ref(), Some(program)),
            "parameters applied to {} while it is not the current program",
            program.label()
        );
        debug_assert_eq!(params.len(), data.len(), "one data entry per parameter");

        let mut scope = ParameterScope {
            driver: &mut self.driver,
            state: &mut self.mirror.program,
            program,
        };
        for (param, data) in params.iter().zip(data) {
            (param.update)(param, &mut scope, data);
        }

        if self.mirror.program.dirty_subroutines {
            self.update_program_subroutines(program);
        }
    }

    /// Upload the selections of every stage whose subroutines changed.
    pub fn update_program_subroutines(&mut self, program: &ProgramRef) {
        let stages = self.mirror.program.take_dirty_stages();
        if stages == 0 {
            return;
        }
        for stage in bits(stages).map(|i| ShaderStage::ALL[i]) {
            let selections = &self.mirror.program.subroutines[stage.index()];
            tracing::trace!(program = program.label(), ?stage, "upload subroutines");
            self.driver.upload_subroutines(program, stage, selections);
        }
        self.note("subroutines.applied");
    }

    /// Overwrite uniform buffer slot `idx`. Returns true if it changed; the
    /// caller binds the buffer.
    pub fn set_program_buffer(&mut self, idx: usize, buffer: Option<&BufferRef>) -> bool {
        self.mirror.program.set_uniform_buffer(idx, buffer)
    }

    /// Unbind the program and every uniform buffer slot.
    pub fn clear_program_state(&mut self) {
        tracing::debug!("clear program state");
        if self.mirror.program.current.is_some() {
            self.apply_program(None);
        }
        for slot in 0..MAX_UNIFORM_BUFFERS {
            if self.mirror.program.set_uniform_buffer(slot, None) {
                self.driver.bind_uniform_buffer(slot, None);
            }
        }
        self.mirror.program = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::recording;
    use crate::driver::DriverCall;
    use crate::parameter::{ParameterData, ProgramParameter};
    use keel_core::resource::{Buffer, BufferUsage, Program, ShaderStage};
    use keel_core::Resource;

    fn lit_program() -> keel_core::resource::ProgramRef {
        let mut counts = [0; ShaderStage::COUNT];
        counts[ShaderStage::Fragment.index()] = 2;
        Program::with_subroutines("lit", counts)
    }

    #[test]
    fn clean_subroutines_upload_nothing() {
        let mut ctx = recording(8);
        let prog = lit_program();
        ctx.apply_program(Some(&prog));
        ctx.update_program_subroutines(&prog);
        ctx.driver_mut().clear();
        ctx.reset_stats();

        ctx.update_program_subroutines(&prog);
        assert!(ctx.driver().is_empty());
        assert_eq!(ctx.stats().get("subroutines.applied"), 0);
    }

    #[test]
    fn checked_program_switches_by_identity() {
        let mut ctx = recording(8);
        let a = Program::new("a");
        assert!(ctx.checked_program(Some(&a)));
        assert!(!ctx.checked_program(Some(&a)));
        assert!(ctx.checked_program(Some(&Program::new("a"))));
        assert!(ctx.check_states());
    }

    #[test]
    fn parameters_run_in_order_and_upload_subroutines_once() {
        let mut ctx = recording(8);
        let prog = lit_program();
        ctx.apply_program(Some(&prog));
        ctx.update_program_subroutines(&prog);
        ctx.driver_mut().clear();

        let tint = ProgramParameter::uniform("tint", 3);
        let lights = ProgramParameter::buffer("lights", 1);
        let shade = ProgramParameter::subroutine("shade", ShaderStage::Fragment, 0);
        let filter = ProgramParameter::subroutine("filter", ShaderStage::Fragment, 1);
        let ubo = Buffer::new("lights", BufferUsage::UNIFORM, 1024);
        let color = [1.0f32, 0.0, 0.0, 1.0];

        ctx.apply_program_parameters(
            &prog,
            &[&tint, &lights, &shade, &filter],
            &[
                ParameterData::values(&color),
                ParameterData::Buffer(Some(&ubo)),
                ParameterData::Subroutine(2),
                ParameterData::Subroutine(5),
            ],
        );

        let calls = ctx.driver().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], DriverCall::UploadUniform { program: prog.id(), location: 3, len: 16 });
        assert_eq!(calls[1], DriverCall::BindUniformBuffer { slot: 1, buffer: Some(ubo.id()) });
        assert_eq!(
            calls[2],
            DriverCall::UploadSubroutines {
                program: prog.id(),
                stage: ShaderStage::Fragment,
                selections: vec![2, 5],
            }
        );
        assert!(!ctx.mirror().program().dirty_subroutines());
    }

    #[test]
    fn unchanged_buffer_and_subroutine_skip_the_driver() {
        let mut ctx = recording(8);
        let prog = lit_program();
        ctx.checked_program(Some(&prog));
        ctx.update_program_subroutines(&prog);

        let lights = ProgramParameter::buffer("lights", 0);
        let shade = ProgramParameter::subroutine("shade", ShaderStage::Fragment, 0);
        let ubo = Buffer::new("lights", BufferUsage::UNIFORM, 1024);
        let data = [ParameterData::Buffer(Some(&ubo)), ParameterData::Subroutine(0)];

        ctx.apply_program_parameters(&prog, &[&lights, &shade], &data);
        ctx.driver_mut().clear();
        ctx.apply_program_parameters(&prog, &[&lights, &shade], &data);
        assert!(ctx.driver().is_empty());
    }

    #[test]
    fn program_buffer_slot_reports_change() {
        let mut ctx = recording(8);
        let ubo = Buffer::new("u", BufferUsage::UNIFORM, 64);
        assert!(ctx.set_program_buffer(4, Some(&ubo)));
        assert!(!ctx.set_program_buffer(4, Some(&ubo)));
        assert!(ctx.set_program_buffer(4, None));
        assert!(ctx.driver().is_empty());
    }

    #[test]
    #[should_panic(expected = "not the current program")]
    #[cfg(debug_assertions)]
    fn parameters_require_current_program() {
        let mut ctx = recording(8);
        let prog = Program::new("idle");
        ctx.apply_program_parameters(&prog, &[], &[]);
    }

    #[test]
    fn clear_unbinds_program_and_buffers() {
        let mut ctx = recording(8);
        let prog = Program::new("p");
        ctx.apply_program(Some(&prog));
        ctx.set_program_buffer(2, Some(&Buffer::new("u", BufferUsage::UNIFORM, 64)));
        ctx.driver_mut().clear();

        ctx.clear_program_state();
        assert_eq!(
            ctx.driver().calls(),
            &[
                DriverCall::UseProgram(None),
                DriverCall::BindUniformBuffer { slot: 2, buffer: None },
            ]
        );
        assert!(ctx.mirror().program().current().is_none());
        assert!(ctx.check_states());
    }
}
