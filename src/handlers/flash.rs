//! `vFlashErase`/`vFlashWrite`/`vFlashDone` handlers: accumulate into the
//! session's [`FlashSession`] and flush atomically on `vFlashDone` (spec
//! §4.5).

use crate::error::CoreError;
use crate::protocol::response::Response;
use crate::session::FlashSession;

use super::HandlerContext;

fn error_response(err: crate::error::TargetOperationError) -> Response {
    Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code())
}

pub fn erase(ctx: &mut HandlerContext<'_>, address: u32, length: u32) -> Response {
    ctx.session
        .flash_session
        .get_or_insert_with(FlashSession::new)
        .record_erase(address, length);
    Response::Ok
}

pub fn write(ctx: &mut HandlerContext<'_>, address: u32, data: &[u8]) -> Response {
    ctx.session
        .flash_session
        .get_or_insert_with(FlashSession::new)
        .record_write(address, data.to_vec());
    Response::Ok
}

/// Flushes the accumulated session to the target as one program/verify
/// cycle per erased region, then leaves programming mode regardless of
/// whether the program succeeded.
pub fn done(ctx: &mut HandlerContext<'_>) -> Response {
    let Some(session) = ctx.session.flash_session.take() else {
        return Response::Ok;
    };

    if let Err(err) = ctx.controller.enter_programming_mode() {
        return error_response(err);
    }

    let mut result = Ok(());
    for (address, bytes) in session.flatten() {
        if let Err(err) = ctx.controller.program_flash(address, &bytes) {
            result = Err(err);
            break;
        }
    }

    if let Err(leave_err) = ctx.controller.leave_programming_mode() {
        if result.is_ok() {
            result = Err(leave_err);
        }
    }

    match result {
        Ok(()) => Response::Ok,
        Err(err) => error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::TargetOperationError;
    use crate::regmap::Architecture;
    use crate::session::DebugSession;
    use crate::target_controller::{
        ExecutionState, InstalledBreakpointKind, MemoryAddress, PinState, RegisterDescriptor,
        TargetControllerService,
    };

    #[derive(Debug, Default)]
    struct StubController {
        programmed: Vec<(u32, Vec<u8>)>,
        entered_programming_mode: bool,
        left_programming_mode: bool,
    }

    impl TargetControllerService for StubController {
        fn read_cpu_register(&mut self, _: &RegisterDescriptor) -> Result<Vec<u8>, TargetOperationError> {
            unimplemented!()
        }
        fn write_cpu_register(&mut self, _: &RegisterDescriptor, _: &[u8]) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn read_memory(&mut self, _: MemoryAddress, _: u32, _: &[(u32, u32)]) -> Result<Vec<u8>, TargetOperationError> {
            unimplemented!()
        }
        fn write_memory(&mut self, _: MemoryAddress, _: &[u8]) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn set_breakpoint(&mut self, _: MemoryAddress, _: u32) -> Result<InstalledBreakpointKind, TargetOperationError> {
            unimplemented!()
        }
        fn clear_breakpoint(&mut self, _: MemoryAddress) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn halt(&mut self) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn resume(&mut self, _: Option<u32>) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn step(&mut self, _: Option<u32>) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn reset(&mut self) -> Result<(), TargetOperationError> {
            unimplemented!()
        }
        fn get_state(&mut self) -> Result<ExecutionState, TargetOperationError> {
            unimplemented!()
        }
        fn get_pin_states(&mut self) -> Result<Vec<PinState>, TargetOperationError> {
            unimplemented!()
        }
        fn enter_programming_mode(&mut self) -> Result<(), TargetOperationError> {
            self.entered_programming_mode = true;
            Ok(())
        }
        fn leave_programming_mode(&mut self) -> Result<(), TargetOperationError> {
            self.left_programming_mode = true;
            Ok(())
        }
        fn program_flash(&mut self, address: u32, bytes: &[u8]) -> Result<(), TargetOperationError> {
            self.programmed.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    fn harness(session: &mut DebugSession, controller: &mut StubController, config: &Config) -> HandlerContext<'_> {
        HandlerContext {
            session,
            controller,
            architecture: Architecture::RiscV32,
            config,
        }
    }

    #[test]
    fn erase_write_done_issues_one_program_call() {
        let mut session = DebugSession::new();
        let mut controller = StubController::default();
        let config = Config::default();

        {
            let mut ctx = harness(&mut session, &mut controller, &config);
            erase(&mut ctx, 0x1000, 8);
            write(&mut ctx, 0x1000, &[1, 2, 3, 4]);
            let response = done(&mut ctx);
            assert_eq!(response, Response::Ok);
        }

        assert!(controller.entered_programming_mode);
        assert!(controller.left_programming_mode);
        assert_eq!(controller.programmed.len(), 1);
        assert_eq!(controller.programmed[0].0, 0x1000);
        assert_eq!(controller.programmed[0].1, vec![1, 2, 3, 4, 0, 0, 0, 0]);
        assert!(session.flash_session.is_none());
    }

    #[test]
    fn done_without_erase_is_a_no_op() {
        let mut session = DebugSession::new();
        let mut controller = StubController::default();
        let config = Config::default();
        let mut ctx = harness(&mut session, &mut controller, &config);

        assert_eq!(done(&mut ctx), Response::Ok);
        assert!(!controller.entered_programming_mode);
    }
}
