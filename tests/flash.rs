//! `vFlashErase`/`vFlashWrite`/`vFlashDone` atomic flush through the full
//! command pipeline, including overlapping writes coalescing into one
//! buffer per erased region (spec §4.5).

use gdb_bridge::config::Config;
use gdb_bridge::error::TargetOperationError;
use gdb_bridge::handlers::{self, HandlerContext};
use gdb_bridge::protocol::command::Command;
use gdb_bridge::protocol::response::Response;
use gdb_bridge::regmap::Architecture;
use gdb_bridge::session::DebugSession;
use gdb_bridge::target_controller::{
    ExecutionState, InstalledBreakpointKind, MemoryAddress, PinState, RegisterDescriptor,
    TargetControllerService,
};

#[derive(Debug, Default)]
struct RecordingController {
    programmed: Vec<(u32, Vec<u8>)>,
    entered_programming_mode: bool,
    left_programming_mode: bool,
}

impl TargetControllerService for RecordingController {
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

#[test]
fn overlapping_writes_flush_as_one_coalesced_program_call() {
    let mut session = DebugSession::new();
    let mut controller = RecordingController::default();
    let config = Config::default();
    let mut ctx = HandlerContext {
        session: &mut session,
        controller: &mut controller,
        architecture: Architecture::RiscV32,
        config: &config,
    };

    let erase = handlers::handle(Command::parse(b"vFlashErase:00001000,00000008").unwrap(), &mut ctx);
    assert_eq!(erase, Response::Ok);

    let first_write = handlers::handle(
        Command::parse(b"vFlashWrite:00001000:\x01\x02\x03\x04").unwrap(),
        &mut ctx,
    );
    assert_eq!(first_write, Response::Ok);

    // Overlapping re-write of the tail two bytes; the later write should win
    // on the overlap while the untouched byte 2 stays from the first write.
    let second_write = handlers::handle(
        Command::parse(b"vFlashWrite:00001002:\xaa\xbb").unwrap(),
        &mut ctx,
    );
    assert_eq!(second_write, Response::Ok);

    let done = handlers::handle(Command::parse(b"vFlashDone").unwrap(), &mut ctx);
    assert_eq!(done, Response::Ok);

    assert!(controller.entered_programming_mode);
    assert!(controller.left_programming_mode);
    assert_eq!(controller.programmed.len(), 1);
    assert_eq!(
        controller.programmed[0],
        (0x1000, vec![0x01, 0x02, 0xaa, 0xbb, 0x00, 0x00, 0x00, 0x00])
    );
    assert!(session.flash_session.is_none());
}
