//! Interrupt-during-resume through the full pipeline: a `c` command arms
//! `waiting_for_stop`, a bare interrupt byte is deferred rather than
//! halting immediately, and the bridge turns the next "still running"
//! event into the owed `SIGNAL_INTERRUPT` stop-reply (spec §4.6).

use std::sync::mpsc;

use gdb_bridge::bridge::TargetStateBridge;
use gdb_bridge::config::Config;
use gdb_bridge::error::TargetOperationError;
use gdb_bridge::handlers::{self, HandlerContext};
use gdb_bridge::protocol::command::Command;
use gdb_bridge::protocol::response::{Response, SIGNAL_INTERRUPT};
use gdb_bridge::regmap::Architecture;
use gdb_bridge::session::DebugSession;
use gdb_bridge::target_controller::{
    ExecutionState, ExecutionStateChange, InstalledBreakpointKind, MemoryAddress, PinState,
    RegisterDescriptor, TargetControllerService,
};

#[derive(Debug, Default)]
struct RunningController {
    halted: bool,
    resumed: bool,
}

impl TargetControllerService for RunningController {
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
        Ok(())
    }
    fn halt(&mut self) -> Result<(), TargetOperationError> {
        self.halted = true;
        Ok(())
    }
    fn resume(&mut self, _: Option<u32>) -> Result<(), TargetOperationError> {
        self.resumed = true;
        Ok(())
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
        unimplemented!()
    }
    fn leave_programming_mode(&mut self) -> Result<(), TargetOperationError> {
        unimplemented!()
    }
    fn program_flash(&mut self, _: u32, _: &[u8]) -> Result<(), TargetOperationError> {
        unimplemented!()
    }
}

#[test]
fn interrupt_arriving_mid_resume_is_deferred_then_delivered_on_next_poll() {
    let mut session = DebugSession::new();
    let mut controller = RunningController::default();
    let config = Config::default();

    {
        let mut ctx = HandlerContext {
            session: &mut session,
            controller: &mut controller,
            architecture: Architecture::RiscV32,
            config: &config,
        };

        let continue_reply = handlers::handle(Command::parse(b"c").unwrap(), &mut ctx);
        assert_eq!(continue_reply, Response::None);
        assert!(ctx.session.waiting_for_stop);

        let interrupt_reply = handlers::handle_interrupt(&mut ctx);
        assert_eq!(interrupt_reply, Response::None);
        assert!(ctx.session.pending_interrupt);
    }
    assert!(controller.resumed);
    assert!(!controller.halted);

    let (_tx, rx) = mpsc::channel();
    let bridge = TargetStateBridge::new(rx);
    let response = bridge.handle_change(
        ExecutionStateChange {
            new_state: ExecutionState::Running,
        },
        &mut session,
        &mut controller,
    );

    assert_eq!(
        response,
        Some(Response::StopReply {
            signal: SIGNAL_INTERRUPT,
            thread_id: 0,
        })
    );
    assert!(controller.halted);
    assert!(!session.pending_interrupt);
    assert!(!session.waiting_for_stop);
}
