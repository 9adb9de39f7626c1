//! `qSupported` negotiation round-trip through the full command pipeline:
//! wire bytes in, handler dispatch, rendered reply text out.

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
struct NullController;

impl TargetControllerService for NullController {
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
        unimplemented!()
    }
    fn leave_programming_mode(&mut self) -> Result<(), TargetOperationError> {
        unimplemented!()
    }
    fn program_flash(&mut self, _: u32, _: &[u8]) -> Result<(), TargetOperationError> {
        unimplemented!()
    }
}

fn dispatch_wire(body: &[u8], ctx: &mut HandlerContext<'_>) -> Response {
    let command = Command::parse(body).expect("packet body should parse");
    handlers::handle(command, ctx)
}

#[test]
fn client_offering_hwbreak_negotiates_server_feature_set() {
    let mut session = DebugSession::new();
    let mut controller = NullController;
    let config = Config::default();
    let mut ctx = HandlerContext {
        session: &mut session,
        controller: &mut controller,
        architecture: Architecture::RiscV32,
        config: &config,
    };

    let response = dispatch_wire(b"qSupported:hwbreak+;swbreak+;QStartNoAckMode+", &mut ctx);
    let Response::Text(text) = response else {
        panic!("expected a text reply, got {response:?}");
    };

    assert!(text.contains("swbreak+"));
    assert!(text.contains("hwbreak+"));
    assert!(text.contains("qXfer:memory-map:read+"));
    assert!(text.contains("vContSupported+"));
    assert!(text.contains("QStartNoAckMode+"));
    assert_eq!(ctx.session.negotiated_features.len(), 3);
}

#[test]
fn client_offering_neither_breakpoint_kind_is_rejected() {
    let mut session = DebugSession::new();
    let mut controller = NullController;
    let config = Config::default();
    let mut ctx = HandlerContext {
        session: &mut session,
        controller: &mut controller,
        architecture: Architecture::RiscV32,
        config: &config,
    };

    let response = dispatch_wire(b"qSupported:QStartNoAckMode+", &mut ctx);
    assert!(matches!(response, Response::Error(_)));
    assert!(ctx.session.negotiated_features.is_empty());
}
