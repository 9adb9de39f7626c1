//! Command handlers (spec §4.4): each handler produces exactly one
//! response unless explicitly noted (continue/step instead arm
//! `waiting-for-stop` and let the [`crate::bridge::TargetStateBridge`]
//! produce the eventual stop-reply).

mod breakpoints;
mod execution;
mod flash;
mod memory;
mod monitor;
mod query;
mod registers;

use crate::config::Config;
use crate::protocol::command::Command;
use crate::protocol::response::Response;
use crate::regmap::Architecture;
use crate::session::DebugSession;
use crate::target_controller::TargetControllerService;

/// Everything a handler needs: the session it mutates, the target
/// controller it issues operations against, and static server
/// configuration/architecture it must respect.
pub struct HandlerContext<'a> {
    pub session: &'a mut DebugSession,
    pub controller: &'a mut dyn TargetControllerService,
    pub architecture: Architecture,
    pub config: &'a Config,
}

/// Server-side feature set negotiated during `qSupported` (spec §6).
pub const SERVER_FEATURES: &[&str] = &["swbreak", "hwbreak", "qXfer:memory-map:read"];

/// Dispatches one parsed command to its handler.
pub fn handle(command: Command, ctx: &mut HandlerContext<'_>) -> Response {
    match command {
        Command::QueryStopReason => execution::query_stop_reason(ctx),
        Command::Continue { address } => execution::resume(ctx, address),
        Command::Step { address } => execution::step(ctx, address),
        Command::RangeStep { start, end } => execution::range_step(ctx, start, end),
        Command::Detach => execution::detach(ctx),

        Command::ReadAllRegisters => registers::read_all(ctx),
        Command::WriteAllRegisters { data } => registers::write_all(ctx, &data),
        Command::ReadRegister { number } => registers::read_one(ctx, number),
        Command::WriteRegister { number, data } => registers::write_one(ctx, number, &data),

        Command::ReadMemory { address, length } => memory::read(ctx, address, length),
        Command::WriteMemory { address, data } => memory::write(ctx, address, &data),

        Command::InsertBreakpoint {
            requested_type,
            address,
            kind,
        } => breakpoints::insert(ctx, requested_type, address, kind),
        Command::RemoveBreakpoint {
            requested_type,
            address,
            kind,
        } => breakpoints::remove(ctx, requested_type, address, kind),

        Command::QuerySupported { client_features } => query::supported(ctx, &client_features),
        Command::QueryMemoryMap { offset, length } => query::memory_map(ctx, offset, length),
        Command::QueryVContSupported => query::vcont_supported(ctx),

        Command::MonitorCommand(cmd) => monitor::dispatch(ctx, cmd),

        Command::FlashErase { address, length } => flash::erase(ctx, address, length),
        Command::FlashWrite { address, data } => flash::write(ctx, address, &data),
        Command::FlashDone => flash::done(ctx),

        Command::StartNoAckMode => {
            ctx.session.no_ack_mode = true;
            Response::Ok
        }
    }
}

/// Handles a bare interrupt byte arriving outside of any command (spec
/// §4.4 "Interrupt byte").
pub fn handle_interrupt(ctx: &mut HandlerContext<'_>) -> Response {
    if ctx.session.waiting_for_stop {
        // A resume/step is in flight; remember the interrupt and let the
        // bridge re-issue it once the resume is acknowledged.
        ctx.session.pending_interrupt = true;
        Response::None
    } else {
        match ctx.controller.halt() {
            Ok(()) => Response::StopReply {
                signal: crate::protocol::response::SIGNAL_INTERRUPT,
                thread_id: 0,
            },
            Err(err) => Response::Error(
                crate::error::CoreError::TargetOperationFailure(err).rsp_error_code(),
            ),
        }
    }
}
