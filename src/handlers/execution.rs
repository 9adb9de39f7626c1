//! `?`, continue/step, range-step, and detach handlers (spec §4.4, §4.5).

use crate::error::CoreError;
use crate::protocol::response::{Response, SIGNAL_TRAP};
use crate::session::RangeStepSession;

use super::HandlerContext;

fn error_response(err: crate::error::TargetOperationError) -> Response {
    Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code())
}

pub fn query_stop_reason(_ctx: &mut HandlerContext<'_>) -> Response {
    Response::StopReply {
        signal: SIGNAL_TRAP,
        thread_id: 0,
    }
}

pub fn resume(ctx: &mut HandlerContext<'_>, address: Option<u64>) -> Response {
    match ctx.controller.resume(address.map(|a| a as u32)) {
        Ok(()) => {
            ctx.session.begin_waiting_for_stop();
            Response::None
        }
        Err(err) => error_response(err),
    }
}

pub fn step(ctx: &mut HandlerContext<'_>, address: Option<u64>) -> Response {
    match ctx.controller.step(address.map(|a| a as u32)) {
        Ok(()) => {
            ctx.session.begin_waiting_for_stop();
            Response::None
        }
        Err(err) => error_response(err),
    }
}

/// Range-stepping is implemented as a fall back to single-stepping
/// (spec §4.5 explicitly allows this when "breakpoint resources are
/// exhausted"; this crate always takes that path since discovering the
/// instruction boundaries a target may branch to needs a disassembler,
/// which is out of scope here — see DESIGN.md).
pub fn range_step(ctx: &mut HandlerContext<'_>, start: u64, end: u64) -> Response {
    ctx.session.range_step_session = Some(RangeStepSession::new(start, end));
    match ctx.controller.step(Some(start as u32)) {
        Ok(()) => {
            ctx.session.begin_waiting_for_stop();
            Response::None
        }
        Err(err) => {
            ctx.session.range_step_session = None;
            error_response(err)
        }
    }
}

pub fn detach(ctx: &mut HandlerContext<'_>) -> Response {
    ctx.session.external_breakpoints.clear();
    ctx.session.internal_breakpoints.clear();
    ctx.session.flash_session = None;
    ctx.session.range_step_session = None;
    Response::Ok
}
