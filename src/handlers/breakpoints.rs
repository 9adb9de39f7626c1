//! `Z`/`z` handlers: install/remove a breakpoint, ignoring the client's
//! requested type in favour of whatever the target actually supports for
//! the region (spec §4.4, §9 open question — codified, not accidental).

use crate::error::CoreError;
use crate::protocol::command::BreakpointType;
use crate::protocol::response::Response;
use crate::regmap::{self, Architecture};
use crate::session::breakpoints::BreakpointEntry;
use crate::target_controller::{AddressSpace, InstalledBreakpointKind, MemoryAddress};

use super::HandlerContext;

fn to_memory_address(architecture: Architecture, gdb_address: u32) -> MemoryAddress {
    match architecture {
        Architecture::Avr => {
            let (space, address) = regmap::translate_gdb_address(gdb_address);
            MemoryAddress { space, address }
        }
        Architecture::RiscV32 => MemoryAddress {
            space: AddressSpace::Flash,
            address: gdb_address,
        },
    }
}

pub fn insert(
    ctx: &mut HandlerContext<'_>,
    _requested_type: BreakpointType,
    address: u32,
    kind: u32,
) -> Response {
    let memory_address = to_memory_address(ctx.architecture, address);
    match ctx.controller.set_breakpoint(memory_address, kind) {
        Ok(installed) => {
            let installed_type = match installed {
                InstalledBreakpointKind::Hardware => BreakpointType::Hardware,
                InstalledBreakpointKind::Software => BreakpointType::Software,
            };
            ctx.session
                .external_breakpoints
                .insert(address, BreakpointEntry { installed_type, kind });
            Response::Ok
        }
        Err(err) => Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code()),
    }
}

pub fn remove(
    ctx: &mut HandlerContext<'_>,
    _requested_type: BreakpointType,
    address: u32,
    _kind: u32,
) -> Response {
    let memory_address = to_memory_address(ctx.architecture, address);
    match ctx.controller.clear_breakpoint(memory_address) {
        Ok(()) => {
            ctx.session.external_breakpoints.remove(address);
            Response::Ok
        }
        Err(err) => Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code()),
    }
}
