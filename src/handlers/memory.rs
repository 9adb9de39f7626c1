//! `m`/`M` handlers: read/write target memory, with AVR address-space
//! demasking applied first (spec §4.2, §4.4).

use crate::error::CoreError;
use crate::protocol::response::Response;
use crate::regmap::{self, Architecture};
use crate::target_controller::{AddressSpace, MemoryAddress};

use super::HandlerContext;

fn error_response(err: crate::error::TargetOperationError) -> Response {
    Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code())
}

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

pub fn read(ctx: &mut HandlerContext<'_>, address: u32, length: u32) -> Response {
    let memory_address = to_memory_address(ctx.architecture, address);
    match ctx.controller.read_memory(memory_address, length, &[]) {
        Ok(bytes) => {
            debug_assert_eq!(bytes.len() as u32, length);
            Response::Hex(bytes)
        }
        Err(err) => error_response(err),
    }
}

pub fn write(ctx: &mut HandlerContext<'_>, address: u32, data: &[u8]) -> Response {
    let memory_address = to_memory_address(ctx.architecture, address);
    match ctx.controller.write_memory(memory_address, data) {
        Ok(()) => Response::Ok,
        Err(err) => error_response(err),
    }
}
