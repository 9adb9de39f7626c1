//! `g`/`G`/`p`/`P` handlers: read/write CPU registers by GDB number (spec
//! §4.2, §4.4).

use crate::error::CoreError;
use crate::protocol::response::Response;

use super::HandlerContext;

fn error_response(err: crate::error::TargetOperationError) -> Response {
    Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code())
}

pub fn read_all(ctx: &mut HandlerContext<'_>) -> Response {
    let mut bytes = Vec::new();
    for number in 0..=ctx.architecture.max_register_number() {
        let Some(descriptor) = ctx.architecture.register_for_gdb_number(number) else {
            continue;
        };
        match ctx.controller.read_cpu_register(&descriptor) {
            Ok(mut value) => bytes.append(&mut value),
            Err(err) => return error_response(err),
        }
    }
    Response::Hex(bytes)
}

pub fn write_all(ctx: &mut HandlerContext<'_>, data: &[u8]) -> Response {
    let mut offset = 0usize;
    for number in 0..=ctx.architecture.max_register_number() {
        let Some(descriptor) = ctx.architecture.register_for_gdb_number(number) else {
            continue;
        };
        let width_bytes = (descriptor.width_bits / 8) as usize;
        if offset + width_bytes > data.len() {
            return Response::Error(0x01);
        }
        let slice = &data[offset..offset + width_bytes];
        if let Err(err) = ctx.controller.write_cpu_register(&descriptor, slice) {
            return error_response(err);
        }
        offset += width_bytes;
    }
    Response::Ok
}

pub fn read_one(ctx: &mut HandlerContext<'_>, number: u32) -> Response {
    let Some(descriptor) = ctx.architecture.register_for_gdb_number(number) else {
        return Response::Error(0x01);
    };
    match ctx.controller.read_cpu_register(&descriptor) {
        Ok(value) => Response::Hex(value),
        Err(err) => error_response(err),
    }
}

pub fn write_one(ctx: &mut HandlerContext<'_>, number: u32, data: &[u8]) -> Response {
    let Some(descriptor) = ctx.architecture.register_for_gdb_number(number) else {
        return Response::Error(0x01);
    };
    match ctx.controller.write_cpu_register(&descriptor, data) {
        Ok(()) => Response::Ok,
        Err(err) => error_response(err),
    }
}
