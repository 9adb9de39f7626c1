//! `monitor` (`qRcmd`) sub-command dispatch (spec §4.4).
//!
//! Replies are rendered as plain text rather than the `O<hex>`
//! console-output stream real RSP servers use for multi-line monitor
//! output: every sub-command here produces a single line, so the extra
//! packet round-trip isn't worth modelling (see DESIGN.md).

use crate::error::CoreError;
use crate::protocol::command::MonitorCommand;
use crate::protocol::response::{hex_encode, Response};
use crate::regmap::Architecture;
use crate::target_controller::{AddressSpace, MemoryAddress};

use super::HandlerContext;

const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
const EEPROM_FILL_SIZE: u32 = 1024;

fn error_response(err: crate::error::TargetOperationError) -> Response {
    Response::Error(CoreError::TargetOperationFailure(err).rsp_error_code())
}

fn find_register(architecture: Architecture, name: &str) -> Option<crate::target_controller::RegisterDescriptor> {
    (0..=architecture.max_register_number())
        .filter_map(|number| architecture.register_for_gdb_number(number))
        .find(|descriptor| descriptor.name == name)
}

pub fn dispatch(ctx: &mut HandlerContext<'_>, command: MonitorCommand) -> Response {
    match command {
        MonitorCommand::Reset => match ctx.controller.reset() {
            Ok(()) => Response::Text("target reset".into()),
            Err(err) => error_response(err),
        },
        MonitorCommand::Version { machine } => {
            if machine {
                Response::Text(format!("embedded-gdb-bridge {CRATE_VERSION}"))
            } else {
                Response::Text(format!("embedded-gdb-bridge version {CRATE_VERSION}"))
            }
        }
        MonitorCommand::Help => Response::Text(
            "monitor commands: reset, version, help, svd, eeprom-fill, registers, \
             read <reg>, write <reg> <hex>"
                .into(),
        ),
        MonitorCommand::Svd => Response::Text("no SVD file registered for this target".into()),
        MonitorCommand::EepromFill => eeprom_fill(ctx),
        MonitorCommand::ListRegisters => {
            let names: Vec<String> = (0..=ctx.architecture.max_register_number())
                .filter_map(|number| ctx.architecture.register_for_gdb_number(number))
                .map(|descriptor| format!("{}:{}", descriptor.name, descriptor.width_bits))
                .collect();
            Response::Text(names.join(";"))
        }
        MonitorCommand::ReadRegister(name) => {
            let Some(descriptor) = find_register(ctx.architecture, &name) else {
                return Response::Text(format!("unknown register: {name}"));
            };
            match ctx.controller.read_cpu_register(&descriptor) {
                Ok(bytes) => Response::Text(hex_encode(&bytes)),
                Err(err) => error_response(err),
            }
        }
        MonitorCommand::WriteRegister { name, value } => {
            let Some(descriptor) = find_register(ctx.architecture, &name) else {
                return Response::Text(format!("unknown register: {name}"));
            };
            let Ok(bytes) = hex::decode(&value) else {
                return Response::Text(format!("malformed hex value: {value}"));
            };
            match ctx.controller.write_cpu_register(&descriptor, &bytes) {
                Ok(()) => Response::Text("OK".into()),
                Err(err) => error_response(err),
            }
        }
        MonitorCommand::Unknown(text) => Response::Text(format!("unknown monitor command: {text}")),
    }
}

/// AVR-specific convenience: fills the first [`EEPROM_FILL_SIZE`] bytes
/// of EEPROM with `0xff`. A no-op concept on RISC-V, where there is no
/// separate EEPROM address space.
fn eeprom_fill(ctx: &mut HandlerContext<'_>) -> Response {
    if ctx.architecture != Architecture::Avr {
        return Response::Text("eeprom-fill is only meaningful on AVR targets".into());
    }
    let address = MemoryAddress {
        space: AddressSpace::Eeprom,
        address: 0,
    };
    let fill = vec![0xffu8; EEPROM_FILL_SIZE as usize];
    match ctx.controller.write_memory(address, &fill) {
        Ok(()) => Response::Text(format!("eeprom filled ({EEPROM_FILL_SIZE} bytes)")),
        Err(err) => error_response(err),
    }
}
