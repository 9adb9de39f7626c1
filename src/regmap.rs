//! Register-space mapping (spec §4.2): translation between a GDB client's
//! dense register-number space and architectural register descriptors,
//! and between GDB's address-space-encoded AVR addresses and raw target
//! addresses.

use crate::target_controller::{AddressSpace, RegisterDescriptor};

/// The debugger-facing CPU architecture, selecting which register
/// numbering and address masking rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Avr,
    RiscV32,
}

const AVR_SRAM_MASK: u32 = 0x0080_0000;
const AVR_EEPROM_MASK: u32 = 0x0081_0000;

impl Architecture {
    /// Maps a GDB register number onto a semantic register descriptor.
    /// Returns `None` for a number outside the architecture's range.
    pub fn register_for_gdb_number(self, number: u32) -> Option<RegisterDescriptor> {
        match self {
            Architecture::Avr => match number {
                0..=31 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 8,
                    name: format!("r{number}"),
                    group: Some("general".into()),
                    readable: true,
                    writable: true,
                }),
                32 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 8,
                    name: "sreg".into(),
                    group: Some("status".into()),
                    readable: true,
                    writable: true,
                }),
                33 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 16,
                    name: "sp".into(),
                    group: Some("system".into()),
                    readable: true,
                    writable: true,
                }),
                34 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 32,
                    name: "pc".into(),
                    group: Some("system".into()),
                    readable: true,
                    writable: true,
                }),
                _ => None,
            },
            Architecture::RiscV32 => match number {
                0..=31 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 32,
                    name: format!("x{number}"),
                    group: Some("general".into()),
                    readable: true,
                    writable: true,
                }),
                32 => Some(RegisterDescriptor {
                    id: number,
                    width_bits: 32,
                    name: "pc".into(),
                    group: Some("system".into()),
                    readable: true,
                    writable: true,
                }),
                _ => None,
            },
        }
    }

    /// The highest GDB register number this architecture defines.
    pub fn max_register_number(self) -> u32 {
        match self {
            Architecture::Avr => 34,
            Architecture::RiscV32 => 32,
        }
    }
}

/// Strips an AVR GDB address's embedded address-space mask, returning
/// the bare target address and which space it names. Flash is the
/// default when neither SRAM nor EEPROM bits are set.
pub fn translate_gdb_address(gdb_address: u32) -> (AddressSpace, u32) {
    if gdb_address & AVR_EEPROM_MASK == AVR_EEPROM_MASK {
        (AddressSpace::Eeprom, gdb_address & !AVR_EEPROM_MASK)
    } else if gdb_address & AVR_SRAM_MASK == AVR_SRAM_MASK {
        (AddressSpace::Sram, gdb_address & !AVR_SRAM_MASK)
    } else {
        (AddressSpace::Flash, gdb_address)
    }
}

/// The inverse of [`translate_gdb_address`]: re-embeds the address-space
/// mask a GDB client expects to see when the server reports an address.
pub fn translate_target_address(space: AddressSpace, target_address: u32) -> u32 {
    match space {
        AddressSpace::Flash => target_address,
        AddressSpace::Sram => target_address | AVR_SRAM_MASK,
        AddressSpace::Eeprom => target_address | AVR_EEPROM_MASK,
    }
}
