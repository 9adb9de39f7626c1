//! Shared test-only fakes for the integration suite.
//!
//! The translator's own unit tests skip straight past hart discovery via
//! a crate-internal `activate_for_test` shortcut (see `riscv/translator.rs`),
//! which an external integration-test binary can't reach —
//! `#[cfg(test)]` only applies when the lib crate itself is compiled under
//! test, and the helper is `pub(crate)` regardless. This fake instead
//! emulates enough of the Debug Module register file for the real
//! `RiscvTranslator::activate` handshake to run end to end: a single hart,
//! one match-control-capable trigger, and the abstract-command memory/
//! register access strategy.

use std::collections::HashMap;

use gdb_bridge::riscv::dtm::{address, DebugTransportModule};
use gdb_bridge::riscv::error::RiscvError;
use gdb_bridge::riscv::regs::{
    command_type, AbstractCommand, Abstractcs, AccessMemoryControl, AccessRegisterControl,
    Dmcontrol,
};
use gdb_bridge::riscv::trigger::csr;

const MAX_HART_INDEX: u32 = 0;
const TINFO_MATCH_CONTROL: u32 = 1 << 2;
const TINFO_NO_TRIGGER: u32 = 0x01;

/// A single-hart, single-trigger Debug Module simulated closely enough to
/// drive the real activation handshake (discover harts, toggle `dmactive`,
/// halt, discover/clear triggers, probe abstract-command memory access).
#[derive(Debug)]
pub struct IntegrationFakeDtm {
    dmactive: bool,
    selected_hart: u32,
    halted: bool,
    resume_ack: bool,
    data0: u32,
    data1: u32,
    cmderr: u8,
    tselect: u32,
    trigger_tinfo: Vec<u32>,
    registers: HashMap<u16, u32>,
    memory: HashMap<u32, u32>,
}

impl Default for IntegrationFakeDtm {
    fn default() -> Self {
        Self {
            dmactive: false,
            selected_hart: 0,
            halted: false,
            resume_ack: false,
            data0: 0,
            data1: 0,
            cmderr: 0,
            tselect: 0,
            trigger_tinfo: vec![TINFO_MATCH_CONTROL],
            registers: HashMap::new(),
            memory: HashMap::new(),
        }
    }
}

impl IntegrationFakeDtm {
    fn read_reg(&mut self, regno: u16) -> u32 {
        match regno {
            csr::TSELECT => self.tselect,
            csr::TINFO => self
                .trigger_tinfo
                .get(self.tselect as usize)
                .copied()
                .unwrap_or(TINFO_NO_TRIGGER),
            other => self.registers.get(&other).copied().unwrap_or(0),
        }
    }

    fn write_reg(&mut self, regno: u16, value: u32) {
        match regno {
            csr::TSELECT => {
                if (value as usize) < self.trigger_tinfo.len() {
                    self.tselect = value;
                }
                // else: hardware rejects an out-of-range select and keeps
                // the previous value, which is what stops trigger discovery.
            }
            csr::TINFO => {} // read-only
            other => {
                self.registers.insert(other, value);
            }
        }
    }

    fn execute_command(&mut self, raw: u32) {
        let command = AbstractCommand(raw);
        match command.cmdtype() {
            command_type::REGISTER_ACCESS => {
                let control = AccessRegisterControl(command.control());
                if control.transfer() {
                    if control.write() {
                        let value = self.data0;
                        self.write_reg(control.regno(), value);
                    } else {
                        self.data0 = self.read_reg(control.regno());
                    }
                }
            }
            command_type::MEMORY_ACCESS => {
                let control = AccessMemoryControl(command.control());
                if control.write() {
                    self.memory.insert(self.data1, self.data0);
                } else {
                    self.data0 = self.memory.get(&self.data1).copied().unwrap_or(0);
                }
                if control.postincr() {
                    self.data1 = self.data1.wrapping_add(4);
                }
            }
            _ => {}
        }
    }
}

impl DebugTransportModule for IntegrationFakeDtm {
    fn read_dmi_register(&mut self, reg_address: u8) -> Result<u32, RiscvError> {
        Ok(match reg_address {
            address::DATA0 => self.data0,
            address::DATA1 => self.data1,
            address::DMCONTROL => {
                let mut dmcontrol = Dmcontrol(0);
                dmcontrol.set_dmactive(self.dmactive);
                dmcontrol.set_hart_index(self.selected_hart);
                dmcontrol.0
            }
            address::DMSTATUS => {
                // `Dmstatus` exposes only getters (it's a status register
                // the real hardware computes), so the fake's bits are
                // assembled by hand at the same positions.
                let nonexistent = self.selected_hart > MAX_HART_INDEX;
                let mut bits = 0u32;
                bits |= (self.halted as u32) << 9; // allhalted
                bits |= (self.halted as u32) << 8; // anyhalted
                bits |= (!self.halted as u32) << 7; // allrunning
                bits |= (!self.halted as u32) << 6; // anyrunning
                bits |= (nonexistent as u32) << 5; // allnonexistent
                bits |= (nonexistent as u32) << 4; // anynonexistent
                bits |= (self.resume_ack as u32) << 17; // allresumeack
                bits |= (self.resume_ack as u32) << 16; // anyresumeack
                bits
            }
            address::ABSTRACTCS => {
                let mut abstractcs = Abstractcs(0);
                abstractcs.set_datacount(2);
                abstractcs.set_cmderr(self.cmderr);
                abstractcs.set_progbufsize(0);
                abstractcs.0
            }
            _ => 0,
        })
    }

    fn write_dmi_register(&mut self, reg_address: u8, value: u32) -> Result<(), RiscvError> {
        match reg_address {
            address::DATA0 => self.data0 = value,
            address::DATA1 => self.data1 = value,
            address::DMCONTROL => {
                let dmcontrol = Dmcontrol(value);
                self.dmactive = dmcontrol.dmactive();
                let requested = dmcontrol.hart_index();
                self.selected_hart = requested.min(MAX_HART_INDEX);
                if dmcontrol.haltreq() {
                    self.halted = true;
                }
                if dmcontrol.resumereq() {
                    self.halted = false;
                    self.resume_ack = true;
                }
            }
            address::ABSTRACTCS => {
                let abstractcs = Abstractcs(value);
                if abstractcs.cmderr() == 0b111 {
                    self.cmderr = 0;
                }
            }
            address::COMMAND => self.execute_command(value),
            _ => {}
        }
        Ok(())
    }
}
