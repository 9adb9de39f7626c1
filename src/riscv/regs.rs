//! Bit-exact 32-bit register layouts for the RISC-V external debug
//! module, per spec §6. Mirrors `probe-rs`'s use of the `bitfield` crate
//! in `architecture/riscv/communication_interface.rs` and `dtm.rs` (its
//! `Dtmcs`, `Sbcs`, `AccessRegisterCommand` types) rather than hand
//! rolling shift/mask arithmetic at every call site.

use bitfield::bitfield;

bitfield! {
    /// The `dmcontrol` register. Selected-hart index reassembles as
    /// `(hartselhi << 10) | hartsello`.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Dmcontrol(u32);
    impl Debug;
    pub dmactive, set_dmactive: 0;
    pub ndmreset, set_ndmreset: 1;
    pub clrresethaltreq, set_clrresethaltreq: 2;
    pub setresethaltreq, set_setresethaltreq: 3;
    pub clrkeepalive, set_clrkeepalive: 4;
    pub setkeepalive, set_setkeepalive: 5;
    pub u16, hartselhi, set_hartselhi: 15, 6;
    pub hartmode, set_hartmode: 26;
    pub ackunavail, set_ackunavail: 27;
    pub ackhavereset, set_ackhavereset: 28;
    pub hartreset, set_hartreset: 29;
    pub resumereq, set_resumereq: 30;
    pub haltreq, set_haltreq: 31;
    pub u16, hartsello, set_hartsello: 25, 16;
}

impl Dmcontrol {
    /// Reassembles the 20-bit selected-hart index from `hartselhi`/`hartsello`.
    pub fn hart_index(&self) -> u32 {
        ((self.hartselhi() as u32) << 10) | self.hartsello() as u32
    }

    pub fn set_hart_index(&mut self, index: u32) {
        self.set_hartselhi(((index >> 10) & 0x3ff) as u16);
        self.set_hartsello((index & 0x3ff) as u16);
    }
}

bitfield! {
    /// The `dmstatus` register (status bits the translator polls).
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Dmstatus(u32);
    impl Debug;
    pub allhalted, _: 9;
    pub anyhalted, _: 8;
    pub allrunning, _: 7;
    pub anyrunning, _: 6;
    pub allnonexistent, _: 5;
    pub anynonexistent, _: 4;
    pub allresumeack, _: 17;
    pub anyresumeack, _: 16;
    pub allhavereset, _: 19;
    pub anyhavereset, _: 18;
}

bitfield! {
    /// The `abstractcs` (abstract-control/status) register. `cmderr` is
    /// write-1-to-clear: writing `0b111` clears it.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Abstractcs(u32);
    impl Debug;
    pub u8, datacount, set_datacount: 3, 0;
    pub u8, cmderr, set_cmderr: 10, 8;
    pub relaxedpriv, set_relaxedpriv: 11;
    pub busy, _: 12;
    pub u8, progbufsize, set_progbufsize: 28, 24;
}

bitfield! {
    /// The `command` (abstract-command) register.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AbstractCommand(u32);
    impl Debug;
    pub u32, control, set_control: 23, 0;
    pub u8, cmdtype, set_cmdtype: 31, 24;
}

/// `cmdtype` values for [`AbstractCommand`], per spec §6.
pub mod command_type {
    pub const REGISTER_ACCESS: u8 = 0;
    pub const QUICK_ACCESS: u8 = 1;
    pub const MEMORY_ACCESS: u8 = 2;
}

bitfield! {
    /// The `control` field of a register-access abstract command.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AccessRegisterControl(u32);
    impl Debug;
    pub u16, regno, set_regno: 15, 0;
    pub write, set_write: 16;
    pub transfer, set_transfer: 17;
    pub postexec, set_postexec: 18;
    pub postincr, set_postincr: 19;
    pub u8, size, set_size: 22, 20;
}

/// `size` codes for [`AccessRegisterControl`]/[`AccessMemoryControl`].
pub mod access_size {
    pub const BITS_32: u8 = 2;
    pub const BITS_64: u8 = 3;
    pub const BITS_128: u8 = 4;
}

bitfield! {
    /// The `control` field of a memory-access abstract command.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AccessMemoryControl(u32);
    impl Debug;
    pub write, set_write: 16;
    pub postincr, set_postincr: 19;
    pub u8, size, set_size: 22, 20;
    pub virtual_addressing, set_virtual_addressing: 23;
}

bitfield! {
    /// Trigger-data-1 in match-control mode (spec §6, §4.8).
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct MatchControl(u32);
    impl Debug;
    pub load, set_load: 0;
    pub store, set_store: 1;
    pub execute, set_execute: 2;
    pub u_mode, set_u_mode: 3;
    pub s_mode, set_s_mode: 4;
    pub m_mode, set_m_mode: 6;
    pub u8, match_kind, set_match_kind: 10, 7;
    pub chain, set_chain: 11;
    pub u8, action, set_action: 15, 12;
    pub u8, sizelo, set_sizelo: 17, 16;
    pub timing, set_timing: 18;
    pub select, set_select: 19;
    pub hit, set_hit: 20;
    pub u8, sizehi, set_sizehi: 22, 21;
}

/// `action` values a trigger can be programmed with (spec §4.8 /
/// GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    EnterDebugMode,
    RaiseBreakpointException,
}

impl TriggerAction {
    pub fn code(self) -> u8 {
        match self {
            TriggerAction::EnterDebugMode => 1,
            TriggerAction::RaiseBreakpointException => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hart_index_reassembles_from_hi_lo_halves() {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_hart_index(0x2_3456 & 0xfffff);
        assert_eq!(dmcontrol.hart_index(), 0x2_3456 & 0xfffff);
    }

    #[test]
    fn abstractcs_cmderr_is_three_bits() {
        let mut abstractcs = Abstractcs(0);
        abstractcs.set_cmderr(0b111);
        assert_eq!(abstractcs.cmderr(), 0b111);
    }

    #[test]
    fn access_register_control_round_trips_fields() {
        let mut ctrl = AccessRegisterControl(0);
        ctrl.set_regno(0x1008);
        ctrl.set_write(true);
        ctrl.set_transfer(true);
        ctrl.set_size(access_size::BITS_32);
        assert_eq!(ctrl.regno(), 0x1008);
        assert!(ctrl.write());
        assert_eq!(ctrl.size(), access_size::BITS_32);
    }
}
