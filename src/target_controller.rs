//! The Target-Controller Service boundary (spec §6): synchronous
//! operations this crate needs from whatever owns the physical debug
//! probe, expressed as a trait so the server never depends on a
//! concrete probe implementation.
//!
//! Grounded on the shape of `probe-rs`'s own `CoreInterface`/
//! `MemoryInterface` traits (`architecture/riscv/memory_interface.rs`,
//! `register.rs`): a small capability set of register/memory/execution
//! operations plus state queries, not a God-object.

use std::fmt;

use crate::error::TargetOperationError;

/// Which physical memory space a [`MemoryAddress`] refers to. AVR has
/// three; RISC-V's system bus is treated as a single flat space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Flash,
    Sram,
    Eeprom,
}

/// An address plus the space it lives in, already stripped of any
/// GDB-side encoding (see [`crate::regmap`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAddress {
    pub space: AddressSpace,
    pub address: u32,
}

/// Semantic description of one architectural register, independent of
/// the GDB register-number space that addresses it (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDescriptor {
    pub id: u32,
    pub width_bits: u32,
    pub name: String,
    pub group: Option<String>,
    pub readable: bool,
    pub writable: bool,
}

/// The target's current run state, as reported by `get_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Stepping,
    Stopped,
}

/// A breakpoint/watchpoint kind actually installed on the target, which
/// may differ from what the client asked for (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstalledBreakpointKind {
    Software,
    Hardware,
}

/// Diagnostic snapshot of a single GPIO/peripheral pin, returned by
/// `get_pin_states` for `monitor` sub-commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinState {
    pub name: String,
    pub high: bool,
}

/// A single execution-state transition, delivered to the Target-State
/// Bridge from whatever thread owns the probe connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStateChange {
    pub new_state: ExecutionState,
}

/// The synchronous operations the server needs against a physical debug
/// target. Implementations are expected to be backed by a RISC-V
/// translator ([`crate::riscv`]) or an equivalent driver for another
/// architecture.
pub trait TargetControllerService: fmt::Debug {
    fn read_cpu_register(&mut self, register: &RegisterDescriptor) -> Result<Vec<u8>, TargetOperationError>;
    fn write_cpu_register(
        &mut self,
        register: &RegisterDescriptor,
        value: &[u8],
    ) -> Result<(), TargetOperationError>;

    fn read_memory(
        &mut self,
        address: MemoryAddress,
        length: u32,
        excluded_ranges: &[(u32, u32)],
    ) -> Result<Vec<u8>, TargetOperationError>;
    fn write_memory(&mut self, address: MemoryAddress, bytes: &[u8]) -> Result<(), TargetOperationError>;

    fn set_breakpoint(
        &mut self,
        address: MemoryAddress,
        kind: u32,
    ) -> Result<InstalledBreakpointKind, TargetOperationError>;
    fn clear_breakpoint(&mut self, address: MemoryAddress) -> Result<(), TargetOperationError>;

    fn halt(&mut self) -> Result<(), TargetOperationError>;
    fn resume(&mut self, from_address: Option<u32>) -> Result<(), TargetOperationError>;
    fn step(&mut self, from_address: Option<u32>) -> Result<(), TargetOperationError>;
    fn reset(&mut self) -> Result<(), TargetOperationError>;

    fn get_state(&mut self) -> Result<ExecutionState, TargetOperationError>;
    fn get_pin_states(&mut self) -> Result<Vec<PinState>, TargetOperationError>;

    fn enter_programming_mode(&mut self) -> Result<(), TargetOperationError>;
    fn leave_programming_mode(&mut self) -> Result<(), TargetOperationError>;
    /// Erases then writes `bytes` starting at `address` in a single
    /// atomic program/verify cycle, for `vFlashDone` (spec §4.5).
    fn program_flash(&mut self, address: u32, bytes: &[u8]) -> Result<(), TargetOperationError>;
}
