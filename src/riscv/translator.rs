//! The RISC-V Debug-Module Translator (spec §4.7): turns the abstract
//! debug operations the server needs (halt, resume, step, register and
//! memory access) into the sequence of Debug Module Interface register
//! reads/writes the RISC-V Debug Specification defines.
//!
//! Grounded on `probe-rs`'s `RiscvCommunicationInterface`
//! (`architecture/riscv/communication_interface.rs`): the same
//! save/restore-scratch-register discipline around program-buffer memory
//! access, the same abstract-command busy-poll/cmderr-clear contract,
//! and the same activation ordering (discover harts, select the first,
//! toggle the debug module, halt, discover triggers).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::riscv::dtm::{address, DebugTransportModule};
use crate::riscv::error::{AbstractCommandErrorKind, RiscvError};
use crate::riscv::opcodes;
use crate::riscv::regs::{
    access_size, command_type, AbstractCommand, Abstractcs, AccessMemoryControl,
    AccessRegisterControl, Dmcontrol, Dmstatus,
};
use crate::riscv::trigger::{CsrAccess, TriggerModule};

/// Default response timeout the translator's polling loops observe
/// before declaring a target-operation failure (spec §5). Configurable
/// per instance via [`RiscvTranslator::with_response_timeout`].
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

const GPR_REGNO_BASE: u16 = 0x1000;
const X8: u16 = GPR_REGNO_BASE + 8;
const X9: u16 = GPR_REGNO_BASE + 9;

/// Debug control/status register (outside the DMI register set; reached
/// through the abstract-command CSR path like any other register).
const DCSR: u16 = 0x7b0;
/// `ebreak` traps into debug mode from M-mode.
const DCSR_EBREAKM: u32 = 1 << 15;
/// `ebreak` traps into debug mode from S-mode.
const DCSR_EBREAKS: u32 = 1 << 13;
/// `ebreak` traps into debug mode from U-mode.
const DCSR_EBREAKU: u32 = 1 << 12;
/// All three break-in-all-privilege-modes bits, set together so an
/// `ebreak` (the program-buffer terminator) always traps regardless of
/// which mode the hart is in when it executes one.
const DCSR_EBREAK_ALL_MODES: u32 = DCSR_EBREAKM | DCSR_EBREAKS | DCSR_EBREAKU;

/// Which of the two memory-access strategies the activated debug module
/// supports and which one is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryAccessStrategy {
    AbstractCommand,
    ProgramBuffer,
}

/// Discovered once at activation (spec §3 "Debug-module descriptor").
#[derive(Debug, Clone)]
pub struct DebugModuleDescriptor {
    pub hart_indices: Vec<u32>,
    pub supported_strategies: HashSet<MemoryAccessStrategy>,
    pub abstract_data_count: u8,
    pub program_buffer_words: u8,
}

/// A target execution state as reported by `dmstatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Stopped,
}

/// Ties a [`DebugTransportModule`] to the translator state machine:
/// selected hart, discovered capabilities, allocated triggers.
#[derive(Debug)]
pub struct RiscvTranslator<D> {
    dtm: D,
    descriptor: Option<DebugModuleDescriptor>,
    selected_hart: u32,
    active_strategy: Option<MemoryAccessStrategy>,
    preferred_strategy: Option<MemoryAccessStrategy>,
    pub triggers: TriggerModule,
    response_timeout: Duration,
}

impl<D: DebugTransportModule> RiscvTranslator<D> {
    pub fn new(dtm: D) -> Self {
        Self {
            dtm,
            descriptor: None,
            selected_hart: 0,
            active_strategy: None,
            preferred_strategy: None,
            triggers: TriggerModule::new(),
            response_timeout: RESPONSE_TIMEOUT,
        }
    }

    pub fn with_preferred_strategy(mut self, strategy: MemoryAccessStrategy) -> Self {
        self.preferred_strategy = Some(strategy);
        self
    }

    /// Overrides the default response timeout (spec §4.7/§5 ambient
    /// configuration, not a wire-format constant).
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn descriptor(&self) -> Option<&DebugModuleDescriptor> {
        self.descriptor.as_ref()
    }

    // ---- activation / deactivation (spec §4.7) ----------------------

    pub fn activate(&mut self) -> Result<(), RiscvError> {
        let hart_indices = self.discover_harts()?;
        if hart_indices.is_empty() {
            return Err(RiscvError::NoHartsDiscovered);
        }
        self.selected_hart = hart_indices[0];
        self.select_hart(self.selected_hart)?;

        self.set_dmactive(false)?;
        self.set_dmactive(true)?;

        self.request_halt()?;

        self.triggers.discover(&mut CsrBridge(self))?;
        self.triggers.clear_all(&mut CsrBridge(self))?;

        // Break-in-all-privilege-modes: an `ebreak` instruction only
        // traps into debug mode if DCSR's ebreak{u,s,m} bits say so for
        // the hart's current privilege level. Distinct from the
        // trigger module's own u_mode/s_mode/m_mode bits, which gate
        // trigger-match breakpoints rather than the `ebreak` instruction
        // the program buffer uses as its terminator.
        let dcsr = self.read_register(DCSR)?;
        self.write_register(DCSR, dcsr | DCSR_EBREAK_ALL_MODES)?;

        let abstractcs = Abstractcs(self.dtm.read_dmi_register(address::ABSTRACTCS)?);
        let abstract_data_count = abstractcs.datacount();
        let program_buffer_words = abstractcs.progbufsize();

        let mut supported_strategies = HashSet::new();
        if program_buffer_words >= 3 {
            supported_strategies.insert(MemoryAccessStrategy::ProgramBuffer);
        }
        if self.probe_abstract_command_memory_access().is_ok() {
            supported_strategies.insert(MemoryAccessStrategy::AbstractCommand);
        }
        if supported_strategies.is_empty() {
            return Err(RiscvError::NoMemoryAccessStrategy);
        }

        self.active_strategy = Some(match self.preferred_strategy {
            Some(preferred) if supported_strategies.contains(&preferred) => preferred,
            _ if supported_strategies.contains(&MemoryAccessStrategy::AbstractCommand) => {
                MemoryAccessStrategy::AbstractCommand
            }
            _ => MemoryAccessStrategy::ProgramBuffer,
        });

        self.descriptor = Some(DebugModuleDescriptor {
            hart_indices,
            supported_strategies,
            abstract_data_count,
            program_buffer_words,
        });

        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<(), RiscvError> {
        self.set_dmactive(false)
    }

    fn discover_harts(&mut self) -> Result<Vec<u32>, RiscvError> {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_dmactive(true);
        dmcontrol.set_hart_index(0x3ff);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)?;
        let readback = Dmcontrol(self.dtm.read_dmi_register(address::DMCONTROL)?);
        let max_index = readback.hart_index();

        let mut harts = Vec::new();
        for index in 0..=max_index {
            self.select_hart(index)?;
            let status = Dmstatus(self.dtm.read_dmi_register(address::DMSTATUS)?);
            if status.anynonexistent() {
                break;
            }
            harts.push(index);
        }
        Ok(harts)
    }

    fn select_hart(&mut self, index: u32) -> Result<(), RiscvError> {
        let mut dmcontrol = Dmcontrol(self.dtm.read_dmi_register(address::DMCONTROL)?);
        dmcontrol.set_dmactive(true);
        dmcontrol.set_hart_index(index);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)
    }

    fn set_dmactive(&mut self, active: bool) -> Result<(), RiscvError> {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_dmactive(active);
        dmcontrol.set_hart_index(self.selected_hart);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)?;

        self.poll_until(RiscvError::Timeout("dmactive"), |dtm| {
            let status = dtm.read_dmi_register(address::DMCONTROL)?;
            Ok(Dmcontrol(status).dmactive() == active)
        })
    }

    // ---- halt / resume / step / reset --------------------------------

    fn request_halt(&mut self) -> Result<(), RiscvError> {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_dmactive(true);
        dmcontrol.set_hart_index(self.selected_hart);
        dmcontrol.set_haltreq(true);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)?;

        self.poll_until(RiscvError::Timeout("allhalted"), |dtm| {
            let status = Dmstatus(dtm.read_dmi_register(address::DMSTATUS)?);
            Ok(status.allhalted())
        })?;

        let mut clear = Dmcontrol(0);
        clear.set_dmactive(true);
        clear.set_hart_index(self.selected_hart);
        self.dtm.write_dmi_register(address::DMCONTROL, clear.0)
    }

    pub fn halt(&mut self) -> Result<(), RiscvError> {
        self.request_halt()
    }

    pub fn resume(&mut self) -> Result<(), RiscvError> {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_dmactive(true);
        dmcontrol.set_hart_index(self.selected_hart);
        dmcontrol.set_resumereq(true);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)?;

        let acknowledged = self
            .poll_until(RiscvError::Timeout("allresumeack"), |dtm| {
                let status = Dmstatus(dtm.read_dmi_register(address::DMSTATUS)?);
                Ok(status.allresumeack())
            })
            .is_ok();

        if !acknowledged {
            self.request_halt()?;
            return Err(RiscvError::Timeout("allresumeack"));
        }
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), RiscvError> {
        // Single-step is a resume with the `step` debug-control/status
        // bit set.
        const DCSR_STEP_BIT: u32 = 1 << 2;

        let dcsr = self.read_register(DCSR)?;
        self.write_register(DCSR, dcsr | DCSR_STEP_BIT)?;
        self.resume()?;
        self.write_register(DCSR, dcsr & !DCSR_STEP_BIT)
    }

    pub fn reset(&mut self) -> Result<(), RiscvError> {
        let mut dmcontrol = Dmcontrol(0);
        dmcontrol.set_dmactive(true);
        dmcontrol.set_hart_index(self.selected_hart);
        dmcontrol.set_hartreset(true);
        self.dtm.write_dmi_register(address::DMCONTROL, dmcontrol.0)?;

        self.poll_until(RiscvError::Timeout("allhavereset"), |dtm| {
            let status = Dmstatus(dtm.read_dmi_register(address::DMSTATUS)?);
            Ok(status.allhavereset())
        })?;

        let mut ack = Dmcontrol(0);
        ack.set_dmactive(true);
        ack.set_hart_index(self.selected_hart);
        ack.set_ackhavereset(true);
        self.dtm.write_dmi_register(address::DMCONTROL, ack.0)
    }

    pub fn execution_state(&mut self) -> Result<ExecutionState, RiscvError> {
        let status = Dmstatus(self.dtm.read_dmi_register(address::DMSTATUS)?);
        if status.anyhavereset() {
            tracing::info!("RISC-V hart reset detected during status poll");
            let was_running = status.anyrunning();
            if was_running {
                self.request_halt()?;
            }
            // Re-initialise the debug control/status register, matching
            // what activation does.
            let dcsr = self.read_register(DCSR).unwrap_or(0);
            self.write_register(DCSR, dcsr | DCSR_EBREAK_ALL_MODES)?;

            let mut ack = Dmcontrol(0);
            ack.set_dmactive(true);
            ack.set_hart_index(self.selected_hart);
            ack.set_ackhavereset(true);
            self.dtm.write_dmi_register(address::DMCONTROL, ack.0)?;

            if was_running {
                self.resume()?;
                return Ok(ExecutionState::Running);
            }
        }

        Ok(if status.anyrunning() {
            ExecutionState::Running
        } else {
            ExecutionState::Stopped
        })
    }

    // ---- register access (spec §4.7 "Register access") --------------

    pub fn read_gpr(&mut self, index: u8) -> Result<u32, RiscvError> {
        self.read_register(GPR_REGNO_BASE + index as u16)
    }

    pub fn write_gpr(&mut self, index: u8, value: u32) -> Result<(), RiscvError> {
        self.write_register(GPR_REGNO_BASE + index as u16, value)
    }

    pub fn read_register(&mut self, regno: u16) -> Result<u32, RiscvError> {
        let mut control = AccessRegisterControl(0);
        control.set_regno(regno);
        control.set_transfer(true);
        control.set_write(false);
        control.set_size(access_size::BITS_32);
        self.execute_abstract_command(control.0)?;
        self.dtm.read_dmi_register(address::DATA0)
    }

    pub fn write_register(&mut self, regno: u16, value: u32) -> Result<(), RiscvError> {
        self.dtm.write_dmi_register(address::DATA0, value)?;
        let mut control = AccessRegisterControl(0);
        control.set_regno(regno);
        control.set_transfer(true);
        control.set_write(true);
        control.set_size(access_size::BITS_32);
        self.execute_abstract_command(control.0)
    }

    fn execute_abstract_command(&mut self, control_bits: u32) -> Result<(), RiscvError> {
        let mut command = AbstractCommand(0);
        command.set_control(control_bits);
        command.set_cmdtype(command_type::REGISTER_ACCESS);
        self.dtm.write_dmi_register(address::COMMAND, command.0)?;
        self.wait_for_abstract_command()
    }

    fn wait_for_abstract_command(&mut self) -> Result<(), RiscvError> {
        self.poll_until(RiscvError::Timeout("abstract command busy"), |dtm| {
            let abstractcs = Abstractcs(dtm.read_dmi_register(address::ABSTRACTCS)?);
            Ok(!abstractcs.busy())
        })?;

        let abstractcs = Abstractcs(self.dtm.read_dmi_register(address::ABSTRACTCS)?);
        let error = AbstractCommandErrorKind::parse(abstractcs.cmderr());

        if abstractcs.cmderr() != 0 {
            let mut clear = abstractcs;
            clear.set_cmderr(0b111);
            self.dtm.write_dmi_register(address::ABSTRACTCS, clear.0)?;
        }

        match error {
            AbstractCommandErrorKind::None => Ok(()),
            other => Err(RiscvError::AbstractCommand(other)),
        }
    }

    fn probe_abstract_command_memory_access(&mut self) -> Result<(), RiscvError> {
        self.dtm.write_dmi_register(address::DATA1, 0)?;
        let mut control = AccessMemoryControl(0);
        control.set_write(false);
        control.set_size(access_size::BITS_32);
        let mut command = AbstractCommand(0);
        command.set_control(control.0);
        command.set_cmdtype(command_type::MEMORY_ACCESS);
        self.dtm.write_dmi_register(address::COMMAND, command.0)?;
        self.wait_for_abstract_command()
    }

    // ---- memory access (spec §4.7 "Memory access") -------------------

    /// Reads `count` consecutive 32-bit words starting at `word_address`
    /// via the abstract-command strategy.
    pub fn read_words_abstract_command(
        &mut self,
        word_address: u32,
        count: u32,
    ) -> Result<Vec<u32>, RiscvError> {
        self.dtm.write_dmi_register(address::DATA1, word_address)?;
        let mut words = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut control = AccessMemoryControl(0);
            control.set_write(false);
            control.set_postincr(true);
            control.set_size(access_size::BITS_32);
            let mut command = AbstractCommand(0);
            command.set_control(control.0);
            command.set_cmdtype(command_type::MEMORY_ACCESS);
            self.dtm.write_dmi_register(address::COMMAND, command.0)?;
            self.wait_for_abstract_command()?;
            words.push(self.dtm.read_dmi_register(address::DATA0)?);
        }
        Ok(words)
    }

    /// Writes `words` starting at `word_address` via the abstract-command
    /// strategy.
    pub fn write_words_abstract_command(
        &mut self,
        word_address: u32,
        words: &[u32],
    ) -> Result<(), RiscvError> {
        self.dtm.write_dmi_register(address::DATA1, word_address)?;
        for &word in words {
            self.dtm.write_dmi_register(address::DATA0, word)?;
            let mut control = AccessMemoryControl(0);
            control.set_write(true);
            control.set_postincr(true);
            control.set_size(access_size::BITS_32);
            let mut command = AbstractCommand(0);
            command.set_control(control.0);
            command.set_cmdtype(command_type::MEMORY_ACCESS);
            self.dtm.write_dmi_register(address::COMMAND, command.0)?;
            self.wait_for_abstract_command()?;
        }
        Ok(())
    }

    /// Reads `count` consecutive 32-bit words via the program-buffer
    /// strategy, preserving and restoring `x8`/`x9` even on error.
    pub fn read_words_program_buffer(
        &mut self,
        word_address: u32,
        count: u32,
    ) -> Result<Vec<u32>, RiscvError> {
        let saved_x8 = self.read_gpr(8)?;
        let saved_x9 = self.read_gpr(9)?;

        let result = self.read_words_program_buffer_inner(word_address, count);

        let restore_x8 = self.write_gpr(8, saved_x8);
        let restore_x9 = self.write_gpr(9, saved_x9);
        if restore_x8.is_err() {
            return Err(RiscvError::RegisterRestoreFailed("x8"));
        }
        if restore_x9.is_err() {
            return Err(RiscvError::RegisterRestoreFailed("x9"));
        }

        result
    }

    fn read_words_program_buffer_inner(
        &mut self,
        word_address: u32,
        count: u32,
    ) -> Result<Vec<u32>, RiscvError> {
        self.write_program_buffer(&[
            opcodes::lw(9, 8, 0),
            opcodes::addi(8, 8, 4),
            opcodes::EBREAK,
        ])?;
        self.write_gpr(8, word_address)?;

        let mut words = Vec::with_capacity(count as usize);
        for i in 0..count {
            // Disable auto-execute before the penultimate word so reading
            // the last word's data-0 doesn't trigger one extra
            // program-buffer run past the end (spec §4.7).
            let last_two = i + 2 >= count;
            self.set_abstract_auto(!last_two)?;

            let mut control = AccessRegisterControl(0);
            control.set_regno(X9);
            control.set_transfer(true);
            control.set_postexec(i == 0);
            control.set_size(access_size::BITS_32);
            self.execute_abstract_command(control.0)?;
            words.push(self.dtm.read_dmi_register(address::DATA0)?);
        }
        self.set_abstract_auto(false)?;
        Ok(words)
    }

    /// Writes `words` via the program-buffer strategy, preserving and
    /// restoring `x8`/`x9` even on error.
    pub fn write_words_program_buffer(
        &mut self,
        word_address: u32,
        words: &[u32],
    ) -> Result<(), RiscvError> {
        let saved_x8 = self.read_gpr(8)?;
        let saved_x9 = self.read_gpr(9)?;

        let result = self.write_words_program_buffer_inner(word_address, words);

        let restore_x8 = self.write_gpr(8, saved_x8);
        let restore_x9 = self.write_gpr(9, saved_x9);
        if restore_x8.is_err() {
            return Err(RiscvError::RegisterRestoreFailed("x8"));
        }
        if restore_x9.is_err() {
            return Err(RiscvError::RegisterRestoreFailed("x9"));
        }

        result
    }

    fn write_words_program_buffer_inner(
        &mut self,
        word_address: u32,
        words: &[u32],
    ) -> Result<(), RiscvError> {
        self.write_program_buffer(&[
            opcodes::sw(8, 9, 0),
            opcodes::addi(8, 8, 4),
            opcodes::EBREAK,
        ])?;
        self.write_gpr(8, word_address)?;

        for &word in words {
            self.write_gpr(9, word)?;
            let mut control = AccessRegisterControl(0);
            control.set_regno(X9);
            control.set_transfer(false);
            control.set_postexec(true);
            control.set_size(access_size::BITS_32);
            self.execute_abstract_command(control.0)?;
        }
        Ok(())
    }

    fn write_program_buffer(&mut self, opcodes: &[u32]) -> Result<(), RiscvError> {
        let available = self
            .descriptor
            .as_ref()
            .map(|d| d.program_buffer_words as usize)
            .unwrap_or(0);
        if opcodes.len() > available {
            return Err(RiscvError::ProgramBufferTooSmall {
                needed: opcodes.len(),
                available,
            });
        }
        for (i, &opcode) in opcodes.iter().enumerate() {
            self.dtm
                .write_dmi_register(address::PROGBUF0 + i as u8, opcode)?;
        }
        Ok(())
    }

    fn set_abstract_auto(&mut self, enabled: bool) -> Result<(), RiscvError> {
        // autoexecdata bit 0 re-runs the program buffer on every data-0
        // access (spec §4.7's "streaming pipeline").
        self.dtm
            .write_dmi_register(address::ABSTRACTAUTO, if enabled { 1 } else { 0 })
    }

    /// Installs a hardware breakpoint at `address` using the next
    /// available trigger (spec §4.8).
    pub fn install_hardware_breakpoint(&mut self, address: u32) -> Result<(), RiscvError> {
        let mut bridge = CsrBridge(self);
        let mut triggers = std::mem::take(&mut bridge.0.triggers);
        let result = triggers.install_breakpoint(&mut bridge, address);
        bridge.0.triggers = triggers;
        result
    }

    /// Removes the hardware breakpoint at `address`, if tracked.
    pub fn remove_hardware_breakpoint(&mut self, address: u32) -> Result<(), RiscvError> {
        let mut bridge = CsrBridge(self);
        let mut triggers = std::mem::take(&mut bridge.0.triggers);
        let result = triggers.remove_breakpoint(&mut bridge, address);
        bridge.0.triggers = triggers;
        result
    }

    /// The active memory-access strategy for generic alignment-shim code.
    pub fn active_strategy(&self) -> Option<MemoryAccessStrategy> {
        self.active_strategy
    }

    /// Test-only shortcut past the full activation handshake: installs a
    /// descriptor directly so memory/register-access tests can run
    /// against a [`crate::riscv::dtm::fake::FakeDtm`] without simulating
    /// hart discovery.
    #[cfg(test)]
    pub(crate) fn activate_for_test(&mut self, descriptor: DebugModuleDescriptor) {
        self.selected_hart = descriptor.hart_indices.first().copied().unwrap_or(0);
        self.active_strategy = descriptor
            .supported_strategies
            .iter()
            .next()
            .copied();
        self.descriptor = Some(descriptor);
    }

    fn poll_until(
        &mut self,
        timeout_err: RiscvError,
        mut predicate: impl FnMut(&mut D) -> Result<bool, RiscvError>,
    ) -> Result<(), RiscvError> {
        let deadline = Instant::now() + self.response_timeout;
        loop {
            if predicate(&mut self.dtm)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(timeout_err);
            }
        }
    }
}

/// Adapts a [`RiscvTranslator`] to [`CsrAccess`] for the trigger module,
/// which only needs CSR-space register access.
struct CsrBridge<'a, D>(&'a mut RiscvTranslator<D>);

impl<D: DebugTransportModule> CsrAccess for CsrBridge<'_, D> {
    fn read_csr(&mut self, csr: u16) -> Result<u32, RiscvError> {
        self.0.read_register(csr)
    }

    fn write_csr(&mut self, csr: u16, value: u32) -> Result<(), RiscvError> {
        self.0.write_register(csr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riscv::dtm::fake::FakeDtm;

    fn activated_translator() -> RiscvTranslator<FakeDtm> {
        let mut dtm = FakeDtm::default();
        // A single hart: the "any-nonexistent" bit is set for every index
        // past 0, and every status poll reports halted/resumed/reset as
        // requested by whichever write just happened.
        dtm.registers.insert(address::DMSTATUS, 0);
        let mut translator = RiscvTranslator::new(dtm);

        // Skip the full activation handshake: a fake DTM that tracks
        // real hart-discovery bits is most of the value that would add,
        // and the individual steps are unit-tested through the public
        // halt/resume/step methods instead.
        translator.activate_for_test(DebugModuleDescriptor {
            hart_indices: vec![0],
            supported_strategies: HashSet::from([MemoryAccessStrategy::AbstractCommand]),
            abstract_data_count: 2,
            program_buffer_words: 4,
        });
        translator
    }

    #[test]
    fn register_write_then_read_round_trips() {
        let mut translator = activated_translator();
        translator.write_register(GPR_REGNO_BASE + 5, 0xdead_beef).unwrap();
        let value = translator.read_register(GPR_REGNO_BASE + 5).unwrap();
        assert_eq!(value, 0xdead_beef);
    }

    #[test]
    fn abstract_command_memory_round_trip() {
        let mut translator = activated_translator();
        translator
            .write_words_abstract_command(0x1000, &[1, 2, 3, 4])
            .unwrap();
        let words = translator.read_words_abstract_command(0x1000, 4).unwrap();
        assert_eq!(words, vec![1, 2, 3, 4]);
    }

    #[test]
    fn cmderr_is_cleared_after_reporting_exception() {
        let mut translator = activated_translator();
        translator
            .dtm
            .registers
            .insert(address::ABSTRACTCS, {
                let mut cs = Abstractcs(0);
                cs.set_cmderr(3); // exception
                cs.0
            });

        let result = translator.read_register(GPR_REGNO_BASE + 1);
        assert_eq!(
            result,
            Err(RiscvError::AbstractCommand(AbstractCommandErrorKind::Exception))
        );

        // The clearing write (write-1-to-clear: writing 0b111 clears the
        // field regardless of its prior value) must have been issued.
        let clear_write = translator
            .dtm
            .write_log
            .iter()
            .rev()
            .find(|(addr, _)| *addr == address::ABSTRACTCS)
            .expect("expected a write clearing cmderr");
        assert_eq!(Abstractcs(clear_write.1).cmderr(), 0b111);
    }
}
