//! The RISC-V trigger module: hardware breakpoint/watchpoint resources
//! addressed through CSRs, per spec §4.8.

use std::collections::{HashMap, HashSet};

use crate::riscv::error::RiscvError;
use crate::riscv::regs::{MatchControl, TriggerAction};

/// CSR addresses for the trigger module (RISC-V Debug Specification).
pub mod csr {
    pub const TSELECT: u16 = 0x7a0;
    pub const TDATA1: u16 = 0x7a1;
    pub const TDATA2: u16 = 0x7a2;
    pub const TINFO: u16 = 0x7a4;
}

/// A value of `0x01` in `tinfo` means "no trigger implemented here,"
/// terminating discovery (spec §4.8).
const TINFO_NO_TRIGGER: u32 = 0x01;

/// Reads and writes the CSR space, as the translator's register-access
/// abstract commands provide. Kept separate from
/// [`crate::riscv::dtm::DebugTransportModule`] because triggers are
/// addressed as architectural CSRs, not DMI registers.
pub trait CsrAccess {
    fn read_csr(&mut self, csr: u16) -> Result<u32, RiscvError>;
    fn write_csr(&mut self, csr: u16, value: u32) -> Result<(), RiscvError>;
}

/// One discovered trigger slot and the types it reported supporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDescriptor {
    pub index: u16,
    pub supported_types: Vec<TriggerType>,
}

/// Trigger types the `tinfo` CSR can report, per spec §3 GLOSSARY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    Legacy,
    MatchControl,
    InstructionCount,
    Interrupt,
    Exception,
    MatchControlV6,
    External,
}

impl TriggerType {
    fn from_info_bit(bit: u32) -> Option<Self> {
        match bit {
            1 => Some(TriggerType::Legacy),
            2 => Some(TriggerType::MatchControl),
            3 => Some(TriggerType::InstructionCount),
            4 => Some(TriggerType::Interrupt),
            5 => Some(TriggerType::Exception),
            6 => Some(TriggerType::MatchControlV6),
            15 => Some(TriggerType::External),
            _ => None,
        }
    }
}

/// Tracks allocated hardware breakpoints by target address and owns the
/// discovered trigger set for one activated debug session.
#[derive(Debug, Default)]
pub struct TriggerModule {
    discovered: Vec<TriggerDescriptor>,
    allocated: HashMap<u32, u16>,
    allocated_indices: HashSet<u16>,
}

impl TriggerModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerates every trigger slot starting at 0, stopping at the first
    /// index that reports "no trigger" or that rejects trigger-select.
    pub fn discover(&mut self, csr: &mut impl CsrAccess) -> Result<(), RiscvError> {
        self.discovered.clear();
        for index in 0u16.. {
            csr.write_csr(csr::TSELECT, index as u32)?;
            let readback = csr.read_csr(csr::TSELECT)?;
            if readback != index as u32 {
                break;
            }

            let info = csr.read_csr(csr::TINFO)?;
            if info == TINFO_NO_TRIGGER {
                break;
            }

            let supported_types = (0..16)
                .filter(|bit| info & (1 << bit) != 0)
                .filter_map(TriggerType::from_info_bit)
                .collect();

            self.discovered.push(TriggerDescriptor {
                index,
                supported_types,
            });
        }
        Ok(())
    }

    pub fn discovered(&self) -> &[TriggerDescriptor] {
        &self.discovered
    }

    /// Installs a hardware breakpoint at `address` using the first
    /// available match-control-capable trigger.
    pub fn install_breakpoint(
        &mut self,
        csr: &mut impl CsrAccess,
        address: u32,
    ) -> Result<(), RiscvError> {
        let index = self
            .discovered
            .iter()
            .map(|d| d.index)
            .find(|i| !self.allocated_indices.contains(i))
            .ok_or(RiscvError::NoSuitableTrigger)?;

        csr.write_csr(csr::TSELECT, index as u32)?;

        let mut match_control = MatchControl(0);
        match_control.set_execute(true);
        match_control.set_u_mode(true);
        match_control.set_s_mode(true);
        match_control.set_m_mode(true);
        match_control.set_match_kind(0); // exact address match
        match_control.set_action(TriggerAction::EnterDebugMode.code());
        // any access size: leave sizelo/sizehi at 0.
        csr.write_csr(csr::TDATA1, match_control.0)?;
        csr.write_csr(csr::TDATA2, address)?;

        self.allocated.insert(address, index);
        self.allocated_indices.insert(index);
        Ok(())
    }

    /// Removes the breakpoint at `address`, if one is tracked.
    pub fn remove_breakpoint(
        &mut self,
        csr: &mut impl CsrAccess,
        address: u32,
    ) -> Result<(), RiscvError> {
        if let Some(index) = self.allocated.remove(&address) {
            csr.write_csr(csr::TSELECT, index as u32)?;
            csr.write_csr(csr::TDATA1, 0)?;
            self.allocated_indices.remove(&index);
        }
        Ok(())
    }

    pub fn allocated_indices(&self) -> &HashSet<u16> {
        &self.allocated_indices
    }

    /// Clears every discovered trigger regardless of what this tracker
    /// has recorded, recovering from a crash that left residual state
    /// (spec §4.8).
    pub fn clear_all(&mut self, csr: &mut impl CsrAccess) -> Result<(), RiscvError> {
        for descriptor in &self.discovered {
            csr.write_csr(csr::TSELECT, descriptor.index as u32)?;
            csr.write_csr(csr::TDATA1, 0)?;
        }
        self.allocated.clear();
        self.allocated_indices.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCsr {
        tselect: u32,
        tinfo_by_index: Vec<u32>,
        written: Vec<(u16, u32)>,
    }

    impl CsrAccess for FakeCsr {
        fn read_csr(&mut self, address: u16) -> Result<u32, RiscvError> {
            Ok(match address {
                csr::TSELECT => self.tselect,
                csr::TINFO => *self
                    .tinfo_by_index
                    .get(self.tselect as usize)
                    .unwrap_or(&TINFO_NO_TRIGGER),
                _ => 0,
            })
        }

        fn write_csr(&mut self, address: u16, value: u32) -> Result<(), RiscvError> {
            self.written.push((address, value));
            if address == csr::TSELECT {
                self.tselect = value;
            }
            Ok(())
        }
    }

    fn two_trigger_csr() -> FakeCsr {
        FakeCsr {
            tselect: 0,
            // two match-control-capable triggers, then "no trigger" for index 2.
            tinfo_by_index: vec![1 << 2, 1 << 2, TINFO_NO_TRIGGER],
            written: Vec::new(),
        }
    }

    #[test]
    fn discovers_triggers_until_no_trigger_reported() {
        let mut module = TriggerModule::new();
        let mut csr = two_trigger_csr();
        module.discover(&mut csr).unwrap();
        assert_eq!(module.discovered().len(), 2);
    }

    #[test]
    fn install_then_remove_leaves_allocated_set_unchanged() {
        let mut module = TriggerModule::new();
        let mut csr = two_trigger_csr();
        module.discover(&mut csr).unwrap();

        let before = module.allocated_indices().clone();
        module.install_breakpoint(&mut csr, 0x8000_0100).unwrap();
        module.remove_breakpoint(&mut csr, 0x8000_0100).unwrap();
        assert_eq!(*module.allocated_indices(), before);
    }

    #[test]
    fn exhausted_triggers_fail_with_no_suitable_trigger() {
        let mut module = TriggerModule::new();
        let mut csr = FakeCsr {
            tselect: 0,
            tinfo_by_index: vec![TINFO_NO_TRIGGER],
            written: Vec::new(),
        };
        module.discover(&mut csr).unwrap();
        assert_eq!(
            module.install_breakpoint(&mut csr, 0x1000),
            Err(RiscvError::NoSuitableTrigger)
        );
    }
}
