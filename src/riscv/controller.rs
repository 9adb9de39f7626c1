//! Adapts a [`RiscvTranslator`] to the
//! [`crate::target_controller::TargetControllerService`] boundary the
//! server's handlers actually call through.

use crate::error::TargetOperationError;
use crate::riscv::dtm::DebugTransportModule;
use crate::riscv::error::RiscvError;
use crate::riscv::translator::{ExecutionState as RiscvExecutionState, RiscvTranslator};
use crate::target_controller::{
    AddressSpace, ExecutionState, InstalledBreakpointKind, MemoryAddress, PinState,
    RegisterDescriptor, TargetControllerService,
};

/// CSR address of `dpc`, the debug program counter, per the RISC-V Debug
/// Specification.
const DPC_CSR: u16 = 0x7b1;

impl From<RiscvError> for TargetOperationError {
    fn from(err: RiscvError) -> Self {
        match err {
            RiscvError::Timeout(_) => TargetOperationError::Timeout,
            RiscvError::AbstractCommand(crate::riscv::error::AbstractCommandErrorKind::Exception) => {
                TargetOperationError::IllegalMemoryAccess
            }
            RiscvError::NoSuitableTrigger | RiscvError::ProgramBufferTooSmall { .. } => {
                TargetOperationError::InsufficientResources
            }
            other => TargetOperationError::Other(other.to_string()),
        }
    }
}

impl<D: DebugTransportModule + std::fmt::Debug> TargetControllerService for RiscvTranslator<D> {
    fn read_cpu_register(&mut self, register: &RegisterDescriptor) -> Result<Vec<u8>, TargetOperationError> {
        let value = if register.name == "pc" {
            self.read_register(DPC_CSR)?
        } else {
            self.read_gpr(register.id as u8)?
        };
        Ok(value.to_le_bytes().to_vec())
    }

    fn write_cpu_register(
        &mut self,
        register: &RegisterDescriptor,
        value: &[u8],
    ) -> Result<(), TargetOperationError> {
        let word = u32::from_le_bytes(value.try_into().map_err(|_| {
            TargetOperationError::Other("register write payload must be 4 bytes".into())
        })?);
        if register.name == "pc" {
            self.write_register(DPC_CSR, word)?;
        } else {
            self.write_gpr(register.id as u8, word)?;
        }
        Ok(())
    }

    fn read_memory(
        &mut self,
        address: MemoryAddress,
        length: u32,
        _excluded_ranges: &[(u32, u32)],
    ) -> Result<Vec<u8>, TargetOperationError> {
        Ok(self.read_memory(address.address, length)?)
    }

    fn write_memory(&mut self, address: MemoryAddress, bytes: &[u8]) -> Result<(), TargetOperationError> {
        Ok(self.write_memory(address.address, bytes)?)
    }

    fn set_breakpoint(
        &mut self,
        address: MemoryAddress,
        _kind: u32,
    ) -> Result<InstalledBreakpointKind, TargetOperationError> {
        self.install_hardware_breakpoint(address.address)?;
        Ok(InstalledBreakpointKind::Hardware)
    }

    fn clear_breakpoint(&mut self, address: MemoryAddress) -> Result<(), TargetOperationError> {
        Ok(self.remove_hardware_breakpoint(address.address)?)
    }

    fn halt(&mut self) -> Result<(), TargetOperationError> {
        Ok(RiscvTranslator::halt(self)?)
    }

    fn resume(&mut self, from_address: Option<u32>) -> Result<(), TargetOperationError> {
        if let Some(address) = from_address {
            self.write_register(DPC_CSR, address)?;
        }
        Ok(RiscvTranslator::resume(self)?)
    }

    fn step(&mut self, from_address: Option<u32>) -> Result<(), TargetOperationError> {
        if let Some(address) = from_address {
            self.write_register(DPC_CSR, address)?;
        }
        Ok(RiscvTranslator::step(self)?)
    }

    fn reset(&mut self) -> Result<(), TargetOperationError> {
        Ok(RiscvTranslator::reset(self)?)
    }

    fn get_state(&mut self) -> Result<ExecutionState, TargetOperationError> {
        Ok(match self.execution_state()? {
            RiscvExecutionState::Running => ExecutionState::Running,
            RiscvExecutionState::Stopped => ExecutionState::Stopped,
        })
    }

    fn get_pin_states(&mut self) -> Result<Vec<PinState>, TargetOperationError> {
        // The RISC-V debug module has no concept of GPIO pins; pin
        // diagnostics are a peripheral-level concern outside this
        // translator's scope.
        Ok(Vec::new())
    }

    fn enter_programming_mode(&mut self) -> Result<(), TargetOperationError> {
        Ok(RiscvTranslator::halt(self)?)
    }

    fn leave_programming_mode(&mut self) -> Result<(), TargetOperationError> {
        Ok(())
    }

    fn program_flash(&mut self, address: u32, bytes: &[u8]) -> Result<(), TargetOperationError> {
        // Targets where flash is reachable through the same system bus
        // the debug module already addresses (common on RISC-V
        // microcontrollers with a memory-mapped flash controller) can be
        // programmed with ordinary word-aligned writes; a target needing
        // a vendor-specific flash algorithm would plug in here instead.
        Ok(RiscvTranslator::write_memory(self, address, bytes)?)
    }
}

#[allow(unused)]
fn _address_space_is_irrelevant_for_riscv() -> AddressSpace {
    // RISC-V exposes one flat system bus; this exists only to note, in
    // one place, why `MemoryAddress::space` is ignored above.
    AddressSpace::Flash
}
