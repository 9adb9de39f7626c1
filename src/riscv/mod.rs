//! The RISC-V Debug Specification 0.13+ translator: turns the abstract
//! debug operations [`crate::target_controller::TargetControllerService`]
//! needs into Debug Module Interface register traffic.
//!
//! Grounded on `probe-rs`'s `architecture/riscv` module, restructured
//! around the module boundaries named in the spec rather than that
//! crate's single 2000-line `communication_interface.rs`: [`dtm`] (the
//! transport boundary), [`regs`] (bit-exact register layouts),
//! [`opcodes`] (RV32 instruction encoders), [`trigger`] (hardware
//! breakpoint resources), [`translator`] (activation and the
//! halt/resume/step/register/memory operations), and [`memory`] (the
//! alignment shim layered on top of it).

pub mod controller;
pub mod dtm;
pub mod error;
pub mod memory;
pub mod opcodes;
pub mod regs;
pub mod translator;
pub mod trigger;

pub use error::RiscvError;
pub use translator::{DebugModuleDescriptor, ExecutionState, MemoryAccessStrategy, RiscvTranslator};
