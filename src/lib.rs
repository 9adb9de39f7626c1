//! An on-host GDB Remote Serial Protocol bridge for embedded debug probes.
//!
//! The crate implements the two hard parts of a debug bridge: a
//! single-threaded, event-driven GDB RSP server (see [`net`], [`protocol`],
//! [`session`], [`handlers`], [`bridge`]) and a translator from abstract
//! debug operations onto the RISC-V Debug Specification 0.13+ external
//! debug module (see [`riscv`]).
//!
//! Everything this crate talks to outside of those two subsystems — the
//! physical probe, the process that multiplexes probe access, ELF/target
//! description parsing, configuration loading — is an external
//! collaborator reached through the [`target_controller::TargetControllerService`]
//! and [`riscv::dtm::DebugTransportModule`] traits.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod net;
pub mod protocol;
pub mod regmap;
pub mod riscv;
pub mod server;
pub mod session;
pub mod target_controller;

pub use config::Config;
pub use error::CoreError;
pub use server::GdbServer;
