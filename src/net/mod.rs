//! The interruptible-I/O event loop: one OS readiness object polling the
//! listening socket, the active client connection, and an inter-thread
//! "interrupt" notifier, per spec §5.
//!
//! Built on [`mio`] rather than a general-purpose async runtime: the
//! server has exactly one socket active at a time and the only
//! cross-thread signal it needs is "wake up, something happened" — a
//! `Poll` plus a `Waker` is the whole readiness primitive the design
//! calls for. None of the example teachers in this crate's lineage
//! implement this interruptible-accept-loop pattern themselves (the
//! historical `gdb-server` snapshot used `async-std` instead), so this is
//! the one dependency this crate carries that no teacher uses — see
//! DESIGN.md.

pub mod connection;
pub mod notifier;

pub use connection::EventLoop;
pub use notifier::Notifier;
