//! The GDB Remote Serial Protocol wire layer: framing/escaping/checksums
//! ([`codec`]), command classification ([`command`]), and response
//! construction ([`response`]).

pub mod codec;
pub mod command;
pub mod response;

pub use codec::{Codec, Frame};
pub use command::Command;
pub use response::Response;
