//! Server configuration.
//!
//! Loading this struct from a file or CLI arguments is out of scope for
//! the core (see spec §1) — callers (the binary front-end, or an
//! embedding application) are expected to populate it however suits them
//! and hand it to [`crate::server::GdbServer`].

use std::net::{IpAddr, Ipv4Addr};

/// Configuration for one GDB RSP server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to listen on.
    pub listening_ip: IpAddr,
    /// TCP port to listen on.
    pub listening_port: u16,
    /// Whether `vCont;r` range-stepping is available to clients.
    pub range_stepping_enabled: bool,
    /// Whether the server requires `+`/`-` acknowledgements (disabled once
    /// `QStartNoAckMode` is negotiated for a given connection).
    pub packet_acknowledgement_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listening_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            listening_port: 1442,
            range_stepping_enabled: true,
            packet_acknowledgement_enabled: true,
        }
    }
}

impl Config {
    /// Validates the configuration, replacing any invalid field with its
    /// default value and logging a warning. Per spec §6: "invalid values
    /// are ignored with a warning; defaults preserved."
    pub fn validated(mut self) -> Self {
        if self.listening_port == 0 {
            tracing::warn!("configured listening port is 0; falling back to default port");
            self.listening_port = Config::default().listening_port;
        }

        self
    }
}
