//! The Debug Transport Module boundary (spec §6): the two primitive
//! operations the translator needs from whatever moves bytes to the
//! physical debug module (JTAG, a vendor probe's native DMI bridge,
//! etc). Grounded on `probe-rs`'s `Dtm`/`DtmAccess` split in
//! `architecture/riscv/dtm.rs` and `dtm/dtm_access.rs`, simplified to the
//! single-register read/write contract spec §6 actually names.

use crate::riscv::error::RiscvError;

/// Reads and writes 32-bit Debug Module Interface registers. A
/// communication failure is always treated as fatal by the translator
/// (spec §6): there is no degraded mode for a DMI that won't respond.
pub trait DebugTransportModule {
    fn read_dmi_register(&mut self, address: u8) -> Result<u32, RiscvError>;
    fn write_dmi_register(&mut self, address: u8, value: u32) -> Result<(), RiscvError>;
}

/// Debug Module register addresses the translator speaks to directly.
pub mod address {
    pub const DATA0: u8 = 0x04;
    pub const DATA1: u8 = 0x05;
    pub const DMCONTROL: u8 = 0x10;
    pub const DMSTATUS: u8 = 0x11;
    pub const ABSTRACTCS: u8 = 0x16;
    pub const COMMAND: u8 = 0x17;
    pub const ABSTRACTAUTO: u8 = 0x18;
    pub const PROGBUF0: u8 = 0x20;
}

/// A [`DebugTransportModule`] reached over a plain TCP connection to an
/// external probe-multiplexer process, rather than a vendor probe's
/// native transport driven in-process (spec: the process that
/// multiplexes probe access is an external collaborator). Frames are a
/// one-byte opcode (`0` read, `1` write), a one-byte DMI register
/// address, and for writes a little-endian `u32` value; reads expect a
/// little-endian `u32` reply, writes expect a one-byte acknowledgement.
#[derive(Debug)]
pub struct TcpDmiTransport {
    stream: std::net::TcpStream,
}

impl TcpDmiTransport {
    pub fn connect(addr: std::net::SocketAddr) -> Result<Self, RiscvError> {
        let stream = std::net::TcpStream::connect(addr)
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        Ok(Self { stream })
    }
}

impl DebugTransportModule for TcpDmiTransport {
    fn read_dmi_register(&mut self, address: u8) -> Result<u32, RiscvError> {
        use std::io::{Read, Write};
        self.stream
            .write_all(&[0, address])
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        let mut reply = [0u8; 4];
        self.stream
            .read_exact(&mut reply)
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        Ok(u32::from_le_bytes(reply))
    }

    fn write_dmi_register(&mut self, address: u8, value: u32) -> Result<(), RiscvError> {
        use std::io::{Read, Write};
        let mut frame = [0u8; 6];
        frame[0] = 1;
        frame[1] = address;
        frame[2..].copy_from_slice(&value.to_le_bytes());
        self.stream
            .write_all(&frame)
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        let mut ack = [0u8; 1];
        self.stream
            .read_exact(&mut ack)
            .map_err(|err| RiscvError::DtmCommunication(err.to_string()))?;
        Ok(())
    }
}
