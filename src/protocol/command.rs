//! Classification of a decoded packet body into a typed [`Command`].
//!
//! Dispatch is a tagged variant rather than a class hierarchy per command:
//! each handler matches on the tag and is independently testable, which is
//! the shape the source system's `CommandPacket` subclass hierarchy maps
//! onto in a language without run-time polymorphism.

use std::fmt;

/// A fully-parsed client command. Operands are parsed eagerly at
/// construction; anything malformed is rejected with a [`ParseError`]
/// before it ever reaches a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `?` — report why the target last stopped.
    QueryStopReason,
    /// `c[addr]` or `vCont;c[:thread]` — resume, optionally from `addr`.
    Continue { address: Option<u64> },
    /// `s[addr]` or `vCont;s[:thread]` — single-step, optionally from `addr`.
    Step { address: Option<u64> },
    /// `vCont;r start,end[:thread]` — range-step.
    RangeStep { start: u64, end: u64 },
    /// `D` — detach.
    Detach,
    /// `g` — read all general registers.
    ReadAllRegisters,
    /// `G<hex>` — write all general registers.
    WriteAllRegisters { data: Vec<u8> },
    /// `p<n>` — read register `n`.
    ReadRegister { number: u32 },
    /// `P<n>=<hex>` — write register `n`.
    WriteRegister { number: u32, data: Vec<u8> },
    /// `m addr,len` — read `len` bytes starting at `addr`.
    ReadMemory { address: u32, length: u32 },
    /// `M addr,len:<hex>` — write bytes starting at `addr`.
    WriteMemory { address: u32, data: Vec<u8> },
    /// `Z type,addr,kind` — insert a breakpoint/watchpoint.
    InsertBreakpoint {
        requested_type: BreakpointType,
        address: u32,
        kind: u32,
    },
    /// `z type,addr,kind` — remove a breakpoint/watchpoint.
    RemoveBreakpoint {
        requested_type: BreakpointType,
        address: u32,
        kind: u32,
    },
    /// `qSupported:feature+;feature-;feature=value;...`
    QuerySupported { client_features: Vec<(String, Option<String>)> },
    /// `qXfer:memory-map:read::offset,length`
    QueryMemoryMap { offset: u64, length: u64 },
    /// `vContSupported?` — (vCont;... dispatched separately by action)
    QueryVContSupported,
    /// `qRcmd,<hex>` — monitor command, decoded to text and tokenised.
    MonitorCommand(MonitorCommand),
    /// `vFlashErase:addr,length`
    FlashErase { address: u32, length: u32 },
    /// `vFlashWrite:addr:<binary data, already unescaped>`
    FlashWrite { address: u32, data: Vec<u8> },
    /// `vFlashDone`
    FlashDone,
    /// `QStartNoAckMode`
    StartNoAckMode,
}

/// The breakpoint/watchpoint type a client requested with `Z`/`z`.
///
/// Per spec §4.4/§9 (open question, codified behaviour): the server
/// records this but is free to ignore it and install whichever kind the
/// target actually supports for the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointType {
    Software,
    Hardware,
    WriteWatchpoint,
    ReadWatchpoint,
    AccessWatchpoint,
}

impl BreakpointType {
    fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(BreakpointType::Software),
            1 => Some(BreakpointType::Hardware),
            2 => Some(BreakpointType::WriteWatchpoint),
            3 => Some(BreakpointType::ReadWatchpoint),
            4 => Some(BreakpointType::AccessWatchpoint),
            _ => None,
        }
    }
}

/// A `qRcmd` monitor sub-command, dispatched on its first word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorCommand {
    Reset,
    Version { machine: bool },
    Help,
    Svd,
    EepromFill,
    ListRegisters,
    ReadRegister(String),
    WriteRegister { name: String, value: String },
    Unknown(String),
}

/// Failure to parse a packet body into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

impl Command {
    /// Classifies and parses a decoded, unescaped, run-length-expanded
    /// packet body.
    pub fn parse(body: &[u8]) -> Result<Command, ParseError> {
        let text = || String::from_utf8_lossy(body).into_owned();

        if body.is_empty() {
            return Err(ParseError("empty packet body".into()));
        }

        if body == b"?" {
            return Ok(Command::QueryStopReason);
        }
        if body == b"D" {
            return Ok(Command::Detach);
        }
        if body == b"g" {
            return Ok(Command::ReadAllRegisters);
        }
        if body == b"QStartNoAckMode" {
            return Ok(Command::StartNoAckMode);
        }
        if body == b"vFlashDone" {
            return Ok(Command::FlashDone);
        }
        if body == b"vContSupported?" || body == b"vCont?" {
            return Ok(Command::QueryVContSupported);
        }

        match body[0] {
            b'c' => {
                let rest = &body[1..];
                return Ok(Command::Continue {
                    address: parse_optional_hex_u64(rest)?,
                });
            }
            b's' => {
                let rest = &body[1..];
                return Ok(Command::Step {
                    address: parse_optional_hex_u64(rest)?,
                });
            }
            b'G' => {
                let data = hex_decode(&body[1..])?;
                return Ok(Command::WriteAllRegisters { data });
            }
            b'p' => {
                let number = parse_hex_u32(&body[1..])?;
                return Ok(Command::ReadRegister { number });
            }
            b'P' => {
                let rest = &body[1..];
                let eq = find_byte(rest, b'=').ok_or_else(|| ParseError("P: missing '='".into()))?;
                let number = parse_hex_u32(&rest[..eq])?;
                let data = hex_decode(&rest[eq + 1..])?;
                return Ok(Command::WriteRegister { number, data });
            }
            b'm' => {
                let (address, length) = parse_addr_len(&body[1..])?;
                return Ok(Command::ReadMemory {
                    address: address as u32,
                    length: length as u32,
                });
            }
            b'M' => {
                let rest = &body[1..];
                let colon =
                    find_byte(rest, b':').ok_or_else(|| ParseError("M: missing ':'".into()))?;
                let (address, length) = parse_addr_len(&rest[..colon])?;
                let data = hex_decode(&rest[colon + 1..])?;
                if data.len() as u64 != length {
                    return Err(ParseError("M: data length does not match header".into()));
                }
                return Ok(Command::WriteMemory {
                    address: address as u32,
                    data,
                });
            }
            b'Z' => return parse_breakpoint(&body[1..]).map(|(t, a, k)| Command::InsertBreakpoint {
                requested_type: t,
                address: a,
                kind: k,
            }),
            b'z' => return parse_breakpoint(&body[1..]).map(|(t, a, k)| Command::RemoveBreakpoint {
                requested_type: t,
                address: a,
                kind: k,
            }),
            _ => {}
        }

        if let Some(rest) = strip_prefix(body, b"qSupported") {
            let rest = rest.strip_prefix(b":" as &[u8]).unwrap_or(rest);
            let client_features = parse_feature_list(rest)?;
            return Ok(Command::QuerySupported { client_features });
        }

        if let Some(rest) = strip_prefix(body, b"qXfer:memory-map:read::") {
            let comma =
                find_byte(rest, b',').ok_or_else(|| ParseError("qXfer: missing ','".into()))?;
            let offset = parse_hex_u64(&rest[..comma])?;
            let length = parse_hex_u64(&rest[comma + 1..])?;
            return Ok(Command::QueryMemoryMap { offset, length });
        }

        if let Some(rest) = strip_prefix(body, b"qRcmd,") {
            let decoded = hex_decode(rest)?;
            return Ok(Command::MonitorCommand(parse_monitor_command(&decoded)));
        }

        if let Some(rest) = strip_prefix(body, b"vCont;c") {
            let _ = rest;
            return Ok(Command::Continue { address: None });
        }
        if let Some(rest) = strip_prefix(body, b"vCont;s") {
            let _ = rest;
            return Ok(Command::Step { address: None });
        }
        if let Some(rest) = strip_prefix(body, b"vCont;r") {
            let comma = find_byte(rest, b',').ok_or_else(|| ParseError("vCont;r: missing ','".into()))?;
            let end_field = &rest[comma + 1..];
            let end = match find_byte(end_field, b':') {
                Some(colon) => parse_hex_u64(&end_field[..colon])?,
                None => parse_hex_u64(end_field)?,
            };
            let start = parse_hex_u64(&rest[..comma])?;
            return Ok(Command::RangeStep { start, end });
        }

        if let Some(rest) = strip_prefix(body, b"vFlashErase:") {
            let comma =
                find_byte(rest, b',').ok_or_else(|| ParseError("vFlashErase: missing ','".into()))?;
            let address = parse_hex_u32(&rest[..comma])?;
            let length = parse_hex_u32(&rest[comma + 1..])?;
            return Ok(Command::FlashErase { address, length });
        }

        if let Some(rest) = strip_prefix(body, b"vFlashWrite:") {
            let colon =
                find_byte(rest, b':').ok_or_else(|| ParseError("vFlashWrite: missing second ':'".into()))?;
            let address = parse_hex_u32(&rest[..colon])?;
            let data = rest[colon + 1..].to_vec();
            return Ok(Command::FlashWrite { address, data });
        }

        Err(ParseError(format!("unrecognised command: {}", text())))
    }
}

fn strip_prefix<'a>(body: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    if body.starts_with(prefix) {
        Some(&body[prefix.len()..])
    } else {
        None
    }
}

fn find_byte(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

fn parse_hex_u32(bytes: &[u8]) -> Result<u32, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError("invalid utf-8 in hex field".into()))?;
    u32::from_str_radix(text, 16).map_err(|_| ParseError(format!("invalid hex u32: {text}")))
}

fn parse_hex_u64(bytes: &[u8]) -> Result<u64, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError("invalid utf-8 in hex field".into()))?;
    u64::from_str_radix(text, 16).map_err(|_| ParseError(format!("invalid hex u64: {text}")))
}

fn parse_optional_hex_u64(bytes: &[u8]) -> Result<Option<u64>, ParseError> {
    if bytes.is_empty() {
        Ok(None)
    } else {
        parse_hex_u64(bytes).map(Some)
    }
}

fn parse_addr_len(bytes: &[u8]) -> Result<(u64, u64), ParseError> {
    let comma = find_byte(bytes, b',').ok_or_else(|| ParseError("missing ',' in address,length".into()))?;
    let address = parse_hex_u64(&bytes[..comma])?;
    let length = parse_hex_u64(&bytes[comma + 1..])?;
    Ok((address, length))
}

fn parse_breakpoint(bytes: &[u8]) -> Result<(BreakpointType, u32, u32), ParseError> {
    let first_comma = find_byte(bytes, b',').ok_or_else(|| ParseError("Z/z: missing ','".into()))?;
    let type_digit = bytes
        .get(..first_comma)
        .and_then(|s| std::str::from_utf8(s).ok())
        .and_then(|s| s.parse::<u8>().ok())
        .ok_or_else(|| ParseError("Z/z: invalid type digit".into()))?;
    let requested_type = BreakpointType::from_digit(type_digit)
        .ok_or_else(|| ParseError(format!("Z/z: unknown breakpoint type {type_digit}")))?;

    let rest = &bytes[first_comma + 1..];
    let second_comma = find_byte(rest, b',').ok_or_else(|| ParseError("Z/z: missing second ','".into()))?;
    let address = parse_hex_u32(&rest[..second_comma])?;
    let kind = parse_hex_u32(&rest[second_comma + 1..])?;
    Ok((requested_type, address, kind))
}

fn parse_feature_list(bytes: &[u8]) -> Result<Vec<(String, Option<String>)>, ParseError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError("invalid utf-8 in feature list".into()))?;
    let mut features = Vec::new();
    for item in text.split(';') {
        if item.is_empty() {
            continue;
        }
        if let Some(stripped) = item.strip_suffix('+') {
            features.push((stripped.to_string(), None));
        } else if let Some(stripped) = item.strip_suffix('-') {
            features.push((stripped.to_string(), Some("-".to_string())));
        } else if let Some(eq) = item.find('=') {
            features.push((item[..eq].to_string(), Some(item[eq + 1..].to_string())));
        } else {
            features.push((item.to_string(), None));
        }
    }
    Ok(features)
}

fn parse_monitor_command(decoded: &[u8]) -> MonitorCommand {
    let text = String::from_utf8_lossy(decoded);
    let mut words = text.split_whitespace();
    match words.next() {
        Some("reset") => MonitorCommand::Reset,
        Some("version") => MonitorCommand::Version {
            machine: words.next() == Some("machine"),
        },
        Some("help") => MonitorCommand::Help,
        Some("svd") => MonitorCommand::Svd,
        Some("eeprom") if words.next() == Some("fill") => MonitorCommand::EepromFill,
        Some("lr") => MonitorCommand::ListRegisters,
        Some("rr") => words
            .next()
            .map(|name| MonitorCommand::ReadRegister(name.to_string()))
            .unwrap_or_else(|| MonitorCommand::Unknown(text.to_string())),
        Some("wr") => {
            let name = words.next();
            let value = words.next();
            match (name, value) {
                (Some(name), Some(value)) => MonitorCommand::WriteRegister {
                    name: name.to_string(),
                    value: value.to_string(),
                },
                _ => MonitorCommand::Unknown(text.to_string()),
            }
        }
        _ => MonitorCommand::Unknown(text.to_string()),
    }
}

/// Decodes a hex-digit-pair-per-byte string into raw bytes.
pub fn hex_decode(bytes: &[u8]) -> Result<Vec<u8>, ParseError> {
    if bytes.len() % 2 != 0 {
        return Err(ParseError("hex string has odd length".into()));
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let text = std::str::from_utf8(pair).map_err(|_| ParseError("invalid utf-8 in hex string".into()))?;
        let byte = u8::from_str_radix(text, 16).map_err(|_| ParseError(format!("invalid hex byte: {text}")))?;
        out.push(byte);
    }
    Ok(out)
}
