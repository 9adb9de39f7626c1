//! Response construction: the small set of reply shapes a handler can
//! produce, plus the stop-reply (`T` packet) the target-state bridge
//! emits asynchronously.

/// A handler's reply to a command, or the bridge's asynchronous
/// stop-reply. Each variant knows how to render itself into a packet
/// body; framing (`$...#cc`) is the codec's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK`
    Ok,
    /// Raw hex-encoded bytes, e.g. the result of a memory or register read.
    Hex(Vec<u8>),
    /// `E<nn>` — an RSP error response carrying an error code.
    Error(u8),
    /// A literal, already-formatted body (feature negotiation replies,
    /// monitor command text, etc).
    Text(String),
    /// `T<sig>thread:<id>;` — a stop-reply.
    StopReply { signal: u8, thread_id: u32 },
    /// No reply at all: the command's response is produced elsewhere
    /// (resume/step commands, whose reply is the eventual stop-reply).
    None,
}

/// Trap signal for a normal breakpoint/watchpoint stop, per the GDB
/// signal numbering (`SIGTRAP`).
pub const SIGNAL_TRAP: u8 = 5;
/// Signal reported when a resume was interrupted by the client.
pub const SIGNAL_INTERRUPT: u8 = 2;

impl Response {
    /// Renders this response into the packet body the codec should frame.
    /// Returns `None` for [`Response::None`], signalling "send nothing."
    pub fn render(&self) -> Option<Vec<u8>> {
        match self {
            Response::Ok => Some(b"OK".to_vec()),
            Response::Hex(bytes) => Some(hex_encode(bytes).into_bytes()),
            Response::Error(code) => Some(format!("E{code:02x}").into_bytes()),
            Response::Text(text) => Some(text.clone().into_bytes()),
            Response::StopReply { signal, thread_id } => {
                Some(format!("T{signal:02x}thread:{thread_id:02x};").into_bytes())
            }
            Response::None => None,
        }
    }
}

/// Encodes `bytes` as a lower-case hex string, two characters per byte.
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_renders_to_ok() {
        assert_eq!(Response::Ok.render(), Some(b"OK".to_vec()));
    }

    #[test]
    fn error_renders_with_two_hex_digits() {
        assert_eq!(Response::Error(1).render(), Some(b"E01".to_vec()));
    }

    #[test]
    fn hex_response_round_trips_through_hex_encode() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(
            Response::Hex(bytes.clone()).render(),
            Some(hex_encode(&bytes).into_bytes())
        );
        assert_eq!(hex_encode(&bytes), "deadbeef");
    }

    #[test]
    fn stop_reply_renders_interrupted_signal() {
        let body = Response::StopReply {
            signal: SIGNAL_INTERRUPT,
            thread_id: 0,
        }
        .render()
        .unwrap();
        assert_eq!(body, b"T02thread:00;".to_vec());
    }

    #[test]
    fn none_renders_nothing() {
        assert_eq!(Response::None.render(), None);
    }
}
