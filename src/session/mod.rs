//! Per-connection debug session state: negotiated features, breakpoint
//! tables, and the auxiliary flash-programming/range-stepping sessions,
//! per spec §3 and §4.5.

pub mod breakpoints;
pub mod flash;
pub mod stepping;

pub use breakpoints::{BreakpointEntry, BreakpointTable};
pub use flash::FlashSession;
pub use stepping::RangeStepSession;

/// A negotiated RSP feature and its optional value, as agreed during
/// `qSupported`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedFeature {
    pub name: String,
    pub value: Option<String>,
}

/// All state belonging to one client connection, created on accept and
/// destroyed on disconnect or fatal error (spec §3 "Lifecycles").
#[derive(Debug, Default)]
pub struct DebugSession {
    pub negotiated_features: Vec<NegotiatedFeature>,
    pub internal_breakpoints: BreakpointTable,
    pub external_breakpoints: BreakpointTable,
    /// True exactly when the last handled command was a resume/step-like
    /// command without a subsequent stop (spec §3 invariant).
    pub waiting_for_stop: bool,
    /// Set if an interrupt byte arrived while the target was being
    /// resumed and has not yet been serviced.
    pub pending_interrupt: bool,
    pub flash_session: Option<FlashSession>,
    pub range_step_session: Option<RangeStepSession>,
    /// Once `QStartNoAckMode` is negotiated, checksum-driven `+`/`-`
    /// acknowledgement is suppressed for the rest of the connection.
    pub no_ack_mode: bool,
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a resume/step command as issued: the next stop-reply is now
    /// expected and owed to the client.
    pub fn begin_waiting_for_stop(&mut self) {
        self.waiting_for_stop = true;
    }

    /// Clears the waiting-for-stop flag once a stop-reply has been sent.
    pub fn stop_reply_sent(&mut self) {
        self.waiting_for_stop = false;
    }
}
