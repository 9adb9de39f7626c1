//! Top-level error kinds for the debug bridge, one variant per recovery
//! policy named in the error-handling design (client disconnects drop the
//! session, target-operation failures become RSP error responses, a
//! [`CoreError::TargetFailure`] is the only kind that terminates the
//! server).

use std::io;

/// Errors surfaced by the GDB RSP server loop and its command handlers.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// The peer closed the connection mid-operation.
    #[error("client disconnected")]
    ClientDisconnected,

    /// A framing/checksum violation or I/O error occurred on the client
    /// connection.
    #[error("client communication error: {0}")]
    ClientCommunicationError(String),

    /// Feature negotiation could not be reconciled (e.g. the client
    /// advertised neither `swbreak` nor `hwbreak`).
    #[error("client is not supported: {0}")]
    ClientNotSupported(String),

    /// The target controller refused to attach a debug session.
    #[error("debug session initialisation failed: {0}")]
    DebugSessionInitialisationFailure(String),

    /// A blocking operation was cancelled via the interrupt notifier.
    #[error("debug server interrupted")]
    Interrupted,

    /// A single operation against the target failed. Recoverable: the
    /// handler that triggered it replies with an RSP error response and
    /// the session continues.
    #[error("target operation failed: {0}")]
    TargetOperationFailure(#[source] TargetOperationError),

    /// An invariant was broken in a way that leaves the target in an
    /// undefined state (e.g. a preserved CPU register could not be
    /// restored). Fatal: the server must terminate cleanly.
    #[error("fatal target failure: {0}")]
    TargetFailure(String),
}

impl From<io::Error> for CoreError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::ConnectionReset => {
                CoreError::ClientDisconnected
            }
            _ => CoreError::ClientCommunicationError(err.to_string()),
        }
    }
}

/// A single failed operation against the target controller or the RISC-V
/// translator underneath it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetOperationError {
    /// The operation timed out waiting for a device acknowledgement.
    #[error("operation timed out")]
    Timeout,

    /// The target raised an exception while servicing the operation
    /// (e.g. an illegal memory access during a program-buffer transfer).
    #[error("illegal memory access")]
    IllegalMemoryAccess,

    /// Insufficient breakpoint/trigger resources to satisfy the request.
    #[error("insufficient breakpoint resources")]
    InsufficientResources,

    /// Catch-all for operation failures with a human-readable cause.
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Maps this error onto an RSP error-response code, per §7: handlers
    /// catch target-operation failures and convert them into `E01`
    /// responses; anything else is a bug in the calling handler.
    pub fn rsp_error_code(&self) -> u8 {
        match self {
            CoreError::TargetOperationFailure(_) => 0x01,
            _ => 0x01,
        }
    }
}
