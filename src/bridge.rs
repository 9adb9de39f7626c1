//! The Target-State Bridge (spec §4.6): turns execution-state-change
//! events from the target-controller service into the stop-replies the
//! client is owed, and implements the interrupt-during-resume handshake.

use std::sync::mpsc;

use crate::protocol::response::{Response, SIGNAL_INTERRUPT, SIGNAL_TRAP};
use crate::session::DebugSession;
use crate::target_controller::{ExecutionState, ExecutionStateChange, TargetControllerService};

/// The thread-id GDB stop-replies report. This crate only ever drives a
/// single hart/core, so the id is a constant rather than a real thread
/// registry.
const PRIMARY_THREAD_ID: u32 = 0;

/// Receives execution-state-change events published by the
/// target-controller service (typically from a thread that owns the
/// physical probe connection) and decides what, if anything, the server
/// owes the client as a result.
pub struct TargetStateBridge {
    events: mpsc::Receiver<ExecutionStateChange>,
}

impl TargetStateBridge {
    pub fn new(events: mpsc::Receiver<ExecutionStateChange>) -> Self {
        Self { events }
    }

    /// Drains any pending events without blocking.
    pub fn poll(&self) -> Vec<ExecutionStateChange> {
        self.events.try_iter().collect()
    }

    /// Applies one execution-state-change event to `session`, issuing
    /// target-controller calls as needed and returning the stop-reply to
    /// send, if any (spec §4.6).
    pub fn handle_change(
        &self,
        change: ExecutionStateChange,
        session: &mut DebugSession,
        controller: &mut dyn TargetControllerService,
    ) -> Option<Response> {
        match change.new_state {
            ExecutionState::Stopped if session.waiting_for_stop => {
                if session.range_step_session.take().is_some() {
                    let addresses: Vec<u32> = session.internal_breakpoints.addresses().collect();
                    for address in addresses {
                        let _ = controller.clear_breakpoint(crate::target_controller::MemoryAddress {
                            space: crate::target_controller::AddressSpace::Flash,
                            address,
                        });
                    }
                    session.internal_breakpoints.clear();
                }
                session.stop_reply_sent();
                Some(Response::StopReply {
                    signal: SIGNAL_TRAP,
                    thread_id: PRIMARY_THREAD_ID,
                })
            }
            ExecutionState::Running | ExecutionState::Stepping
                if session.waiting_for_stop && session.pending_interrupt =>
            {
                if controller.halt().is_err() {
                    return None;
                }
                session.pending_interrupt = false;
                session.stop_reply_sent();
                Some(Response::StopReply {
                    signal: SIGNAL_INTERRUPT,
                    thread_id: PRIMARY_THREAD_ID,
                })
            }
            _ => None,
        }
    }
}
