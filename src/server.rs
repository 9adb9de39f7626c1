//! The single-threaded, event-driven GDB RSP server (spec §5): accepts one
//! client connection at a time, feeds its bytes through the packet codec,
//! dispatches parsed commands to [`crate::handlers`], and folds in
//! asynchronous stop-replies from the [`crate::bridge::TargetStateBridge`].

use std::net::SocketAddr;
use std::sync::mpsc;

use crate::bridge::TargetStateBridge;
use crate::config::Config;
use crate::error::CoreError;
use crate::handlers::{self, HandlerContext};
use crate::net::connection::{Accepted, Connection, EventLoop, ReadOutcome};
use crate::protocol::codec::{expand_run_length, Event};
use crate::protocol::command::Command;
use crate::protocol::response::Response;
use crate::protocol::Codec;
use crate::regmap::Architecture;
use crate::session::DebugSession;
use crate::target_controller::{ExecutionStateChange, TargetControllerService};

/// Ties together the wire layer, the command handlers, and the target
/// controller into the running server described by spec §5.
pub struct GdbServer {
    event_loop: EventLoop,
    config: Config,
    architecture: Architecture,
    controller: Box<dyn TargetControllerService>,
    bridge: TargetStateBridge,
}

impl GdbServer {
    /// Binds the listening socket. `controller` is whatever drives the
    /// physical target (a [`crate::riscv::translator::RiscvTranslator`] or
    /// an equivalent for another architecture); `state_events` is the
    /// channel the controller's owning thread uses to publish execution
    /// state changes observed outside of a direct command (spec §4.6).
    pub fn new(
        config: Config,
        architecture: Architecture,
        controller: Box<dyn TargetControllerService>,
        state_events: mpsc::Receiver<ExecutionStateChange>,
    ) -> Result<Self, CoreError> {
        let config = config.validated();
        let addr = SocketAddr::new(config.listening_ip, config.listening_port);
        let event_loop = EventLoop::bind(addr)?;

        Ok(Self {
            event_loop,
            config,
            architecture,
            controller,
            bridge: TargetStateBridge::new(state_events),
        })
    }

    /// Returns a handle that can interrupt whatever blocking operation the
    /// server is currently inside (used by the thread that owns the probe
    /// connection to wake the server after publishing a state change).
    pub fn notifier(&self) -> crate::net::notifier::Notifier {
        self.event_loop.notifier()
    }

    /// Runs the accept loop forever, serving one client connection at a
    /// time. Returns only on a fatal target failure; a client disconnect
    /// or communication error just returns the server to accepting.
    pub fn run(&mut self) -> Result<(), CoreError> {
        loop {
            let connection = match self.event_loop.accept()? {
                Accepted::Connection(connection) => connection,
                Accepted::Interrupted => continue,
            };

            tracing::info!("client connected");
            match self.serve(connection) {
                Ok(()) => tracing::info!("client disconnected"),
                Err(CoreError::TargetFailure(reason)) => {
                    tracing::error!(%reason, "fatal target failure; shutting down");
                    return Err(CoreError::TargetFailure(reason));
                }
                Err(err) => tracing::warn!(error = %err, "client session ended with an error"),
            }
        }
    }

    fn serve(&mut self, mut connection: Connection) -> Result<(), CoreError> {
        self.event_loop.register_connection(&mut connection)?;
        let mut session = DebugSession::new();
        let mut codec = Codec::new();
        let mut last_sent: Option<Vec<u8>> = None;
        let mut buf = [0u8; 4096];

        let result = loop {
            match self.event_loop.read_interruptible(&mut connection, &mut buf) {
                Ok(ReadOutcome::Data(n)) => {
                    let events = codec.feed(&buf[..n]);
                    if let Err(err) = self.handle_wire_events(
                        &mut connection,
                        &mut session,
                        events,
                        &mut last_sent,
                    ) {
                        break Err(err);
                    }
                }
                Ok(ReadOutcome::Interrupted) => {
                    if let Err(err) = self.drain_bridge(&mut connection, &mut session) {
                        break Err(err);
                    }
                }
                Err(err) => break Err(err),
            }
        };

        let _ = self.event_loop.deregister_connection(&mut connection);

        match result {
            Err(CoreError::ClientDisconnected) => Ok(()),
            other => other,
        }
    }

    fn handle_wire_events(
        &mut self,
        connection: &mut Connection,
        session: &mut DebugSession,
        events: Vec<Event>,
        last_sent: &mut Option<Vec<u8>>,
    ) -> Result<(), CoreError> {
        for event in events {
            match event {
                Event::Ack => {}
                Event::Nack => {
                    if let Some(bytes) = last_sent.clone() {
                        self.event_loop.write_interruptible(connection, &bytes)?;
                    }
                }
                Event::BadChecksum(_) => {
                    if self.acknowledgements_active(session) {
                        self.event_loop.write_interruptible(connection, b"-")?;
                    }
                }
                Event::Packet(frame) => {
                    if self.acknowledgements_active(session) {
                        self.event_loop.write_interruptible(connection, b"+")?;
                    }
                    let body = expand_run_length(&frame.body);
                    let response = match Command::parse(&body) {
                        Ok(command) => {
                            let mut ctx = HandlerContext {
                                session,
                                controller: self.controller.as_mut(),
                                architecture: self.architecture,
                                config: &self.config,
                            };
                            handlers::handle(command, &mut ctx)
                        }
                        Err(_) => Response::Text(String::new()),
                    };
                    self.send_response(connection, session, response, last_sent)?;
                }
                Event::Interrupt => {
                    let response = {
                        let mut ctx = HandlerContext {
                            session,
                            controller: self.controller.as_mut(),
                            architecture: self.architecture,
                            config: &self.config,
                        };
                        handlers::handle_interrupt(&mut ctx)
                    };
                    self.send_response(connection, session, response, last_sent)?;
                }
            }
        }
        Ok(())
    }

    fn send_response(
        &mut self,
        connection: &mut Connection,
        _session: &mut DebugSession,
        response: Response,
        last_sent: &mut Option<Vec<u8>>,
    ) -> Result<(), CoreError> {
        let Some(body) = response.render() else {
            return Ok(());
        };
        let packet = crate::protocol::codec::encode(&body);
        self.event_loop.write_interruptible(connection, &packet)?;
        *last_sent = Some(packet);
        Ok(())
    }

    fn drain_bridge(
        &mut self,
        connection: &mut Connection,
        session: &mut DebugSession,
    ) -> Result<(), CoreError> {
        for change in self.bridge.poll() {
            let response = self
                .bridge
                .handle_change(change, session, self.controller.as_mut());
            if let Some(response) = response {
                self.send_response(connection, session, response, &mut None)?;
            }
        }
        Ok(())
    }

    fn acknowledgements_active(&self, session: &DebugSession) -> bool {
        self.config.packet_acknowledgement_enabled && !session.no_ack_mode
    }
}
