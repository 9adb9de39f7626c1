//! The single [`mio::Poll`] instance the whole server loop blocks on, and
//! the accept/read/write operations layered over it.
//!
//! Per spec §5, exactly three operations may suspend the server thread —
//! accept, read, write — and all three must be interruptible by the
//! notifier. This module is where that contract is enforced; everything
//! above it (the session and handlers) only ever sees "got bytes" or
//! "got interrupted."

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token, Waker};

use crate::error::CoreError;
use crate::net::notifier::Notifier;

const LISTENER: Token = Token(0);
const NOTIFIER: Token = Token(1);
const CONNECTION: Token = Token(2);

/// Owns the server's single `Poll` registry across its whole lifetime.
/// Only one client connection is ever registered at a time, matching the
/// "single debug probe, single session" resource policy in spec §5.
pub struct EventLoop {
    poll: Poll,
    events: Events,
    listener: TcpListener,
    notifier: Notifier,
}

/// Outcome of a blocking accept.
pub enum Accepted {
    Connection(Connection),
    Interrupted,
}

/// Outcome of a blocking, interruptible read.
pub enum ReadOutcome {
    Data(usize),
    Interrupted,
}

/// A connected client socket, registered with the owning [`EventLoop`].
pub struct Connection {
    stream: TcpStream,
}

impl EventLoop {
    /// Binds the listening socket and sets up the shared poll registry.
    pub fn bind(addr: SocketAddr) -> Result<Self, CoreError> {
        let poll = Poll::new().map_err(CoreError::from)?;
        let mut listener = TcpListener::bind(addr).map_err(CoreError::from)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(CoreError::from)?;

        let waker = Waker::new(poll.registry(), NOTIFIER).map_err(CoreError::from)?;

        Ok(Self {
            poll,
            events: Events::with_capacity(16),
            listener,
            notifier: Notifier::new(waker),
        })
    }

    /// Returns a cloneable handle other threads can use to interrupt the
    /// currently-blocked operation.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Blocks until a client connects or the notifier fires.
    pub fn accept(&mut self) -> Result<Accepted, CoreError> {
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => return Ok(Accepted::Connection(Connection { stream })),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(err.into()),
            }

            if self.wait_for_readiness()? {
                return Ok(Accepted::Interrupted);
            }
        }
    }

    /// Registers an accepted connection's socket with the poll registry.
    /// Must be called once, before the first read/write.
    pub fn register_connection(&mut self, connection: &mut Connection) -> Result<(), CoreError> {
        self.poll
            .registry()
            .register(
                &mut connection.stream,
                CONNECTION,
                Interest::READABLE | Interest::WRITABLE,
            )
            .map_err(CoreError::from)
    }

    /// Deregisters a connection's socket, e.g. on detach or disconnect.
    pub fn deregister_connection(&mut self, connection: &mut Connection) -> Result<(), CoreError> {
        self.poll
            .registry()
            .deregister(&mut connection.stream)
            .map_err(CoreError::from)
    }

    /// Reads into `buf`, blocking until at least one byte is available,
    /// the peer disconnects, or the notifier fires.
    pub fn read_interruptible(
        &mut self,
        connection: &mut Connection,
        buf: &mut [u8],
    ) -> Result<ReadOutcome, CoreError> {
        loop {
            match connection.stream.read(buf) {
                Ok(0) => return Err(CoreError::ClientDisconnected),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(err.into()),
            }

            if self.wait_for_readiness()? {
                return Ok(ReadOutcome::Interrupted);
            }
        }
    }

    /// Writes all of `buf`, blocking (and retrying on partial writes)
    /// until it is fully sent. Per spec §5 writes are interruptible, but
    /// an interrupt mid-write does not abandon the write: the notifier
    /// event is recorded for the caller to act on once the write drains,
    /// since a half-sent RSP packet would desynchronise the client.
    pub fn write_interruptible(
        &mut self,
        connection: &mut Connection,
        mut buf: &[u8],
    ) -> Result<bool, CoreError> {
        let mut interrupted = false;
        while !buf.is_empty() {
            match connection.stream.write(buf) {
                Ok(0) => return Err(CoreError::ClientDisconnected),
                Ok(n) => buf = &buf[n..],
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    if self.wait_for_readiness()? {
                        interrupted = true;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(interrupted)
    }

    /// Blocks on the poll registry. Returns `true` if the notifier fired.
    fn wait_for_readiness(&mut self) -> Result<bool, CoreError> {
        self.poll
            .poll(&mut self.events, Some(Duration::from_secs(3600)))
            .map_err(CoreError::from)?;

        let mut interrupted = false;
        for event in self.events.iter() {
            if event.token() == NOTIFIER {
                interrupted = true;
            }
        }
        Ok(interrupted)
    }
}
