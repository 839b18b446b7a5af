//! Transport session and dispatch pump.
//!
//! A [`Session`] owns the connection to the display server and the one
//! event queue nextctl dispatches.  Events are delivered to the
//! [`Dispatch`] impls of the state type `D`, strictly in the order the
//! server sent them, and handlers receive that state by reference instead
//! of closing over shared globals.
//!
//! # Round trips
//!
//! [`Session::roundtrip`] is the synchronisation fence: the server answers
//! requests in order, so once it returns every event caused by earlier
//! requests has been handled.  Waiting happens inside the blocking socket
//! read.

use log::debug;
use std::io;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use wayland_client::protocol::wl_registry::WlRegistry;
use wayland_client::{ConnectError, Connection, Dispatch, DispatchError, EventQueue, QueueHandle};

/// Errors that prevent a connection from being established.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("wayland connect: {0}")]
    Env(#[from] ConnectError),
    #[error("XDG_RUNTIME_DIR is not set")]
    NoRuntimeDir,
    #[error("connect to {}: {source}", .path.display())]
    Socket {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that break a running session.  None of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Socket path for an explicit display name.
///
/// Absolute names are used as-is; relative ones live in `runtime_dir`.
pub fn socket_path(display: &str, runtime_dir: Option<&Path>) -> Result<PathBuf, ConnectionError> {
    let name = Path::new(display);
    if name.is_absolute() {
        return Ok(name.to_path_buf());
    }
    let runtime_dir = runtime_dir.ok_or(ConnectionError::NoRuntimeDir)?;
    Ok(runtime_dir.join(name))
}

/// One live connection to a Wayland display.
pub struct Session<D> {
    conn: Connection,
    queue: EventQueue<D>,
}

impl<D: 'static> Session<D> {
    /// Connect to the display.
    ///
    /// Without an explicit `display` the usual environment lookup applies
    /// (`WAYLAND_SOCKET`, then `WAYLAND_DISPLAY`, then `wayland-0`).
    pub fn connect(display: Option<&str>) -> Result<Self, ConnectionError> {
        match display.filter(|d| !d.is_empty()) {
            Some(display) => {
                let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from);
                let path = socket_path(display, runtime_dir.as_deref())?;
                debug!("connecting to {}", path.display());
                let stream = UnixStream::connect(&path)
                    .map_err(|source| ConnectionError::Socket { path, source })?;
                Self::from_socket(stream)
            }
            None => Ok(Self::new(Connection::connect_to_env()?)),
        }
    }

    /// Wrap an already-connected socket.
    pub fn from_socket(stream: UnixStream) -> Result<Self, ConnectionError> {
        Ok(Self::new(Connection::from_socket(stream)?))
    }

    fn new(conn: Connection) -> Self {
        let queue = conn.new_event_queue();
        Self { conn, queue }
    }

    /// Handle for creating objects whose events land on this session.
    pub fn handle(&self) -> QueueHandle<D> {
        self.queue.handle()
    }

    /// Send `wl_display.get_registry`.
    ///
    /// Globals are announced to `D`'s registry handler on the next
    /// dispatch.
    pub fn get_registry(&self) -> WlRegistry
    where
        D: Dispatch<WlRegistry, ()>,
    {
        self.conn.display().get_registry(&self.queue.handle(), ())
    }

    /// Flush queued requests, block until events arrive and dispatch them.
    /// Returns the number of events processed.
    pub fn dispatch_once(&mut self, state: &mut D) -> Result<usize, SessionError> {
        Ok(self.queue.blocking_dispatch(state)?)
    }

    /// Block until every event caused by previously sent requests has been
    /// dispatched.
    pub fn roundtrip(&mut self, state: &mut D) -> Result<usize, SessionError> {
        Ok(self.queue.roundtrip(state)?)
    }

    /// Dispatch until `done` holds for the state.
    ///
    /// There is no timeout: if the condition never becomes true this
    /// blocks for as long as the server keeps the connection open.
    pub fn dispatch_until<F>(&mut self, state: &mut D, mut done: F) -> Result<(), SessionError>
    where
        F: FnMut(&mut D) -> bool,
    {
        while !done(state) {
            self.dispatch_once(state)?;
        }
        Ok(())
    }
}
