//! In-process test compositor.
//!
//! [`FakeCompositor`] runs a `wayland-server` display on a background
//! thread behind a `UnixStream::pair()`.  It advertises the globals of a
//! [`Script`], implements `next_control_v1` and answers `run_command` the
//! way the script says, logging what the client sent.

use crate::next::protocol::server::next_command_callback_v1::{self, NextCommandCallbackV1};
use crate::next::protocol::server::next_control_v1::{self, NextControlV1};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use wayland_server::backend::{ClientData, ClientId, DisconnectReason};
use wayland_server::protocol::wl_output::{self, WlOutput};
use wayland_server::{
    Client, DataInit, Dispatch, Display, DisplayHandle, GlobalDispatch, New, Resource,
};

/// How the compositor answers `run_command`.
#[derive(Debug, Clone)]
pub enum Reply {
    Success(String),
    Failure(String),
    /// Success, but only after the sync reply that follows the command.
    LateSuccess(String),
    /// A success immediately followed by a failure for the same callback.
    Twice { output: String, failure: String },
    /// `wl_display.error` on the control object instead of an answer.
    ProtocolError(String),
    /// Close the connection.
    Hangup,
}

/// One advertised global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advertise {
    /// `next_control_v1` version 1.
    Control,
    /// An unrelated `wl_output` version 4.
    Output,
}

/// What the compositor advertises and how it replies.
#[derive(Debug, Clone)]
pub struct Script {
    /// Globals in advertisement order.
    pub globals: Vec<Advertise>,
    pub reply: Reply,
}

impl Script {
    /// A compositor offering the control protocol among other globals.
    pub fn with_control(reply: Reply) -> Self {
        Self {
            globals: vec![Advertise::Output, Advertise::Control, Advertise::Output],
            reply,
        }
    }
}

/// What the compositor saw from the client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServerLog {
    /// Version of every `next_control_v1` bind.
    pub binds: Vec<u32>,
    pub arguments: Vec<String>,
    pub run_commands: usize,
}

struct Compositor {
    reply: Reply,
    log: ServerLog,
    deferred: Vec<(NextCommandCallbackV1, String)>,
    hangup: bool,
}

struct ClientState {
    gone: Arc<AtomicBool>,
}

impl ClientData for ClientState {
    fn disconnected(&self, _: ClientId, _: DisconnectReason) {
        self.gone.store(true, Ordering::SeqCst);
    }
}

pub struct FakeCompositor;

impl FakeCompositor {
    /// Start serving `script`; returns the client end and a handle that
    /// yields the log once the client hangs up.
    pub fn spawn(script: Script) -> (UnixStream, JoinHandle<ServerLog>) {
        let (client, server) = UnixStream::pair().expect("socket pair");
        let handle = std::thread::spawn(move || serve(server, script));
        (client, handle)
    }
}

fn serve(stream: UnixStream, script: Script) -> ServerLog {
    let mut display: Display<Compositor> = Display::new().expect("wayland display");
    let mut dh = display.handle();
    for global in &script.globals {
        match global {
            Advertise::Control => {
                dh.create_global::<Compositor, NextControlV1, ()>(1, ());
            }
            Advertise::Output => {
                dh.create_global::<Compositor, WlOutput, ()>(4, ());
            }
        }
    }

    let gone = Arc::new(AtomicBool::new(false));
    dh.insert_client(stream, Arc::new(ClientState { gone: gone.clone() }))
        .expect("insert client");

    let mut state = Compositor {
        reply: script.reply,
        log: ServerLog::default(),
        deferred: Vec::new(),
        hangup: false,
    };
    let deadline = Instant::now() + Duration::from_secs(10);
    while !gone.load(Ordering::SeqCst) && !state.hangup && Instant::now() < deadline {
        // Answers deferred in the previous pass go out after that pass's
        // sync replies were flushed.
        let late = std::mem::take(&mut state.deferred);
        if display.dispatch_clients(&mut state).is_err() {
            break;
        }
        for (callback, output) in late {
            callback.success(output);
        }
        if display.flush_clients().is_err() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    state.log
}

impl GlobalDispatch<NextControlV1, ()> for Compositor {
    fn bind(
        state: &mut Self,
        _: &DisplayHandle,
        _: &Client,
        resource: New<NextControlV1>,
        _: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let control = data_init.init(resource, ());
        state.log.binds.push(control.version());
    }
}

impl Dispatch<NextControlV1, ()> for Compositor {
    fn request(
        state: &mut Self,
        _: &Client,
        resource: &NextControlV1,
        request: next_control_v1::Request,
        _: &(),
        _: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            next_control_v1::Request::AddArgument { argument } => {
                state.log.arguments.push(argument);
            }
            next_control_v1::Request::RunCommand { callback } => {
                state.log.run_commands += 1;
                let callback = data_init.init(callback, ());
                match state.reply.clone() {
                    Reply::Success(output) => callback.success(output),
                    Reply::Failure(message) => callback.failure(message),
                    Reply::LateSuccess(output) => state.deferred.push((callback, output)),
                    Reply::Twice { output, failure } => {
                        callback.success(output);
                        callback.failure(failure);
                    }
                    Reply::ProtocolError(message) => resource.post_error(0u32, message),
                    Reply::Hangup => state.hangup = true,
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<NextCommandCallbackV1, ()> for Compositor {
    fn request(
        _: &mut Self,
        _: &Client,
        _: &NextCommandCallbackV1,
        _: next_command_callback_v1::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
    }
}

impl GlobalDispatch<WlOutput, ()> for Compositor {
    fn bind(
        _: &mut Self,
        _: &DisplayHandle,
        _: &Client,
        resource: New<WlOutput>,
        _: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<WlOutput, ()> for Compositor {
    fn request(
        _: &mut Self,
        _: &Client,
        _: &WlOutput,
        _: wl_output::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
    }
}
