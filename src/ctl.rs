//! The end-to-end command flow.
//!
//! 1. Ask for the registry and bind `next_control_v1` when it is announced.
//! 2. Round trip, so the announcement burst is known to be complete.
//! 3. Append every command token in order and run the command.
//! 4. Dispatch until the command callback settles.
//!
//! The binary only adds configuration and printing on top of [`run`].

use crate::next::control::{self, ControlError, NextControl, Outcome, OutcomeSender};
use crate::next::protocol::client::next_command_callback_v1::{self, NextCommandCallbackV1};
use crate::next::protocol::client::next_control_v1::{self, NextControlV1};
use crate::wayland::registry::{self, BindError, Global};
use crate::wayland::session::{ConnectionError, Session, SessionError};
use log::debug;
use std::ffi::OsString;
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::{Connection, Dispatch, QueueHandle};

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    /// Forward these tokens to the compositor.
    Run(Vec<String>),
}

/// Classify the arguments after the program name.
///
/// A help or version flag anywhere wins over running a command; the first
/// such flag decides which.  Tokens that are not valid UTF-8 cannot be sent
/// as protocol strings and are rejected rather than rewritten.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, CtlError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let raw: Vec<OsString> = args.into_iter().map(Into::into).collect();
    for token in &raw {
        match token.to_str() {
            Some("-h" | "--help") => return Ok(Invocation::Help),
            Some("-v" | "--version") => return Ok(Invocation::Version),
            _ => {}
        }
    }
    let tokens = raw
        .into_iter()
        .map(|token| {
            token
                .into_string()
                .map_err(|bad| CtlError::NonUtf8Argument(bad.to_string_lossy().into_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Invocation::Run(tokens))
}

/// Session state handed to every event handler.
#[derive(Debug, Default)]
pub struct Nextctl {
    control: Option<NextControl>,
    bind_error: Option<BindError>,
}

impl Dispatch<WlRegistry, ()> for Nextctl {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let Some(global) = Global::from_event(event) else {
            return;
        };
        if !global.is::<NextControlV1>() {
            return;
        }
        if state.control.is_some() {
            debug!("ignoring additional {} global {}", global.interface, global.name);
            return;
        }
        match registry::bind::<NextControlV1, _>(registry, &global, qh) {
            Ok(proxy) => state.control = Some(NextControl::new(proxy)),
            Err(e) => state.bind_error = Some(e),
        }
    }
}

impl Dispatch<NextControlV1, ()> for Nextctl {
    fn event(
        _: &mut Self,
        _: &NextControlV1,
        _: next_control_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<NextCommandCallbackV1, OutcomeSender> for Nextctl {
    fn event(
        _: &mut Self,
        _: &NextCommandCallbackV1,
        event: next_command_callback_v1::Event,
        sender: &OutcomeSender,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        control::deliver(sender, event);
    }
}

/// Fatal errors.  The messages are what the user sees after `ERROR: `.
#[derive(Debug, thiserror::Error)]
pub enum CtlError {
    #[error("Cannot connect to wayland display.")]
    Connection(#[from] ConnectionError),
    #[error("wayland dispatch failed.")]
    Dispatch(#[from] SessionError),
    #[error("Compositor doesn't implement NextControlV1.")]
    CapabilityMissing,
    #[error("cannot bind NextControlV1: {0}")]
    Bind(#[from] BindError),
    #[error("invalid command: {0}")]
    Control(#[from] ControlError),
    #[error("argument is not valid UTF-8: {0:?}")]
    NonUtf8Argument(String),
}

/// Run one command over an established session.
///
/// A compositor-reported failure is an `Ok(Outcome::Failed { .. })`; only
/// transport and capability problems are errors.
pub fn run(session: &mut Session<Nextctl>, args: &[String]) -> Result<Outcome, CtlError> {
    let mut state = Nextctl::default();

    let _registry = session.get_registry();
    session.roundtrip(&mut state)?;

    let mut control = match (state.control.take(), state.bind_error.take()) {
        (Some(control), _) => control,
        (None, Some(e)) => return Err(e.into()),
        (None, None) => return Err(CtlError::CapabilityMissing),
    };
    for token in args {
        control.append_argument(token)?;
    }
    let callback = control.run_command(&session.handle());
    Ok(callback.wait(session, &mut state)?)
}

/// Connect to the display and [`run`] one command.
pub fn connect_and_run(display: Option<&str>, args: &[String]) -> Result<Outcome, CtlError> {
    let mut session = Session::connect(display)?;
    run(&mut session, args)
}
