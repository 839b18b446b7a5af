//! Client side of the `next_control_v1` protocol.
//!
//! Arguments are accumulated server-side with `add_argument`, then
//! `run_command` executes them and answers through a one-shot
//! `next_command_callback_v1` that receives exactly one of `success` /
//! `failure`.  The answer is handed back as an [`Outcome`] over a channel
//! whose sender is the callback object's user data, so the state type only
//! has to forward events with [`deliver`].

use crate::next::protocol::client::next_command_callback_v1::{self, NextCommandCallbackV1};
use crate::next::protocol::client::next_control_v1::NextControlV1;
use crate::wayland::session::{Session, SessionError};
use log::debug;
use std::sync::mpsc;
use wayland_client::{Dispatch, Proxy, QueueHandle};

/// User data of a command callback: where its outcome goes.
pub type OutcomeSender = mpsc::Sender<Outcome>;

/// Errors from building a command.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("argument {token:?} contains a NUL byte")]
    InteriorNul { token: String },
}

/// The bound `next_control_v1` global.
///
/// [`run_command`](Self::run_command) consumes the client, so a command
/// can be run at most once and no argument can be appended afterwards.
#[derive(Debug)]
pub struct NextControl {
    proxy: NextControlV1,
    arguments: Vec<String>,
}

impl NextControl {
    pub fn new(proxy: NextControlV1) -> Self {
        Self {
            proxy,
            arguments: Vec::new(),
        }
    }

    /// Queue one command token.  Tokens reach the compositor in call order.
    pub fn append_argument(&mut self, token: &str) -> Result<(), ControlError> {
        if token.contains('\0') {
            return Err(ControlError::InteriorNul {
                token: token.to_string(),
            });
        }
        self.proxy.add_argument(token.to_string());
        self.arguments.push(token.to_string());
        Ok(())
    }

    /// Tokens appended so far.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Run the accumulated command.
    ///
    /// The returned [`CommandCallback`] settles once the compositor answers;
    /// drive the session (e.g. with [`CommandCallback::wait`]) to get there.
    pub fn run_command<D>(self, qh: &QueueHandle<D>) -> CommandCallback
    where
        D: Dispatch<NextCommandCallbackV1, OutcomeSender> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let proxy = self.proxy.run_command(qh, tx);
        debug!("running {:?} with callback {}", self.arguments, proxy.id());
        CommandCallback {
            proxy,
            outcome: rx,
            settled: None,
        }
    }
}

/// Result of one `run_command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran; `output` is its full textual result.
    Succeeded { output: String },
    /// The compositor rejected or failed the command.
    Failed { failure_message: String },
}

impl Outcome {
    pub fn from_event(event: next_command_callback_v1::Event) -> Option<Self> {
        match event {
            next_command_callback_v1::Event::Success { output } => {
                Some(Outcome::Succeeded { output })
            }
            next_command_callback_v1::Event::Failure { failure_message } => {
                Some(Outcome::Failed { failure_message })
            }
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

/// Forward a callback event to whoever waits on it.
pub fn deliver(sender: &OutcomeSender, event: next_command_callback_v1::Event) {
    if let Some(outcome) = Outcome::from_event(event) {
        // Nobody listening any more is not an error.
        let _ = sender.send(outcome);
    }
}

/// Where a [`CommandCallback`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackState {
    Pending,
    Succeeded,
    Failed,
}

/// The one-shot result of a single `run_command`.
///
/// Only the first outcome received is kept; both callback events are
/// destructors, so the compositor cannot legally send a second one.
#[derive(Debug)]
pub struct CommandCallback {
    proxy: NextCommandCallbackV1,
    outcome: mpsc::Receiver<Outcome>,
    settled: Option<Outcome>,
}

impl CommandCallback {
    pub fn proxy(&self) -> &NextCommandCallbackV1 {
        &self.proxy
    }

    fn poll(&mut self) {
        if self.settled.is_none() {
            if let Ok(outcome) = self.outcome.try_recv() {
                self.settled = Some(outcome);
            }
        }
    }

    /// Current state, without dispatching.
    pub fn state(&mut self) -> CallbackState {
        self.poll();
        match &self.settled {
            None => CallbackState::Pending,
            Some(Outcome::Succeeded { .. }) => CallbackState::Succeeded,
            Some(Outcome::Failed { .. }) => CallbackState::Failed,
        }
    }

    /// Dispatch until the compositor has answered.
    ///
    /// A round trip comes first; compositors that answer later than their
    /// sync reply are handled by dispatching further until the outcome is
    /// in.  Blocks indefinitely if it never is.
    pub fn wait<D: 'static>(mut self, session: &mut Session<D>, state: &mut D) -> Result<Outcome, SessionError> {
        session.roundtrip(state)?;
        loop {
            self.poll();
            if let Some(outcome) = self.settled.take() {
                return Ok(outcome);
            }
            session.dispatch_once(state)?;
        }
    }
}
