//! **nextctl**: send a command to the next compositor.
//!
//! The compositor exposes a `next_control_v1` global.  nextctl connects to
//! the Wayland display, finds and binds that global, appends each command
//! token as an argument, runs the command and prints the compositor's
//! answer.
//!
//! # Architecture
//!
//! * [`wayland`]: the [`Session`](wayland::session::Session) around a
//!   `wayland-client` connection and event queue, with round-trip fences,
//!   plus registry binding helpers.
//! * [`next`]: the generated `next_control_v1` bindings and the command
//!   client on top of them.
//! * [`ctl`]: the command flow tying both together.
//! * [`report`]: everything printed to stdout/stderr.
//!
//! Tests drive the same code over a socket pair against an in-process
//! `wayland-server` compositor.

pub mod config;
pub mod ctl;
pub mod next;
pub mod report;
pub mod wayland;

#[cfg(test)]
mod testing;
