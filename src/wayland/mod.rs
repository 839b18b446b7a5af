//! Wayland client plumbing on top of `wayland-client`.
//!
//! Only what a one-shot control client needs: a [`session`] with a single
//! event queue and round-trip fences, and [`registry`] helpers for turning
//! global announcements into bound proxies.  Compositor extensions (see
//! [`crate::next`]) plug in through `Dispatch` impls on the caller's state.

pub mod registry;
pub mod session;
