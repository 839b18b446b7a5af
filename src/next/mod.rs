//! next-specific protocol extensions.
//!
//! Nothing outside this module should reference the next compositor
//! directly.

pub mod control;
pub mod protocol;
