//! Everything nextctl prints.
//!
//! Writers are passed in so the exact bytes on stdout/stderr can be
//! checked in tests.

use crate::ctl::CtlError;
use crate::next::control::Outcome;
use std::io::{self, Write};

/// Help text, printed on `--help` and after usage-related failures.
pub const USAGE: &str = "Usage: nextctl <command>
  -h, --help      Print this help message and exit.

  -v, --version   Print the version number and exit.

Complete documentation for recognized commands can be found in
the nextctl(1) man page.
";

/// Failure message the compositor sends for an unrecognised command.
pub const UNKNOWN_COMMAND: &str = "Unknown command\n";
/// Failure message the compositor sends when no argument was given.
pub const NO_COMMAND: &str = "No command provided\n";

/// Whether a failure message should be followed by the usage text.
pub fn wants_usage(failure_message: &str) -> bool {
    failure_message == UNKNOWN_COMMAND || failure_message == NO_COMMAND
}

/// Print a successful command's output.
///
/// A trailing newline is added unless the output already ends with one, so
/// empty output prints a lone newline.
pub fn success(output: &str, out: &mut impl Write) -> io::Result<()> {
    out.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Print a command failure verbatim, plus usage for the two usage
/// sentinels.
pub fn failure(failure_message: &str, err: &mut impl Write) -> io::Result<()> {
    write!(err, "ERROR: {}", failure_message)?;
    if wants_usage(failure_message) {
        err.write_all(USAGE.as_bytes())?;
    }
    err.flush()
}

/// Print whichever half of `outcome` applies.
pub fn outcome(outcome: &Outcome, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    match outcome {
        Outcome::Succeeded { output } => success(output, out),
        Outcome::Failed { failure_message } => failure(failure_message, err),
    }
}

/// Print the version line.
pub fn version(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Nextctl version: {}", env!("CARGO_PKG_VERSION"))?;
    out.flush()
}

/// Print a fatal error.
pub fn fatal(error: &CtlError, err: &mut impl Write) -> io::Result<()> {
    writeln!(err, "ERROR: {}", error)?;
    err.flush()
}

/// Process exit code for a completed command.
///
/// A command failure exits `0` unless `strict` is set.
pub fn exit_code(outcome: &Outcome, strict: bool) -> i32 {
    if strict && !outcome.is_success() {
        1
    } else {
        0
    }
}
