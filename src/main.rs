//! Entry point for **nextctl**.
//!
//! Help and version flags are answered without touching the display.
//! Otherwise every argument is forwarded to the compositor as one command
//! token and the answer is printed.

use log::{debug, info};
use nextctl::config::{config_dir, Config};
use nextctl::ctl::{self, Invocation};
use nextctl::report;
use std::io;
use std::process::exit;

/// Try to load the config from `$XDG_CONFIG_HOME/nextctl/config.json`,
/// falling back to defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    match ctl::parse_args(std::env::args_os().skip(1)) {
        Ok(Invocation::Help) => {
            eprint!("{}", report::USAGE);
        }
        Ok(Invocation::Version) => {
            let _ = report::version(&mut io::stdout().lock());
        }
        Ok(Invocation::Run(tokens)) => exit(run(&tokens)),
        Err(e) => {
            let _ = report::fatal(&e, &mut io::stderr().lock());
            exit(1);
        }
    }
}

/// Run one command and return the process exit code.
fn run(tokens: &[String]) -> i32 {
    let config = load_config();
    let stdout = io::stdout();
    let stderr = io::stderr();

    match ctl::connect_and_run(config.display.as_deref(), tokens) {
        Ok(outcome) => {
            if let Err(e) = report::outcome(&outcome, &mut stdout.lock(), &mut stderr.lock()) {
                debug!("failed to print result: {}", e);
            }
            report::exit_code(&outcome, config.strict_exit)
        }
        Err(e) => {
            debug!("fatal: {:?}", e);
            let _ = report::fatal(&e, &mut stderr.lock());
            1
        }
    }
}
