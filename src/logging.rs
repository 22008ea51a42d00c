use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "EMOLENS_LOG";

/// Maps `--quiet` / `-v` counts to a filter directive.
pub fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "off";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Picks the filter: `--quiet`, then `EMOLENS_LOG`, then the `-v` count.
pub fn filter_directive(verbose: u8, quiet: bool, from_env: Option<&str>) -> String {
    match from_env.map(str::trim) {
        Some(value) if !value.is_empty() && !quiet => value.to_string(),
        _ => level_directive(verbose, quiet).to_string(),
    }
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn init(verbose: u8, quiet: bool) {
    let from_env = env::var(LOG_ENV).ok();
    let filter = EnvFilter::new(filter_directive(verbose, quiet, from_env.as_deref()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
