//! Logger bootstrap for verbose optimization runs.
//!
//! The crate logs through the `log` facade. Minimizers call [`init_logging`]
//! when `verbose == true` so that per-iteration cost lines reach stdout even
//! when the host application installed no logger. If a logger is already
//! installed, the call is a no-op.
use env_logger::{Builder, Env};

/// Environment variable controlling the log filter (defaults to `info`).
pub const RUST_MINIMIZE_LOG: &str = "RUST_MINIMIZE_LOG";

/// Install an `env_logger` writing to stdout, filtered by [`RUST_MINIMIZE_LOG`].
///
/// Safe to call any number of times; only the first successful call installs
/// the logger.
pub fn init_logging() {
    let env = Env::new().filter_or(RUST_MINIMIZE_LOG, "info");
    let mut builder = Builder::from_env(env);
    let builder = builder.target(env_logger::Target::Stdout);
    builder.try_init().ok();
}
