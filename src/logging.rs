//! Logger setup for the `es_viz` binary.
//!
//! The library only talks to the `log` facade; the wasm facade never installs
//! a logger, so these records only surface from the CLI.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs env_logger for the CLI.
///
/// Without `RUST_LOG`, `--verbose` lowers the filter from `info` to `debug`,
/// which surfaces solver resyncs, scene edits and `[perf]` timings. When
/// `RUST_LOG` is set it replaces that default entirely, so
/// `RUST_LOG=es_viz::stream=trace` shows per-line tracing even without
/// `--verbose`. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose).to_string());
    // only fails when a logger is already installed
    let _ = Builder::from_env(env).try_init();
}
