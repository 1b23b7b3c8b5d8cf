//! Diagnostic output for the command line.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` isn't set, by number of `-v` flags.
fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a `fmt` subscriber writing to stderr, so stdout only carries results.
pub fn init(verbosity: u8) {
    let level = default_level(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
