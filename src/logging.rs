//! Log subscriber setup for the `seqsift` binary.

use tracing_subscriber::EnvFilter;

/// Filter directive for the verbosity flags.
///
/// `quiet` wins over everything, `debug` over `verbose`. With no flag only
/// warnings and errors are shown.
#[must_use]
pub const fn filter_directive(verbose: bool, debug: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Installs a fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the flags when set. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init(verbose: bool, debug: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, debug, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
