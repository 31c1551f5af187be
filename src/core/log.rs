//! Log output for the CLI. Records go to stderr so `--json` output on stdout
//! stays machine readable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const APP_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Filter used when `RUST_LOG` is not set. Quiet runs log nothing; verbose runs
/// show this crate at debug and HTTP client internals only from info up.
fn default_directives(verbose: bool) -> String {
    if verbose {
        format!("warn,{APP_TARGET}=debug,reqwest=info")
    } else {
        "off".to_string()
    }
}

pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let pretty = verbose.then(|| {
        fmt::layer()
            .pretty()
            .without_time()
            .with_writer(std::io::stderr)
    });
    let compact = (!verbose).then(|| {
        fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(compact)
        .init();
}
