//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "meshdash=warn,meshdash_core=warn";
const VERBOSE_FILTER: &str = "meshdash=debug,meshdash_core=debug";

/// Installs the global subscriber. Logs go to stderr so stdout only carries the URLs.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool, json: bool) {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
