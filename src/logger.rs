pub use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

/// Filter used when neither `T3S_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Takes precedence over `RUST_LOG` so the camera can be traced on its own.
const LOG_ENV: &str = "T3S_LOG";

pub fn init() {
    init_with(DEFAULT_DIRECTIVES);
}

/// Installs the global subscriber, logging per `default_directives` unless the
/// environment says otherwise. Verbose filters also print how long start and
/// stop took.
pub fn init_with(default_directives: &str) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let env_filter = build_filter(configured.as_deref(), default_directives);
    let verbose = is_verbose(&env_filter.to_string());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime())
        .with_span_events(if verbose {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    // A second call, e.g. from a test harness, keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Unparsable directives fall back to `fallback` instead of silencing output.
fn build_filter(configured: Option<&str>, fallback: &str) -> EnvFilter {
    configured
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn is_verbose(directives: &str) -> bool {
    directives.split(',').any(|directive| {
        let level = directive.rsplit('=').next().unwrap_or(directive).trim();
        level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace")
    })
}
