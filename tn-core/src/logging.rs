//! Crate-standard logging setup shared by the binaries.
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber filtered by `env_filter` (e.g. `"info"` or
/// `"tn_gen=debug"`). Calling it twice is harmless; the second install is ignored.
pub fn setup(env_filter: &str) {
    let filter = EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .try_init();
}
