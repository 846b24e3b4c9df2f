use tracing_subscriber::EnvFilter;

/// Install the JSON log subscriber. CloudWatch adds its own timestamps, so
/// lines carry only level, fields and message. Safe to call more than once.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .without_time()
        .try_init();
}
