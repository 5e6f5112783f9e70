// Global verbosity system - maps the 0/1/2 levels onto tracing filters
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. RUST_LOG, when set, wins over the level.
pub fn set_verbosity_level(level: u8) {
    let default_filter = match level {
        0 => "warn,spacetraders_autopilot=warn,summary=info",
        1 => "warn,spacetraders_autopilot=info,summary=info",
        _ => "info,spacetraders_autopilot=trace,summary=info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    if level > 0 {
        crate::v_summary!("📢 Verbosity level: {} (0=quiet, 1=basic, 2=full)", level);
    }
}

// Summaries are always shown, regardless of level
#[macro_export]
macro_rules! v_summary {
    ($($arg:tt)*) => { ::tracing::info!(target: "summary", $($arg)*) };
}

#[macro_export]
macro_rules! v_info {
    ($($arg:tt)*) => { ::tracing::info!($($arg)*) };
}

#[macro_export]
macro_rules! v_debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[macro_export]
macro_rules! v_trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[macro_export]
macro_rules! v_warn {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) };
}

#[macro_export]
macro_rules! v_error {
    ($($arg:tt)*) => { ::tracing::error!($($arg)*) };
}
