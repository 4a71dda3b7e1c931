// File: src/telemetry.rs
// Purpose: tracing subscriber setup from [logging]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global fmt subscriber
///
/// RUST_LOG wins over the configured level. Only the first call has any
/// effect, and a subscriber installed elsewhere is left alone.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.ansi)
            .with_target(false)
            .try_init();
    });
}

/// `info` becomes `titon=info,titon_router=info`; full directives pass through
fn default_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("titon={level},titon_router={level},titon_cli={level},warn", level = level)
    }
}
