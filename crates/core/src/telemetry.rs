use tracing_subscriber::EnvFilter;

use crate::config::HostConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the host log
/// level. Calling this again after a subscriber is installed is a no-op.
pub fn init_tracing(config: &HostConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = config.log_level.as_filter(), "tracing initialized");
    }
}
