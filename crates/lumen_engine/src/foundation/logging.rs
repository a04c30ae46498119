//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // A second initialisation (tests, embedded use) is harmless
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default filter
///
/// `default_filter` uses the `env_logger` filter syntax (`"info"`,
/// `"lumen_engine=debug,warn"`). `RUST_LOG` still takes precedence when set.
pub fn init_with_level(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
