//! CLI settings: built-in defaults, an optional TOML file, then `SESSIONS_*`
//! environment variables (highest precedence), e.g.
//! `SESSIONS_CONTAINER__DEFAULT_LOOKAHEAD_MONTHS=3`.

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use session_engine::ExpansionConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    /// Used by `expand` for single or recurring bookings.
    pub booking: ExpansionConfig,
    /// Used by `expand --container` and `series` for whole-hub calendars.
    pub container: ExpansionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Load settings, reading `path` when given.
    ///
    /// # Errors
    /// Fails if the file cannot be read or a value does not deserialize.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let booking = ExpansionConfig::for_booking();
        let container = ExpansionConfig::for_container();

        let mut builder = Config::builder()
            .set_default("logging.level", "warn")?
            .set_default(
                "booking.default_lookahead_months",
                i64::from(booking.default_lookahead_months),
            )?
            .set_default(
                "container.default_lookahead_months",
                i64::from(container.default_lookahead_months),
            )?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix("SESSIONS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build settings")?
            .try_deserialize::<Settings>()
            .context("Failed to deserialize settings")
    }
}
