//! Environment-based configuration.

use derive_getters::Getters;
use tally_error::{ConfigError, TallyResult};

/// Configuration for the bot process.
///
/// The database connection string is read separately by
/// `tally_database::establish_connection` from `DATABASE_URL`.
#[derive(Debug, Clone, Getters)]
pub struct BotConfig {
    /// Discord bot token from the Discord Developer Portal.
    discord_token: String,
}

impl BotConfig {
    /// Load bot configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when `DISCORD_TOKEN` is not set.
    pub fn from_env() -> TallyResult<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::new("DISCORD_TOKEN environment variable not set"))?;

        Ok(Self { discord_token })
    }
}
