//! Discord integration for Tally.
//!
//! This crate wires the counting engine in `tally_core` to Discord using the
//! Serenity library. It contains no counting rules of its own: events flow
//! in through [`TallyHandler`], effects (reactions, deletions, embeds,
//! channel creation) flow back out.
//!
//! # Architecture
//!
//! - **client**: Serenity client setup and lifecycle management
//! - **handler**: Event handler implementing Serenity's EventHandler trait
//! - **commands**: Slash command registration, handling, and embeds
//! - **directory**: Channel liveness checks over the Discord HTTP API
//! - **config**: Environment-based configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use tally_bot::TallyBot;
//! use tally_database::{establish_connection, PgCountStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = std::env::var("DISCORD_TOKEN")?;
//!     let store = PgCountStore::new(establish_connection()?);
//!
//!     let mut bot = TallyBot::new(token, store).await?;
//!     bot.start().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
pub mod commands;
mod config;
mod directory;
mod handler;

pub use client::TallyBot;
pub use config::BotConfig;
pub use directory::HttpChannelDirectory;
pub use handler::TallyHandler;

use tally_error::DiscordError;

/// Result type for Discord operations.
pub type DiscordResult<T> = Result<T, DiscordError>;

/// Convert a Discord snowflake ID (u64) to a database ID (i64).
///
/// Discord IDs are 64-bit unsigned integers, but PostgreSQL uses signed
/// bigints.
pub(crate) fn to_db_id(id: u64) -> i64 {
    id as i64
}

#[cfg(test)]
mod tests {
    use super::to_db_id;

    #[test]
    fn test_to_db_id_reinterprets_high_snowflakes() {
        assert_eq!(to_db_id(1_234_567_890), 1_234_567_890);
        // Snowflakes above i64::MAX reinterpret rather than saturate, so
        // distinct IDs stay distinct in the database.
        assert_eq!(to_db_id(u64::MAX), -1);
        assert_eq!(to_db_id(i64::MAX as u64 + 1), i64::MIN);
    }
}
