//! Discord bot client setup and lifecycle management.

use crate::TallyHandler;
use serenity::Client;
use std::sync::Arc;
use tally_core::{CountStore, CountingGame};
use tally_error::{DiscordError, DiscordErrorKind};
use tracing::{info, instrument};

/// Main Discord client for the Tally counting bot.
///
/// Owns the Serenity client and the shared [`CountingGame`] engine the
/// event handler feeds.
///
/// # Example
/// ```no_run
/// use tally_bot::TallyBot;
/// use tally_database::{establish_connection, PgCountStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let store = PgCountStore::new(establish_connection()?);
///
///     let mut bot = TallyBot::new(token, store).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct TallyBot<S> {
    /// Serenity client instance
    client: Client,
    /// Counting engine shared with the event handler
    game: Arc<CountingGame<S>>,
}

impl<S: CountStore + 'static> TallyBot<S> {
    /// Create a new TallyBot instance over the given store.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The bot token is invalid
    /// - The Serenity client fails to initialize
    #[instrument(skip(token, store), fields(token_len = token.len()))]
    pub async fn new(token: String, store: S) -> Result<Self, DiscordError> {
        info!("Initializing Tally Discord bot");

        let game = Arc::new(CountingGame::new(store));
        let handler = TallyHandler::new(game.clone());
        let intents = TallyHandler::<S>::intents();

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        info!("Serenity client built successfully");

        Ok(Self { client, game })
    }

    /// Start the Discord bot.
    ///
    /// This method blocks until the bot is shut down (e.g., via Ctrl+C).
    ///
    /// # Errors
    /// Returns an error if the client fails to start or encounters a fatal
    /// error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        info!("Starting Discord bot");

        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Get a reference to the counting engine for direct queries.
    pub fn game(&self) -> &Arc<CountingGame<S>> {
        &self.game
    }
}
