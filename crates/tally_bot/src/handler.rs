//! Serenity event handler for the counting bot.

use crate::{HttpChannelDirectory, commands};
use serenity::all::{Command, GuildChannel, Interaction, Message, Ready};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::GatewayIntents;
use std::sync::Arc;
use std::time::Duration;
use tally_core::{CountStore, CountingGame, Outcome};
use tracing::{debug, error, info, warn};

/// Pause between the ❌ reaction and deleting a rejected message. Pure UX
/// pacing so the author sees the reaction; plays no role in correctness.
const REJECT_DELETE_DELAY: Duration = Duration::from_millis(300);

/// Event handler for the Tally Discord bot.
///
/// Routes gateway events into the [`CountingGame`] engine and carries its
/// outcomes back out as Discord effects.
pub struct TallyHandler<S> {
    /// Counting engine shared with the client.
    game: Arc<CountingGame<S>>,
}

impl<S: CountStore> TallyHandler<S> {
    /// Create a new handler over a shared engine.
    pub fn new(game: Arc<CountingGame<S>>) -> Self {
        Self { game }
    }

    /// Required gateway intents for the bot.
    ///
    /// This specifies what events the bot will receive from Discord.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    /// React to a message, logging instead of failing.
    async fn react(ctx: &Context, msg: &Message, emoji: char) {
        if let Err(e) = msg.react(&ctx.http, emoji).await {
            warn!(message_id = %msg.id, error = %e, "failed to add reaction");
        }
    }

    /// Schedule best-effort removal of a rejected message.
    ///
    /// Runs detached so event processing never waits on it. An undeletable
    /// message (already removed, missing permission) is non-fatal.
    fn schedule_delete(ctx: &Context, msg: &Message) {
        let http = ctx.http.clone();
        let channel_id = msg.channel_id;
        let message_id = msg.id;
        tokio::spawn(async move {
            tokio::time::sleep(REJECT_DELETE_DELAY).await;
            if let Err(e) = channel_id.delete_message(&http, message_id).await {
                warn!(%channel_id, %message_id, error = %e, "could not delete rejected message");
            }
        });
    }
}

#[async_trait]
impl<S: CountStore + 'static> EventHandler for TallyHandler<S> {
    /// Called when the bot successfully connects to Discord.
    ///
    /// Registers the slash commands and reconciles persisted counting
    /// channels against the live channel set.
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );

        match Command::set_global_commands(&ctx.http, commands::registrations()).await {
            Ok(synced) => info!(count = synced.len(), "Synced slash commands"),
            Err(e) => error!(error = %e, "Failed to sync slash commands"),
        }

        let directory = HttpChannelDirectory::new(ctx.http.clone());
        match self.game.reconcile(&directory).await {
            Ok(removed) => info!(removed, "Reconciled counting channels"),
            Err(e) => error!(error = %e, "Channel reconciliation failed"),
        }
    }

    /// Called for every message the bot can see; the engine decides whether
    /// it is a counting event.
    async fn message(&self, ctx: Context, msg: Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let outcome = self
            .game
            .handle_message(
                crate::to_db_id(msg.channel_id.get()),
                crate::to_db_id(guild_id.get()),
                crate::to_db_id(msg.author.id.get()),
                &msg.content,
                msg.author.bot,
            )
            .await;

        match outcome {
            Ok(Outcome::Ignored) => {}
            Ok(Outcome::Accepted { counted, total }) => {
                debug!(channel_id = %msg.channel_id, counted, total, "count accepted");
                Self::react(&ctx, &msg, '✅').await;
            }
            Ok(Outcome::Rejected(reason)) => {
                debug!(channel_id = %msg.channel_id, %reason, "count rejected");
                Self::react(&ctx, &msg, '❌').await;
                Self::schedule_delete(&ctx, &msg);
            }
            Err(e) => {
                // Store failure: this single event is abandoned with no
                // partial write. Operators see the log; the channel stays
                // consistent.
                error!(channel_id = %msg.channel_id, error = %e, "abandoned counting event");
            }
        }
    }

    /// Called when a guild channel is destroyed; drops its record without
    /// waiting for the next reconciliation pass.
    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        match self.game.channel_deleted(crate::to_db_id(channel.id.get())).await {
            Ok(true) => info!(channel_id = %channel.id, "counting channel deleted"),
            Ok(false) => {}
            Err(e) => {
                error!(channel_id = %channel.id, error = %e, "failed to drop deleted channel")
            }
        }
    }

    /// Called for slash command invocations and autocomplete queries.
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                let result = match command.data.name.as_str() {
                    "create-channel" => {
                        commands::create_channel(&ctx, &command, &self.game).await
                    }
                    "leaderboard" => commands::leaderboard(&ctx, &command, &self.game).await,
                    "current-number" => {
                        commands::current_number(&ctx, &command, &self.game).await
                    }
                    other => {
                        warn!(command = other, "unknown slash command");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!(command = %command.data.name, error = %e, "command failed");
                }
            }
            Interaction::Autocomplete(autocomplete) => {
                if let Err(e) =
                    commands::autocomplete_channels(&ctx, &autocomplete, &self.game).await
                {
                    warn!(error = %e, "autocomplete failed");
                }
            }
            _ => {}
        }
    }
}
