//! The counting-game engine.

use crate::{ChannelDirectory, CountStore, CountingChannel, RejectReason, UserCount, Verdict};
use tally_error::TallyResult;
use tracing::{debug, info, instrument, trace, warn};

/// Number of rows the leaderboard command displays.
pub const LEADERBOARD_LIMIT: usize = 10;

/// What the engine decided about one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a counting event: bot author or unregistered channel. No effect.
    Ignored,
    /// The post committed.
    Accepted {
        /// The number that was counted.
        counted: i64,
        /// The author's new total in the guild.
        total: i64,
    },
    /// The post was rejected; channel state is unchanged.
    Rejected(RejectReason),
}

/// Per-channel sequential-number validator and turn-alternation enforcer.
///
/// Holds a [`CountStore`] handle and turns inbound messages into at most
/// one committed state transition each. Events for different channels may
/// run concurrently; same-channel races are resolved by the store's
/// conditional [`advance`](CountStore::advance), so two simultaneous posts
/// of the same number produce exactly one [`Outcome::Accepted`].
#[derive(Debug, Clone)]
pub struct CountingGame<S> {
    store: S,
}

impl<S: CountStore> CountingGame<S> {
    /// Create an engine over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one inbound chat message.
    ///
    /// Returns `Ok(outcome)` for every decidable message; an `Err` means
    /// the store failed and this single event was abandoned with no
    /// partial write.
    #[instrument(skip(self, content))]
    pub async fn handle_message(
        &self,
        channel_id: i64,
        guild_id: i64,
        author_id: i64,
        content: &str,
        from_bot: bool,
    ) -> TallyResult<Outcome> {
        if from_bot {
            trace!("ignoring bot-authored message");
            return Ok(Outcome::Ignored);
        }

        let Some(channel) = self.store.channel(channel_id).await? else {
            trace!("not a counting channel");
            return Ok(Outcome::Ignored);
        };

        let verdict = channel.judge(author_id, content);
        let Verdict::Reject(reason) = verdict else {
            return self.commit(&channel, author_id, guild_id).await;
        };

        debug!(%reason, "rejected post");
        Ok(Outcome::Rejected(reason))
    }

    /// Commit an accepted post: conditional advance, then count credit.
    async fn commit(
        &self,
        channel: &CountingChannel,
        author_id: i64,
        guild_id: i64,
    ) -> TallyResult<Outcome> {
        let observed = *channel.current_number();

        if !self
            .store
            .advance(*channel.channel_id(), observed, author_id)
            .await?
        {
            // Lost the race: another post took this number between our read
            // and the conditional update.
            debug!(observed, "conditional advance missed");
            return Ok(Outcome::Rejected(RejectReason::WrongNumber {
                expected: observed + 1,
                got: observed,
            }));
        }

        let total = self.store.increment_count(author_id, guild_id).await?;
        debug!(counted = observed, total, "accepted post");
        Ok(Outcome::Accepted {
            counted: observed,
            total,
        })
    }

    /// Register a freshly created counting channel.
    ///
    /// Call only after the external channel creation has confirmed success,
    /// so a denied creation never leaves an orphaned record.
    #[instrument(skip(self))]
    pub async fn register_channel(&self, channel_id: i64, guild_id: i64) -> TallyResult<()> {
        self.store.insert_channel(channel_id, guild_id).await?;
        info!("registered counting channel");
        Ok(())
    }

    /// Drop a channel's record after the chat layer reports it destroyed.
    ///
    /// Returns whether the channel was registered. Later messages for the
    /// same ID become [`Outcome::Ignored`].
    #[instrument(skip(self))]
    pub async fn channel_deleted(&self, channel_id: i64) -> TallyResult<bool> {
        let removed = self.store.delete_channel(channel_id).await?;
        if removed {
            info!("removed deleted counting channel");
        }
        Ok(removed)
    }

    /// The number a channel currently expects, or `None` for channels not
    /// registered for counting.
    pub async fn current_number(&self, channel_id: i64) -> TallyResult<Option<i64>> {
        Ok(self
            .store
            .channel(channel_id)
            .await?
            .map(|c| *c.current_number()))
    }

    /// Counting channels registered for a guild, for autocomplete.
    pub async fn guild_channels(&self, guild_id: i64) -> TallyResult<Vec<CountingChannel>> {
        self.store.guild_channels(guild_id).await
    }

    /// Top counters for a guild. An empty Vec is a real answer, not an
    /// error.
    pub async fn leaderboard(&self, guild_id: i64) -> TallyResult<Vec<UserCount>> {
        self.store.leaderboard(guild_id, LEADERBOARD_LIMIT).await
    }

    /// Startup reconciliation: drop every record whose external channel no
    /// longer exists. Idempotent and order-independent; returns the number
    /// of records removed.
    #[instrument(skip(self, directory))]
    pub async fn reconcile<D: ChannelDirectory>(&self, directory: &D) -> TallyResult<usize> {
        let mut removed = 0;
        for channel in self.store.all_channels().await? {
            let channel_id = *channel.channel_id();
            if directory.channel_exists(channel_id).await? {
                continue;
            }
            if self.store.delete_channel(channel_id).await? {
                warn!(channel_id, "pruned stale counting channel");
                removed += 1;
            }
        }
        info!(removed, "reconciliation complete");
        Ok(removed)
    }
}
