//! Persistence contracts for counting state.

use crate::CountingChannel;
use async_trait::async_trait;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tally_error::TallyResult;

/// A user's accepted-post total within one guild.
///
/// Unique per `(user_id, guild_id)`; the count never decreases and the row
/// is never deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new,
)]
pub struct UserCount {
    /// Discord user ID.
    user_id: i64,
    /// Guild the count belongs to.
    guild_id: i64,
    /// Number of accepted posts.
    count: i64,
}

/// Durable keyed storage for channel state and user counters.
///
/// Implementations must be safe under concurrent use across different
/// `channel_id`s, and [`advance`](CountStore::advance) must be linearizable
/// per channel: for a given observed number, at most one caller ever
/// commits the transition.
#[async_trait]
pub trait CountStore: Send + Sync {
    /// Fetch a channel's state, or `None` when the channel is not
    /// registered for counting.
    async fn channel(&self, channel_id: i64) -> TallyResult<Option<CountingChannel>>;

    /// Register a channel for counting, initialized to `(1, None)`.
    async fn insert_channel(&self, channel_id: i64, guild_id: i64) -> TallyResult<()>;

    /// Remove a channel's record. Returns whether a record existed.
    async fn delete_channel(&self, channel_id: i64) -> TallyResult<bool>;

    /// All counting channels registered for a guild.
    async fn guild_channels(&self, guild_id: i64) -> TallyResult<Vec<CountingChannel>>;

    /// Every registered counting channel, across all guilds. Input to
    /// startup reconciliation.
    async fn all_channels(&self) -> TallyResult<Vec<CountingChannel>>;

    /// Conditionally advance a channel: set `(current_number, last_user_id)`
    /// to `(observed_number + 1, author_id)` only if the stored number still
    /// equals `observed_number`. Returns whether the transition committed —
    /// a `false` means another post won the turn. The two fields change
    /// together or not at all.
    async fn advance(
        &self,
        channel_id: i64,
        observed_number: i64,
        author_id: i64,
    ) -> TallyResult<bool>;

    /// Atomically increment a user's count in a guild, creating the row at
    /// 1 when absent, and return the new value.
    async fn increment_count(&self, user_id: i64, guild_id: i64) -> TallyResult<i64>;

    /// Top `limit` counters for a guild, ordered by count descending with
    /// ties broken by first-ever-counted order. A guild with no rows yields
    /// an empty Vec, not an error.
    async fn leaderboard(&self, guild_id: i64, limit: usize) -> TallyResult<Vec<UserCount>>;
}

/// Liveness oracle for external channels, used by startup reconciliation.
///
/// The bot crate implements this over the Discord HTTP API; tests implement
/// it over a set.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// Whether the external channel still exists.
    async fn channel_exists(&self, channel_id: i64) -> TallyResult<bool>;
}
