//! In-memory [`CountStore`] for tests and local runs.

use crate::{CountStore, CountingChannel, UserCount};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tally_error::TallyResult;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryInner {
    channels: HashMap<i64, CountingChannel>,
    // Insertion order doubles as first-ever-counted order for tie-breaks.
    counts: Vec<UserCount>,
}

/// In-memory count store.
///
/// Backs the engine tests and offers a zero-setup store for local
/// experiments. All state lives behind one async mutex, which makes
/// [`advance`](CountStore::advance) trivially atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryCountStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryCountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountStore for MemoryCountStore {
    async fn channel(&self, channel_id: i64) -> TallyResult<Option<CountingChannel>> {
        let inner = self.inner.lock().await;
        Ok(inner.channels.get(&channel_id).copied())
    }

    async fn insert_channel(&self, channel_id: i64, guild_id: i64) -> TallyResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .channels
            .entry(channel_id)
            .or_insert_with(|| CountingChannel::fresh(channel_id, guild_id));
        Ok(())
    }

    async fn delete_channel(&self, channel_id: i64) -> TallyResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.channels.remove(&channel_id).is_some())
    }

    async fn guild_channels(&self, guild_id: i64) -> TallyResult<Vec<CountingChannel>> {
        let inner = self.inner.lock().await;
        let mut channels: Vec<_> = inner
            .channels
            .values()
            .filter(|c| *c.guild_id() == guild_id)
            .copied()
            .collect();
        channels.sort_by_key(|c| *c.channel_id());
        Ok(channels)
    }

    async fn all_channels(&self) -> TallyResult<Vec<CountingChannel>> {
        let inner = self.inner.lock().await;
        let mut channels: Vec<_> = inner.channels.values().copied().collect();
        channels.sort_by_key(|c| *c.channel_id());
        Ok(channels)
    }

    async fn advance(
        &self,
        channel_id: i64,
        observed_number: i64,
        author_id: i64,
    ) -> TallyResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(channel) = inner.channels.get_mut(&channel_id) else {
            return Ok(false);
        };
        if *channel.current_number() != observed_number {
            return Ok(false);
        }
        *channel = CountingChannel::new(
            channel_id,
            *channel.guild_id(),
            observed_number + 1,
            Some(author_id),
        );
        Ok(true)
    }

    async fn increment_count(&self, user_id: i64, guild_id: i64) -> TallyResult<i64> {
        let mut inner = self.inner.lock().await;
        match inner
            .counts
            .iter_mut()
            .find(|c| *c.user_id() == user_id && *c.guild_id() == guild_id)
        {
            Some(row) => {
                let next = row.count() + 1;
                *row = UserCount::new(user_id, guild_id, next);
                Ok(next)
            }
            None => {
                inner.counts.push(UserCount::new(user_id, guild_id, 1));
                Ok(1)
            }
        }
    }

    async fn leaderboard(&self, guild_id: i64, limit: usize) -> TallyResult<Vec<UserCount>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<_> = inner
            .counts
            .iter()
            .filter(|c| *c.guild_id() == guild_id)
            .copied()
            .collect();
        // Stable sort keeps first-ever-counted order among equal counts.
        rows.sort_by(|a, b| b.count().cmp(a.count()));
        rows.truncate(limit);
        Ok(rows)
    }
}
