//! Engine tests against the in-memory store.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tally_core::{
    ChannelDirectory, CountStore, CountingChannel, CountingGame, MemoryCountStore, Outcome,
    RejectReason, UserCount,
};
use tally_error::{DatabaseError, DatabaseErrorKind, TallyError, TallyResult};

const CHANNEL: i64 = 10;
const GUILD: i64 = 100;

async fn fresh_game() -> CountingGame<MemoryCountStore> {
    let game = CountingGame::new(MemoryCountStore::new());
    game.register_channel(CHANNEL, GUILD)
        .await
        .unwrap_or_else(|e| panic!("register failed: {e}"));
    game
}

async fn post(
    game: &CountingGame<MemoryCountStore>,
    author: i64,
    content: &str,
) -> TallyResult<Outcome> {
    game.handle_message(CHANNEL, GUILD, author, content, false).await
}

#[tokio::test]
async fn test_walkthrough_accept_reject_sequence() -> TallyResult<()> {
    let game = fresh_game().await;

    // A posts "1": accepted, expected moves to 2.
    assert!(matches!(
        post(&game, 1, "1").await?,
        Outcome::Accepted { counted: 1, total: 1 }
    ));
    assert_eq!(game.current_number(CHANNEL).await?, Some(2));

    // A posts "2": right number, same author, rejected; expected stays 2.
    assert_eq!(
        post(&game, 1, "2").await?,
        Outcome::Rejected(RejectReason::RepeatAuthor)
    );
    assert_eq!(game.current_number(CHANNEL).await?, Some(2));

    // B posts "2": accepted.
    assert!(matches!(
        post(&game, 2, "2").await?,
        Outcome::Accepted { counted: 2, total: 1 }
    ));
    assert_eq!(game.current_number(CHANNEL).await?, Some(3));

    // C posts "5": wrong number.
    assert_eq!(
        post(&game, 3, "5").await?,
        Outcome::Rejected(RejectReason::WrongNumber { expected: 3, got: 5 })
    );
    assert_eq!(game.current_number(CHANNEL).await?, Some(3));

    // D posts "3 let's go!": leading-digit parse accepts.
    assert!(matches!(
        post(&game, 4, "3 let's go!").await?,
        Outcome::Accepted { counted: 3, .. }
    ));
    assert_eq!(game.current_number(CHANNEL).await?, Some(4));

    Ok(())
}

#[tokio::test]
async fn test_expected_number_is_one_plus_accepted_posts() -> TallyResult<()> {
    let game = fresh_game().await;

    for n in 1..=25i64 {
        let author = n % 2; // alternate two authors
        assert!(matches!(
            post(&game, author, &n.to_string()).await?,
            Outcome::Accepted { .. }
        ));
    }
    assert_eq!(game.current_number(CHANNEL).await?, Some(26));
    Ok(())
}

#[tokio::test]
async fn test_rejection_mutates_nothing() -> TallyResult<()> {
    let game = fresh_game().await;
    post(&game, 1, "1").await?;

    let before = game
        .store()
        .channel(CHANNEL)
        .await?
        .unwrap_or_else(|| panic!("channel missing"));

    for content in ["7", "not a number", "2"] {
        // author 1 repeats; the others are wrong or malformed
        let outcome = post(&game, 1, content).await?;
        assert!(matches!(outcome, Outcome::Rejected(_)), "{content} should reject");
    }

    let after = game
        .store()
        .channel(CHANNEL)
        .await?
        .unwrap_or_else(|| panic!("channel missing"));
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_bot_and_unknown_channel_messages_are_ignored() -> TallyResult<()> {
    let game = fresh_game().await;

    assert_eq!(
        game.handle_message(CHANNEL, GUILD, 1, "1", true).await?,
        Outcome::Ignored
    );
    assert_eq!(
        game.handle_message(999, GUILD, 1, "1", false).await?,
        Outcome::Ignored
    );
    // Neither event moved the cursor or credited a count.
    assert_eq!(game.current_number(CHANNEL).await?, Some(1));
    assert!(game.leaderboard(GUILD).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_leaderboard_sorted_and_sum_matches_accepted_posts() -> TallyResult<()> {
    let game = fresh_game().await;
    game.register_channel(11, GUILD).await?;

    // Channel 10: users 1 and 2 alternate through 6 accepted posts.
    for n in 1..=6i64 {
        post(&game, n % 2 + 1, &n.to_string()).await?;
    }
    // Channel 11: users 3 and 4 alternate through 4 accepted posts.
    for n in 1..=4i64 {
        game.handle_message(11, GUILD, n % 2 + 3, &n.to_string(), false)
            .await?;
    }

    let rows = game.leaderboard(GUILD).await?;
    assert!(rows.windows(2).all(|w| w[0].count() >= w[1].count()));
    let total: i64 = rows.iter().map(|r| *r.count()).sum();
    assert_eq!(total, 10);
    Ok(())
}

#[tokio::test]
async fn test_leaderboard_ties_break_by_first_counted() -> TallyResult<()> {
    let game = fresh_game().await;

    // Users 5 and 6 end tied at two accepted posts each, 5 counted first.
    for (author, n) in [(5, 1), (6, 2), (5, 3), (6, 4)] {
        assert!(matches!(
            post(&game, author, &n.to_string()).await?,
            Outcome::Accepted { .. }
        ));
    }

    let rows = game.leaderboard(GUILD).await?;
    assert_eq!(
        rows.iter().map(|r| *r.user_id()).collect::<Vec<_>>(),
        vec![5, 6]
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_leaderboard_is_empty_not_error() -> TallyResult<()> {
    let game = fresh_game().await;
    assert!(game.leaderboard(GUILD).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_deleted_channel_events_become_ignored() -> TallyResult<()> {
    let game = fresh_game().await;
    post(&game, 1, "1").await?;

    assert!(game.channel_deleted(CHANNEL).await?);
    assert!(!game.channel_deleted(CHANNEL).await?);

    assert_eq!(post(&game, 2, "2").await?, Outcome::Ignored);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_number_posts_accept_exactly_once() -> TallyResult<()> {
    for _ in 0..50 {
        let game = std::sync::Arc::new(CountingGame::new(MemoryCountStore::new()));
        game.register_channel(CHANNEL, GUILD).await?;

        let mut handles = Vec::new();
        for author in [1i64, 2, 3, 4] {
            let game = game.clone();
            handles.push(tokio::spawn(async move {
                game.handle_message(CHANNEL, GUILD, author, "1", false).await
            }));
        }

        let mut accepts = 0;
        for handle in handles {
            match handle.await.unwrap_or_else(|e| panic!("join failed: {e}"))? {
                Outcome::Accepted { counted: 1, .. } => accepts += 1,
                Outcome::Rejected(_) => {}
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(accepts, 1);
        assert_eq!(game.current_number(CHANNEL).await?, Some(2));
    }
    Ok(())
}

/// Store that delegates to memory but fails selected operations on demand,
/// standing in for an unreachable database.
struct OutageStore {
    inner: MemoryCountStore,
    advance_down: Arc<AtomicBool>,
    increment_down: Arc<AtomicBool>,
}

impl OutageStore {
    fn new() -> (Self, Arc<AtomicBool>, Arc<AtomicBool>) {
        let advance_down = Arc::new(AtomicBool::new(false));
        let increment_down = Arc::new(AtomicBool::new(false));
        let store = Self {
            inner: MemoryCountStore::new(),
            advance_down: advance_down.clone(),
            increment_down: increment_down.clone(),
        };
        (store, advance_down, increment_down)
    }

    fn unavailable() -> TallyError {
        DatabaseError::new(DatabaseErrorKind::Connection("connection refused".to_string()))
            .into()
    }
}

#[async_trait]
impl CountStore for OutageStore {
    async fn channel(&self, channel_id: i64) -> TallyResult<Option<CountingChannel>> {
        self.inner.channel(channel_id).await
    }

    async fn insert_channel(&self, channel_id: i64, guild_id: i64) -> TallyResult<()> {
        self.inner.insert_channel(channel_id, guild_id).await
    }

    async fn delete_channel(&self, channel_id: i64) -> TallyResult<bool> {
        self.inner.delete_channel(channel_id).await
    }

    async fn guild_channels(&self, guild_id: i64) -> TallyResult<Vec<CountingChannel>> {
        self.inner.guild_channels(guild_id).await
    }

    async fn all_channels(&self) -> TallyResult<Vec<CountingChannel>> {
        self.inner.all_channels().await
    }

    async fn advance(
        &self,
        channel_id: i64,
        observed_number: i64,
        author_id: i64,
    ) -> TallyResult<bool> {
        if self.advance_down.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.advance(channel_id, observed_number, author_id).await
    }

    async fn increment_count(&self, user_id: i64, guild_id: i64) -> TallyResult<i64> {
        if self.increment_down.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.increment_count(user_id, guild_id).await
    }

    async fn leaderboard(&self, guild_id: i64, limit: usize) -> TallyResult<Vec<UserCount>> {
        self.inner.leaderboard(guild_id, limit).await
    }
}

#[tokio::test]
async fn test_advance_outage_aborts_event_without_partial_write() -> TallyResult<()> {
    let (store, advance_down, _) = OutageStore::new();
    let game = CountingGame::new(store);
    game.register_channel(CHANNEL, GUILD).await?;

    advance_down.store(true, Ordering::SeqCst);
    let result = game.handle_message(CHANNEL, GUILD, 1, "1", false).await;
    assert!(result.is_err());

    // Neither field moved and no count was credited.
    let channel = game
        .store()
        .channel(CHANNEL)
        .await?
        .unwrap_or_else(|| panic!("channel missing"));
    assert_eq!(*channel.current_number(), 1);
    assert_eq!(*channel.last_user_id(), None);
    assert!(game.leaderboard(GUILD).await?.is_empty());

    // Only that single event was abandoned; the next one goes through.
    advance_down.store(false, Ordering::SeqCst);
    assert!(matches!(
        game.handle_message(CHANNEL, GUILD, 1, "1", false).await?,
        Outcome::Accepted { counted: 1, total: 1 }
    ));
    Ok(())
}

#[tokio::test]
async fn test_increment_outage_never_credits_a_count() -> TallyResult<()> {
    let (store, _, increment_down) = OutageStore::new();
    let game = CountingGame::new(store);
    game.register_channel(CHANNEL, GUILD).await?;

    increment_down.store(true, Ordering::SeqCst);
    let result = game.handle_message(CHANNEL, GUILD, 1, "1", false).await;
    assert!(result.is_err());

    // The conditional advance had already committed as a single atomic
    // update; the channel is consistent and expects the next number.
    let channel = game
        .store()
        .channel(CHANNEL)
        .await?
        .unwrap_or_else(|| panic!("channel missing"));
    assert_eq!(*channel.current_number(), 2);
    assert_eq!(*channel.last_user_id(), Some(1));

    // No credit without a reported accept.
    assert!(game.leaderboard(GUILD).await?.is_empty());
    Ok(())
}

struct SetDirectory(HashSet<i64>);

#[async_trait]
impl ChannelDirectory for SetDirectory {
    async fn channel_exists(&self, channel_id: i64) -> TallyResult<bool> {
        Ok(self.0.contains(&channel_id))
    }
}

#[tokio::test]
async fn test_reconcile_prunes_only_stale_channels() -> TallyResult<()> {
    let game = CountingGame::new(MemoryCountStore::new());
    game.register_channel(1, GUILD).await?;
    game.register_channel(2, GUILD).await?;
    game.register_channel(3, GUILD).await?;

    let live = SetDirectory([1i64, 3].into_iter().collect());
    assert_eq!(game.reconcile(&live).await?, 1);

    let remaining: Vec<i64> = game
        .guild_channels(GUILD)
        .await?
        .iter()
        .map(|c| *c.channel_id())
        .collect();
    assert_eq!(remaining, vec![1, 3]);

    // Running again removes nothing.
    assert_eq!(game.reconcile(&live).await?, 0);
    Ok(())
}
