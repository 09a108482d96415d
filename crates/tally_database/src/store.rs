//! PostgreSQL implementation of the count store.

use crate::models::{ChannelRow, NewUserCount, UserCountRow};
use crate::schema::{counting_channels, user_counts};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tally_core::{CountStore, CountingChannel, UserCount};
use tally_error::{DatabaseError, TallyResult};
use tokio::sync::Mutex;
use tracing::instrument;

/// PostgreSQL count store.
///
/// Implements `tally_core::CountStore` over Diesel. The conditional
/// [`advance`](CountStore::advance) is a single guarded UPDATE, so the
/// number and last-poster fields change together or not at all, and two
/// racing posts for the same number commit at most once.
///
/// # Example
/// ```no_run
/// use tally_database::{establish_connection, PgCountStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = establish_connection()?;
/// let store = PgCountStore::new(conn);
/// # Ok(())
/// # }
/// ```
pub struct PgCountStore {
    /// Database connection wrapped in Arc<Mutex> for async safety.
    ///
    /// Note: This is a simple implementation. For production use with high
    /// concurrency, consider using a connection pool like r2d2 or deadpool.
    conn: Arc<Mutex<PgConnection>>,
}

impl PgCountStore {
    /// Create a new store over a PostgreSQL connection.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a store from an `Arc<Mutex<PgConnection>>` (for sharing
    /// connections).
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CountStore for PgCountStore {
    #[instrument(skip(self))]
    async fn channel(&self, channel_id: i64) -> TallyResult<Option<CountingChannel>> {
        let mut conn = self.conn.lock().await;

        let row: Option<ChannelRow> = counting_channels::table
            .find(channel_id)
            .first(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)?;

        Ok(row.map(CountingChannel::from))
    }

    #[instrument(skip(self))]
    async fn insert_channel(&self, channel_id: i64, guild_id: i64) -> TallyResult<()> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(counting_channels::table)
            .values(ChannelRow::fresh(channel_id, guild_id))
            .on_conflict(counting_channels::channel_id)
            .do_nothing()
            .execute(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel_id: i64) -> TallyResult<bool> {
        let mut conn = self.conn.lock().await;

        let deleted = diesel::delete(counting_channels::table.find(channel_id))
            .execute(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn guild_channels(&self, guild_id: i64) -> TallyResult<Vec<CountingChannel>> {
        let mut conn = self.conn.lock().await;

        let rows: Vec<ChannelRow> = counting_channels::table
            .filter(counting_channels::guild_id.eq(guild_id))
            .order(counting_channels::channel_id.asc())
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(CountingChannel::from).collect())
    }

    #[instrument(skip(self))]
    async fn all_channels(&self) -> TallyResult<Vec<CountingChannel>> {
        let mut conn = self.conn.lock().await;

        let rows: Vec<ChannelRow> = counting_channels::table
            .order(counting_channels::channel_id.asc())
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(CountingChannel::from).collect())
    }

    /// Compare-and-swap advance: the UPDATE is guarded by the number the
    /// caller observed, so a concurrent commit makes this a no-op and the
    /// method reports `false`.
    #[instrument(skip(self))]
    async fn advance(
        &self,
        channel_id: i64,
        observed_number: i64,
        author_id: i64,
    ) -> TallyResult<bool> {
        let mut conn = self.conn.lock().await;

        let updated = diesel::update(
            counting_channels::table
                .filter(counting_channels::channel_id.eq(channel_id))
                .filter(counting_channels::current_number.eq(observed_number)),
        )
        .set((
            counting_channels::current_number.eq(observed_number + 1),
            counting_channels::last_user_id.eq(Some(author_id)),
        ))
        .execute(&mut *conn)
        .map_err(DatabaseError::from)?;

        Ok(updated == 1)
    }

    #[instrument(skip(self))]
    async fn increment_count(&self, user_id: i64, guild_id: i64) -> TallyResult<i64> {
        let mut conn = self.conn.lock().await;

        let new_count = diesel::insert_into(user_counts::table)
            .values(NewUserCount {
                user_id,
                guild_id,
                count: 1,
            })
            .on_conflict((user_counts::user_id, user_counts::guild_id))
            .do_update()
            .set(user_counts::count.eq(user_counts::count + 1))
            .returning(user_counts::count)
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(new_count)
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, guild_id: i64, limit: usize) -> TallyResult<Vec<UserCount>> {
        let mut conn = self.conn.lock().await;

        let rows: Vec<UserCountRow> = user_counts::table
            .filter(user_counts::guild_id.eq(guild_id))
            .order((user_counts::count.desc(), user_counts::id.asc()))
            .limit(limit as i64)
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(UserCount::from).collect())
    }
}
