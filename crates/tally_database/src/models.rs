//! Diesel row models for the counting tables.

use crate::schema::{counting_channels, user_counts};
use diesel::prelude::*;
use tally_core::{CountingChannel, UserCount};

/// Row of `counting_channels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = counting_channels, primary_key(channel_id))]
pub struct ChannelRow {
    /// Discord channel ID (primary key).
    pub channel_id: i64,
    /// Guild the channel belongs to.
    pub guild_id: i64,
    /// The number the channel currently expects.
    pub current_number: i64,
    /// Author of the last accepted post, if any.
    pub last_user_id: Option<i64>,
}

impl From<ChannelRow> for CountingChannel {
    fn from(row: ChannelRow) -> Self {
        CountingChannel::new(
            row.channel_id,
            row.guild_id,
            row.current_number,
            row.last_user_id,
        )
    }
}

impl ChannelRow {
    /// Row for a newly registered channel: expecting 1, no last poster.
    pub fn fresh(channel_id: i64, guild_id: i64) -> Self {
        Self {
            channel_id,
            guild_id,
            current_number: 1,
            last_user_id: None,
        }
    }
}

/// Row of `user_counts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = user_counts)]
pub struct UserCountRow {
    /// Serial primary key; doubles as first-ever-counted order.
    pub id: i64,
    /// Discord user ID.
    pub user_id: i64,
    /// Guild the count belongs to.
    pub guild_id: i64,
    /// Number of accepted posts.
    pub count: i64,
}

impl From<UserCountRow> for UserCount {
    fn from(row: UserCountRow) -> Self {
        UserCount::new(row.user_id, row.guild_id, row.count)
    }
}

/// Insertable form of a user count, used by the increment upsert.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = user_counts)]
pub struct NewUserCount {
    /// Discord user ID.
    pub user_id: i64,
    /// Guild the count belongs to.
    pub guild_id: i64,
    /// Initial count value.
    pub count: i64,
}
