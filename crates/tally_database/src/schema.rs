//! Diesel schema for the counting tables.
//!
//! Expected DDL:
//!
//! ```sql
//! CREATE TABLE counting_channels (
//!     channel_id BIGINT PRIMARY KEY,
//!     guild_id BIGINT NOT NULL,
//!     current_number BIGINT NOT NULL DEFAULT 1,
//!     last_user_id BIGINT
//! );
//!
//! CREATE TABLE user_counts (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL,
//!     guild_id BIGINT NOT NULL,
//!     count BIGINT NOT NULL DEFAULT 0,
//!     UNIQUE (user_id, guild_id)
//! );
//! ```
//!
//! The `id` serial on `user_counts` records first-ever-counted order and
//! breaks leaderboard ties.

diesel::table! {
    counting_channels (channel_id) {
        channel_id -> Int8,
        guild_id -> Int8,
        current_number -> Int8,
        last_user_id -> Nullable<Int8>,
    }
}

diesel::table! {
    user_counts (id) {
        id -> Int8,
        user_id -> Int8,
        guild_id -> Int8,
        count -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(counting_channels, user_counts);
