//! PostgreSQL integration for Tally.
//!
//! This crate provides the Diesel schema, row models, and the
//! [`PgCountStore`] implementation of `tally_core::CountStore`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_core::CountingGame;
//! use tally_database::{establish_connection, PgCountStore};
//!
//! # async fn example() -> tally_error::TallyResult<()> {
//! let conn = establish_connection()?;
//! let game = CountingGame::new(PgCountStore::new(conn));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod store;

// Public module for external access
pub mod schema;

pub use connection::establish_connection;
pub use models::{ChannelRow, NewUserCount, UserCountRow};
pub use store::PgCountStore;

use tally_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
