//! Counting-game state machine for the Tally bot.
//!
//! This crate holds everything with real invariants: numeric message
//! validation, turn alternation, the per-channel expected-number cursor, and
//! the per-user count aggregation behind the leaderboard. The Discord layer
//! in `tally_bot` is glue that feeds events in and carries effects out.
//!
//! # Architecture
//!
//! - [`parse_leading_number`]: longest-leading-digit-run message parsing
//! - [`CountingChannel`]: per-channel state plus the pure accept/reject rule
//! - [`CountStore`]: persistence contract (implemented by `tally_database`
//!   for PostgreSQL and by [`MemoryCountStore`] for tests and local runs)
//! - [`CountingGame`]: the engine that turns one inbound message into at
//!   most one committed state transition
//!
//! # Example
//!
//! ```
//! use tally_core::{CountingGame, MemoryCountStore, Outcome};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tally_error::TallyResult<()> {
//! let game = CountingGame::new(MemoryCountStore::new());
//! game.register_channel(1, 100).await?;
//!
//! let outcome = game.handle_message(1, 100, 7, "1", false).await?;
//! assert!(matches!(outcome, Outcome::Accepted { counted: 1, .. }));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod game;
mod memory;
mod number;
mod store;
mod verdict;

pub use channel::CountingChannel;
pub use game::{CountingGame, Outcome, LEADERBOARD_LIMIT};
pub use memory::MemoryCountStore;
pub use number::parse_leading_number;
pub use store::{ChannelDirectory, CountStore, UserCount};
pub use verdict::{RejectReason, Verdict};
