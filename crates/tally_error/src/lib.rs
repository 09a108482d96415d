//! Error types for the Tally counting bot.
//!
//! This crate provides the foundation error types used throughout the Tally
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tally_error::{TallyResult, ConfigError};
//!
//! fn load_token() -> TallyResult<String> {
//!     Err(ConfigError::new("DISCORD_TOKEN not set"))?
//! }
//!
//! match load_token() {
//!     Ok(token) => println!("Got token of length {}", token.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod discord;
mod error;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use discord::{DiscordError, DiscordErrorKind};
pub use error::{TallyError, TallyErrorKind, TallyResult};
