//! Discord error types.
//!
//! Error conditions raised by the Discord integration layer. The variants
//! carry plain strings so this crate stays free of the Discord client
//! dependency; the bot crate maps API errors into these kinds.

/// Discord error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum DiscordErrorKind {
    /// Discord API error (e.g., HTTP error, gateway error, rate limit).
    #[display("Discord API error: {_0}")]
    Api(String),

    /// Guild (server) not found by ID.
    #[display("Guild not found: {_0}")]
    GuildNotFound(i64),

    /// Channel not found by ID.
    #[display("Channel not found: {_0}")]
    ChannelNotFound(i64),

    /// Bot lacks required permissions for an operation.
    #[display("Insufficient permissions: {_0}")]
    InsufficientPermissions(String),

    /// Connection to the Discord gateway failed.
    #[display("Connection failed: {_0}")]
    ConnectionFailed(String),

    /// Interaction (slash command, autocomplete) failed.
    #[display("Interaction failed: {_0}")]
    InteractionFailed(String),
}

/// Discord error with source location tracking.
///
/// Captures the error kind along with the file and line where the error
/// occurred.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Discord Error: {} at line {} in {}", kind, line, file)]
pub struct DiscordError {
    /// The kind of error that occurred
    pub kind: DiscordErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DiscordError {
    /// Create a new DiscordError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use tally_error::{DiscordError, DiscordErrorKind};
    ///
    /// let err = DiscordError::new(DiscordErrorKind::ChannelNotFound(42));
    /// ```
    #[track_caller]
    pub fn new(kind: DiscordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
