//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{ConfigError, DiscordError};

/// This is the foundation error enum. Each tally crate contributes the
/// variants for its own failure domain.
///
/// # Examples
///
/// ```
/// use tally_error::{TallyError, ConfigError};
///
/// let config_err = ConfigError::new("DATABASE_URL not set");
/// let err: TallyError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TallyErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Discord error
    #[from(DiscordError)]
    Discord(DiscordError),
}

/// Tally error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tally_error::{TallyResult, ConfigError};
///
/// fn might_fail() -> TallyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tally Error: {}", _0)]
pub struct TallyError(Box<TallyErrorKind>);

impl TallyError {
    /// Create a new error from a kind.
    pub fn new(kind: TallyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TallyErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TallyErrorKind
impl<T> From<T> for TallyError
where
    T: Into<TallyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tally operations.
///
/// # Examples
///
/// ```
/// use tally_error::{TallyResult, ConfigError};
///
/// fn load() -> TallyResult<String> {
///     Err(ConfigError::new("missing"))?
/// }
/// ```
pub type TallyResult<T> = std::result::Result<T, TallyError>;
