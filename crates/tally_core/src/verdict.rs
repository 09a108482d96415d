//! Accept/reject verdicts for inbound counting messages.

/// Why a counting message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RejectReason {
    /// The message does not start with a run of decimal digits.
    #[display("malformed: no leading number")]
    Malformed,
    /// The parsed number is not the one the channel expects.
    #[display("wrong number: expected {expected}, got {got}")]
    WrongNumber {
        /// The number the channel expected at decision time.
        expected: i64,
        /// The number the message carried.
        got: i64,
    },
    /// The author also posted the previous accepted count.
    #[display("repeat author")]
    RepeatAuthor,
}

/// Decision for a single message against a channel's current state.
///
/// Computed purely from `(expected number, last poster, author, text)`;
/// committing an `Accept` is the store's job and may still lose a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Verdict {
    /// The message carries the expected number from an alternating author.
    #[display("accept")]
    Accept,
    /// The message is rejected and the channel state must not change.
    #[display("reject ({_0})")]
    Reject(RejectReason),
}

impl Verdict {
    /// True when this verdict accepts the message.
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}
