//! Per-channel counting state.

use crate::{RejectReason, Verdict, parse_leading_number};
use derive_getters::Getters;

/// State of one registered counting channel.
///
/// `current_number` is the number the channel expects next; it starts at 1
/// and increases by exactly 1 per accepted post. `last_user_id` is the
/// author of the most recent accepted post, `None` until the first one.
///
/// # Examples
///
/// ```
/// use tally_core::{CountingChannel, Verdict};
///
/// let channel = CountingChannel::fresh(1, 100);
/// assert_eq!(*channel.current_number(), 1);
/// assert!(channel.judge(7, "1").is_accept());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new)]
pub struct CountingChannel {
    /// Discord channel ID (primary key).
    channel_id: i64,
    /// Guild the channel belongs to.
    guild_id: i64,
    /// The number the channel currently expects.
    current_number: i64,
    /// Author of the last accepted post, if any.
    last_user_id: Option<i64>,
}

impl CountingChannel {
    /// State of a newly registered channel: expecting 1, no last poster.
    pub fn fresh(channel_id: i64, guild_id: i64) -> Self {
        Self::new(channel_id, guild_id, 1, None)
    }

    /// Judge a message against this channel's state.
    ///
    /// Pure decision, no I/O: malformed text, a wrong number, or a repeat
    /// author each reject; turn alternation takes precedence over numeric
    /// correctness, so a same-author repeat of the right number still
    /// rejects.
    pub fn judge(&self, author_id: i64, content: &str) -> Verdict {
        let Some(got) = parse_leading_number(content) else {
            return Verdict::Reject(RejectReason::Malformed);
        };
        if self.last_user_id == Some(author_id) {
            return Verdict::Reject(RejectReason::RepeatAuthor);
        }
        if got != self.current_number {
            return Verdict::Reject(RejectReason::WrongNumber {
                expected: self.current_number,
                got,
            });
        }
        Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_channel_expects_one() {
        let channel = CountingChannel::fresh(1, 100);
        assert_eq!(*channel.current_number(), 1);
        assert_eq!(*channel.last_user_id(), None);
    }

    #[test]
    fn test_accepts_expected_number() {
        let channel = CountingChannel::new(1, 100, 5, Some(2));
        assert_eq!(channel.judge(3, "5"), Verdict::Accept);
    }

    #[test]
    fn test_rejects_wrong_number() {
        let channel = CountingChannel::new(1, 100, 3, Some(2));
        assert_eq!(
            channel.judge(9, "5"),
            Verdict::Reject(RejectReason::WrongNumber { expected: 3, got: 5 })
        );
    }

    #[test]
    fn test_rejects_repeat_author_even_when_correct() {
        let channel = CountingChannel::new(1, 100, 5, Some(3));
        assert_eq!(channel.judge(3, "5"), Verdict::Reject(RejectReason::RepeatAuthor));
    }

    #[test]
    fn test_repeat_author_takes_precedence_over_wrong_number() {
        let channel = CountingChannel::new(1, 100, 5, Some(3));
        assert_eq!(channel.judge(3, "9"), Verdict::Reject(RejectReason::RepeatAuthor));
    }

    #[test]
    fn test_rejects_malformed() {
        let channel = CountingChannel::fresh(1, 100);
        assert_eq!(channel.judge(3, "one"), Verdict::Reject(RejectReason::Malformed));
    }

    #[test]
    fn test_trailing_text_still_counts() {
        let channel = CountingChannel::new(1, 100, 3, Some(1));
        assert_eq!(channel.judge(2, "3 let's go!"), Verdict::Accept);
    }
}
