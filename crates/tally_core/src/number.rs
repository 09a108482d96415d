//! Numeric message parsing.

/// Parse the longest leading run of ASCII decimal digits in `text`.
///
/// Trailing content after the digit run is ignored, so `"5 nice"` parses as
/// `5`. Returns `None` when the text does not start with a digit, or when
/// the run is too long to fit in an `i64` — an absurdly long digit run is
/// malformed input, not a number.
///
/// # Examples
///
/// ```
/// use tally_core::parse_leading_number;
///
/// assert_eq!(parse_leading_number("42"), Some(42));
/// assert_eq!(parse_leading_number("3 let's go!"), Some(3));
/// assert_eq!(parse_leading_number("no"), None);
/// ```
pub fn parse_leading_number(text: &str) -> Option<i64> {
    let run = text
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text, |end| &text[..end]);

    if run.is_empty() {
        return None;
    }

    // Overflowing runs fail the parse and count as malformed.
    run.parse::<i64>().ok()
}
