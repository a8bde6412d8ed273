//! Line and token classification shared by the `.scl` and `.kbm` grammars.
//!
//! Both formats are line oriented: `!` starts a comment, blank lines carry
//! nothing, and everything else is content whose meaning depends on where
//! the parser is in the file.

use crate::error::{Result, TuningError};

/// Comment marker for both file formats.
pub const COMMENT_MARKER: char = '!';

/// A single classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Text following the `!` marker, trimmed.
    Comment(&'a str),
    /// Empty or whitespace only.
    Blank,
    /// Anything else, with surrounding whitespace removed.
    Content(&'a str),
}

impl<'a> Line<'a> {
    /// Classify one raw line (without its terminator).
    pub fn classify(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if let Some(text) = trimmed.strip_prefix(COMMENT_MARKER) {
            Line::Comment(text.trim())
        } else if trimmed.is_empty() {
            Line::Blank
        } else {
            Line::Content(trimmed)
        }
    }
}

/// The value token of a content line: everything before the first
/// whitespace. Scala allows a free-form label after the value.
pub fn leading_token(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or(content)
}

/// Shape of a scale degree token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegreeToken {
    /// Contains a `.`: a cents value.
    Cents(f64),
    /// Contains a `/`: `numerator/denominator`.
    Ratio(u64, u64),
    /// Bare digits: `n/1`.
    IntegerRatio(u64),
}

impl DegreeToken {
    /// Classify a degree token found on `line`. The checks run in order:
    /// `.` wins over `/`, and anything that is not digits is rejected.
    pub fn parse(token: &str, line: usize) -> Result<Self> {
        if token.contains('.') {
            let cents = token
                .parse::<f64>()
                .map_err(|_| TuningError::malformed_number(line, token))?;
            Ok(DegreeToken::Cents(cents))
        } else if let Some((num, den)) = token.split_once('/') {
            let num = parse_unsigned(num, line)?;
            let den = parse_unsigned(den, line)?;
            Ok(DegreeToken::Ratio(num, den))
        } else if is_digits(token) {
            Ok(DegreeToken::IntegerRatio(parse_unsigned(token, line)?))
        } else {
            Err(TuningError::malformed_degree(line, token))
        }
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn parse_unsigned(token: &str, line: usize) -> Result<u64> {
    token
        .trim()
        .parse::<u64>()
        .map_err(|_| TuningError::malformed_number(line, token))
}

pub(crate) fn parse_int(token: &str, line: usize) -> Result<i32> {
    token
        .parse::<i32>()
        .map_err(|_| TuningError::malformed_number(line, token))
}

pub(crate) fn parse_float(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| TuningError::malformed_number(line, token))
}
