//! Error types for scale and keyboard-mapping parsing.

use thiserror::Error;

/// Result type for tuning operations.
pub type Result<T> = std::result::Result<T, TuningError>;

/// Errors that can occur while reading or inspecting tuning files.
#[derive(Debug, Error)]
pub enum TuningError {
    /// A token expected to hold an integer or float failed to parse.
    #[error("line {line}: malformed number '{token}'")]
    MalformedNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A scale degree that is neither cents, a ratio, nor an integer.
    #[error("line {line}: unrecognized scale degree '{token}'")]
    MalformedDegree {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A degree accessor was called past the end of the scale.
    #[error("degree index {index} out of range (scale has {len} degrees)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of degrees in the scale.
        len: usize,
    },

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TuningError {
    pub(crate) fn malformed_number(line: usize, token: impl Into<String>) -> Self {
        Self::MalformedNumber {
            line,
            token: token.into(),
        }
    }

    pub(crate) fn malformed_degree(line: usize, token: impl Into<String>) -> Self {
        Self::MalformedDegree {
            line,
            token: token.into(),
        }
    }
}

/// Declared keyboard-mapping size disagrees with the number of parsed entries.
///
/// Reported alongside a successful parse, never as a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("keyboard mapping declares {declared} entries but {actual} were parsed")]
pub struct MappingSizeMismatch {
    /// The `map_size` header field.
    pub declared: i32,
    /// Number of entries actually parsed.
    pub actual: usize,
}
