//! Errors returned while parsing prefixes or loading prefix lists.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur before the trie is touched. Operations on the trie itself never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The text is not a prefix (bad address syntax or a bit length outside the family width).
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),

    /// The text is not an IPv4 or IPv6 address.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// A line of a prefix list could not be parsed.
    #[error("line {line}: {source}")]
    Line {
        /// 1-based line number
        line: usize,
        /// Why the line was rejected
        source: Box<Error>,
    },

    /// Reading the prefix list failed.
    #[error("failed to read prefix list: {0}")]
    Io(#[from] std::io::Error),
}
