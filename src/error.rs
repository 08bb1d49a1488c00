use std::collections::BTreeSet;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Secret characters that occur nowhere in the reference matrix.
    #[error("characters missing from cover text: {}", join_chars(.missing))]
    MissingCharacters { missing: BTreeSet<char> },

    #[error("image too small: need {required} bits, but only {available} available")]
    CapacityExceeded { required: usize, available: usize },

    #[error("no payload delimiter found after reading {bits_read} bits")]
    DelimiterNotFound { bits_read: usize },

    #[error("failed to parse embedded sequence map: {reason}")]
    PayloadParse { reason: String },

    #[error("invalid board: {reason}")]
    InvalidBoard { reason: String },

    /// A board value points past the end of its word, or at a word or
    /// sentence the cover text does not have.
    #[error("board cell ({row}, {col}) with value {value} has no entry in the reference matrix")]
    ReferenceLookup { row: usize, col: usize, value: u8 },

    #[error("pixel buffer of {len} bytes is not RGBA")]
    InvalidPixelBuffer { len: usize },

    #[error("failed to serialize sequence map: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_chars(chars: &BTreeSet<char>) -> String {
    chars
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}
