//! Error types for pyopt

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The tree violates a structural invariant (an empty required body,
    /// a boolean operator with a single operand, ...). Raised by upstream
    /// parsers or hand-built trees, never repaired silently.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The serialized tree could not be decoded; the decoder's message is
    /// the error's source
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
