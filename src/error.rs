//! Crate error type.

use thiserror::Error;

/// Errors surfaced by padwatch.
///
/// Most runtime conditions are not errors: an unsupported platform turns polling into a
/// no-op, an empty slot reads as zeros, and an id mismatch at a slot is replaced with a
/// warning. What remains are contract violations and configuration problems.
#[derive(Debug, Error)]
pub enum Error {
    /// An event was dispatched without a name.
    #[error("event is missing its name")]
    MissingEventName,

    /// A threshold outside the open interval `(0, 1)`.
    #[error("{which} threshold must lie in (0, 1), got {value}")]
    InvalidThreshold { which: &'static str, value: f32 },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot backend could not be initialised.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
