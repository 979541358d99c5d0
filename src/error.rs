//! Error types for the word list.
//!
//! Word-not-found and out-of-range ratings are not errors; mutations on a
//! missing word are silent no-ops and ratings are clamped.

use thiserror::Error;

/// Errors surfaced at the persistence boundary (load, import, remote sync).
#[derive(Debug, Error)]
pub enum WordlistError {
    /// The snapshot text could not be parsed or does not have the snapshot shape
    #[error("malformed word list data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported word list version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Browser storage is missing or refused the write
    #[error("storage error: {0}")]
    Storage(String),

    #[error("remote endpoint returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, WordlistError>;
