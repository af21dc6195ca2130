//! Error types for the restoration pipeline.

use thiserror::Error;

/// Errors produced anywhere in the analyze/process pipeline.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// An input audio file could not be decoded.
    #[error("failed to decode audio at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: hound::Error,
    },

    /// A user-supplied parameter fell outside its documented range.
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Decoded audio had zero frames.
    #[error("empty audio input at {path}")]
    EmptyAudio { path: String },

    /// A persisted analysis artifact was missing and could not be
    /// recomputed because the reference audio it was derived from is
    /// also gone.
    #[error("analysis artifact missing: {artifact}")]
    ArtifactMissing { artifact: String },

    /// Persisted artifacts are missing and the caller must re-run
    /// analysis before processing can proceed.
    #[error("persisted analysis is unavailable; re-analyze required")]
    ReanalyzeRequired,

    /// The matrix blob header was malformed or did not match what this
    /// implementation writes.
    #[error("corrupt matrix blob: {reason}")]
    CorruptBlob { reason: String },

    /// Handoff to an external encoder failed.
    #[error("encoding failed: {reason}")]
    Encode { reason: String },

    /// Filesystem or other IO failure not covered by a more specific
    /// variant above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the pipeline.
pub type RestoreResult<T> = Result<T, RestoreError>;

impl From<hound::Error> for RestoreError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io_err) => RestoreError::Io(io_err),
            other => RestoreError::Encode {
                reason: other.to_string(),
            },
        }
    }
}
