use std::io;
use thiserror::Error;

/// Errors surfaced by the strict and I/O entry points.
///
/// Detection itself never fails; only reading input and strict registration do.
#[derive(Error, Debug)]
pub enum MimeError {
    #[error("Invalid media type: {0:?}")]
    InvalidMediaType(String),

    #[error("Invalid parameter in {media_type:?}: {reason}")]
    InvalidParameter { media_type: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MimeError>;
