//! Errors surfaced by log operations

use braid_model::{InvalidHash, Multihash, StoreError};
use thiserror::Error;

/// Errors that can occur while building, merging, or hydrating logs.
#[derive(Debug, Error)]
pub enum LogError {
    /// A precondition on the inputs failed; raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    InvalidHash(#[from] InvalidHash),

    /// The block exists but its bytes are not a log image.
    #[error("block {0} is not a log image")]
    NotALog(Multihash),

    /// Empty logs have no image to persist.
    #[error("cannot persist an empty log")]
    EmptyLog,

    /// Fetched bytes did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
