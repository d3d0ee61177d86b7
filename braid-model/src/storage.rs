//! Block store contract
//!
//! The braid log never touches disk or network itself; it reads and writes
//! opaque byte blobs through this trait. Implementations decide the hash
//! function and where the bytes live.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Multihash;

/// Errors surfaced by block store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("block not found: {0}")]
    NotFound(Multihash),

    #[error("store i/o error: {0}")]
    Io(String),
}

/// Content-addressed block storage.
///
/// `put` stores bytes and returns the digest of their content; `get`
/// retrieves bytes previously stored under that digest. Because addresses
/// are derived from content, writing the same bytes twice is idempotent
/// and concurrent writers need no coordination.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Store `bytes` and return their content address.
    async fn put(&self, bytes: Vec<u8>) -> Result<Multihash, StoreError>;

    /// Retrieve the bytes stored under `hash`.
    async fn get(&self, hash: &Multihash) -> Result<Vec<u8>, StoreError>;
}
