//! In-memory content-addressed block store
//!
//! Reference [`BlockStore`] used by tests, examples, and simulations.
//! Addresses are blake3 digests of the stored bytes, base58-encoded.
//! An optional per-request latency lets tests exercise timeout paths
//! without a real network.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use braid_model::{BlockStore, Multihash, StoreError};

/// Block store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<Multihash, Vec<u8>>>,
    latency: Option<Duration>,
}

impl MemoryBlockStore {
    /// Empty store with no artificial latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that sleeps for `latency` before serving each request.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            latency: Some(latency),
        }
    }

    /// Number of distinct blocks held.
    pub fn len(&self) -> usize {
        self.blocks.read().map(|blocks| blocks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a block is locally available.
    pub fn contains(&self, hash: &Multihash) -> bool {
        self.blocks
            .read()
            .map(|blocks| blocks.contains_key(hash))
            .unwrap_or(false)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<Multihash, StoreError> {
        self.simulate_latency().await;
        let hash = Multihash::from_digest(blake3::hash(&bytes).as_bytes());
        let mut blocks = self
            .blocks
            .write()
            .map_err(|_| StoreError::Io("block map lock poisoned".into()))?;
        blocks.entry(hash.clone()).or_insert(bytes);
        Ok(hash)
    }

    async fn get(&self, hash: &Multihash) -> Result<Vec<u8>, StoreError> {
        self.simulate_latency().await;
        let blocks = self
            .blocks
            .read()
            .map_err(|_| StoreError::Io("block map lock poisoned".into()))?;
        blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(hash.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_roundtrip() {
        let store = MemoryBlockStore::new();
        let hash = store.put(b"hello".to_vec()).await.unwrap();
        assert_eq!(store.get(&hash).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn identical_bytes_share_an_address() {
        let store = MemoryBlockStore::new();
        let a = store.put(b"block".to_vec()).await.unwrap();
        let b = store.put(b"block".to_vec()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn distinct_bytes_get_distinct_addresses() {
        let store = MemoryBlockStore::new();
        let a = store.put(b"one".to_vec()).await.unwrap();
        let b = store.put(b"two".to_vec()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn addresses_are_deterministic_across_stores() {
        let first = MemoryBlockStore::new();
        let second = MemoryBlockStore::new();
        let a = first.put(b"same bytes".to_vec()).await.unwrap();
        let b = second.put(b"same bytes".to_vec()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn missing_block_is_not_found() {
        let store = MemoryBlockStore::new();
        let hash = Multihash::from_digest(b"never stored");
        match store.get(&hash).await {
            Err(StoreError::NotFound(h)) => assert_eq!(h, hash),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
