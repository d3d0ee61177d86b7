//! Log entries with content-addressed identity
//!
//! An entry is written to the block store as the canonical JSON of
//! `{id, seq, payload, next}`; its address in the store becomes its
//! identity. The address itself is never part of the serialized image.

use braid_model::{BlockStore, Multihash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LogError;

/// A single immutable record in the log DAG.
///
/// `id` names the chain the entry belongs to, `seq` is its position on
/// that chain (first entry is 0), and `next` holds the digests of the
/// entries that were heads when this one was created. Two entries are
/// equal iff their hashes are equal.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub seq: u64,
    pub payload: Value,
    pub next: Vec<Multihash>,
    /// Content address of the serialized image; assigned on store I/O.
    pub hash: Multihash,
}

/// On-store image of an entry.
///
/// Field order is fixed; serializing an image always yields the same
/// bytes for the same entry, so the digest is stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryImage {
    pub id: String,
    pub seq: u64,
    pub payload: Value,
    pub next: Vec<Multihash>,
}

impl EntryImage {
    fn into_entry(self, hash: Multihash) -> Entry {
        Entry {
            id: self.id,
            seq: self.seq,
            payload: self.payload,
            next: self.next,
            hash,
        }
    }
}

impl From<&Entry> for EntryImage {
    fn from(entry: &Entry) -> Self {
        EntryImage {
            id: entry.id.clone(),
            seq: entry.seq,
            payload: entry.payload.clone(),
            next: entry.next.clone(),
        }
    }
}

impl From<&Entry> for Multihash {
    fn from(entry: &Entry) -> Multihash {
        entry.hash.clone()
    }
}

impl Entry {
    /// Create an entry, persist its image, and return it with the hash
    /// assigned by the store.
    pub async fn create(
        store: &dyn BlockStore,
        id: &str,
        seq: u64,
        payload: Value,
        next: Vec<Multihash>,
    ) -> Result<Entry, LogError> {
        if id.is_empty() {
            return Err(LogError::InvalidArgument(
                "entry id must not be empty".into(),
            ));
        }
        let image = EntryImage {
            id: id.to_string(),
            seq,
            payload,
            next,
        };
        let bytes =
            serde_json::to_vec(&image).map_err(|e| LogError::Parse(e.to_string()))?;
        let hash = store.put(bytes).await?;
        Ok(image.into_entry(hash))
    }

    /// Fetch and parse the entry stored under `hash`.
    pub async fn from_hash(store: &dyn BlockStore, hash: Multihash) -> Result<Entry, LogError> {
        let bytes = store.get(&hash).await?;
        Entry::from_bytes(&bytes, hash)
    }

    /// Parse an entry image already read from the store.
    pub fn from_bytes(bytes: &[u8], hash: Multihash) -> Result<Entry, LogError> {
        let image: EntryImage = serde_json::from_slice(bytes)
            .map_err(|e| LogError::Parse(format!("entry {hash}: {e}")))?;
        Ok(image.into_entry(hash))
    }

    /// Whether this entry directly references `other` as a parent.
    pub fn references(&self, other: &Entry) -> bool {
        self.next.contains(&other.hash)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Entry {}

impl std::hash::Hash for Entry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
