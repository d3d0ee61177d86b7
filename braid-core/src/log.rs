//! Log - a deterministically ordered view over a set of entries
//!
//! A `Log` is a value: it holds its entries in the canonical total order
//! together with the head frontier, and every operation that would change
//! it returns a fresh `Log` instead. Sharing a log across readers needs
//! no locking.

use std::fmt;

use braid_model::Multihash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dag;
use crate::entry::Entry;
use crate::error::LogError;
use crate::sort::sort_entries;

/// A deterministically ordered view over a set of DAG entries plus their
/// head frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    id: String,
    items: Vec<Entry>,
    heads: Vec<Multihash>,
}

/// On-store image of a whole log: the chain id and the head digests.
///
/// Reconstructing from this image can only reach entries still referenced
/// from the persisted heads; anything trimmed below them is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogImage {
    pub id: String,
    pub heads: Vec<Multihash>,
}

impl Log {
    /// Empty log on the given chain.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            heads: Vec::new(),
        }
    }

    pub fn builder() -> LogBuilder {
        LogBuilder::default()
    }

    /// The chain id this log stamps onto appended entries.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All known entries in the canonical total order.
    pub fn items(&self) -> &[Entry] {
        &self.items
    }

    /// Digests of the entries no other entry references.
    pub fn heads(&self) -> &[Multihash] {
        &self.heads
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an entry by digest. Heads are back-references, not entry
    /// handles, so this is a scan of `items`.
    pub fn get(&self, hash: &Multihash) -> Option<&Entry> {
        self.items.iter().find(|e| &e.hash == hash)
    }

    pub fn contains(&self, hash: &Multihash) -> bool {
        self.get(hash).is_some()
    }

    /// Payloads in item order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|e| &e.payload)
    }

    /// Entries at the old edge of the view: parentless entries and those
    /// whose parents were trimmed away.
    pub fn tails(&self) -> Vec<&Entry> {
        dag::find_tails(&self.items)
    }

    /// Digests of parents referenced by `items` but not present in it.
    /// Non-empty exactly when the log is a partial view; `expand` fetches
    /// from here.
    pub fn tail_hashes(&self) -> Vec<Multihash> {
        dag::find_tail_hashes(&self.items)
    }

    /// The persistable image of this log.
    pub fn to_json(&self) -> LogImage {
        LogImage {
            id: self.id.clone(),
            heads: self.heads.clone(),
        }
    }

    /// Canonical JSON bytes of the log image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LogError> {
        serde_json::to_vec(&self.to_json()).map_err(|e| LogError::Parse(e.to_string()))
    }
}

impl fmt::Display for Log {
    /// Renders newest first, each entry indented by the length of the
    /// chain of entries referencing it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, entry) in self.items.iter().rev().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            let depth = dag::find_descendants(entry, &self.items).len();
            if depth > 0 {
                for _ in 0..depth - 1 {
                    write!(f, "  ")?;
                }
                write!(f, "└─")?;
            }
            match &entry.payload {
                Value::String(s) => write!(f, "{s}")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

/// Assembles a [`Log`], defaulting the id to a fresh unique value and the
/// heads to the unreferenced entries of the sorted items.
#[derive(Debug, Default)]
pub struct LogBuilder {
    id: Option<String>,
    entries: Vec<Entry>,
    heads: Option<Vec<Multihash>>,
}

impl LogBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn heads(mut self, heads: Vec<Multihash>) -> Self {
        self.heads = Some(heads);
        self
    }

    pub fn build(self) -> Log {
        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let items = sort_entries(self.entries);
        let heads = match self.heads {
            Some(heads) => heads,
            None => dag::find_heads(&items)
                .into_iter()
                .map(|e| e.hash.clone())
                .collect(),
        };
        Log { id, items, heads }
    }
}
