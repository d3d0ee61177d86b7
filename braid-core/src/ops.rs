//! Log operations: append, join, and store-backed hydration
//!
//! `join` and `join_all` are pure and give the log its CRDT shape: they
//! commute, associate, and absorb duplicates, so replicas that merge in
//! any order converge to the same value. Everything else suspends at
//! block-store I/O and leaves its inputs untouched.

use std::collections::HashSet;

use braid_model::{BlockStore, Multihash};
use serde_json::Value;

use crate::dag;
use crate::entry::Entry;
use crate::error::LogError;
use crate::fetch::{fetch_entries, FetchOptions, ProgressFn};
use crate::log::{Log, LogImage};
use crate::sort::sort_entries;

impl Log {
    /// Append a payload as the next entry on this log's chain.
    ///
    /// The new entry references every current head, so it becomes the
    /// single head of the returned log.
    pub async fn append(
        &self,
        store: &dyn BlockStore,
        payload: impl Into<Value>,
    ) -> Result<Log, LogError> {
        let seq = dag::latest_seq(self.items()).map_or(0, |s| s + 1);
        let entry = Entry::create(
            store,
            self.id(),
            seq,
            payload.into(),
            self.heads().to_vec(),
        )
        .await?;

        let head = entry.hash.clone();
        let mut items = self.items().to_vec();
        items.push(entry);
        Ok(Log::builder()
            .id(self.id())
            .entries(items)
            .heads(vec![head])
            .build())
    }

    /// Merge two logs into one.
    ///
    /// The pair is taken in ascending id order, so `join(a, b)` and
    /// `join(b, a)` are the same log; the result's id is the smaller of
    /// the two unless `id` overrides it. With a `size` cap only the last
    /// `size` entries of the merged order are retained, and `heads` are
    /// recomputed over the retained entries - a cap smaller than the
    /// merged log can therefore drop heads of trimmed branches.
    pub fn join(a: &Log, b: &Log, size: Option<usize>, id: Option<&str>) -> Log {
        let (first, second) = if a.id() <= b.id() { (a, b) } else { (b, a) };
        let id = id.unwrap_or(first.id());

        let mut combined = first.items().to_vec();
        combined.extend(second.items().iter().cloned());
        let mut items = sort_entries(combined);
        if let Some(size) = size {
            if items.len() > size {
                items = items.split_off(items.len() - size);
            }
        }
        Log::builder().id(id).entries(items).build()
    }

    /// Left fold of [`Log::join`] over the given logs.
    pub fn join_all(logs: &[Log], size: Option<usize>) -> Log {
        let mut logs = logs.iter();
        let Some(first) = logs.next() else {
            return Log::builder().build();
        };
        logs.fold(first.clone(), |acc, log| Log::join(&acc, log, size, None))
    }

    /// Pull missing ancestors of this log out of the store.
    ///
    /// Fetches up to `length` entries per missing-parent tail and keeps
    /// the newest `items.len() + length` of the merged order; `None`
    /// materializes everything reachable. A log whose DAG is already
    /// complete comes back unchanged.
    pub async fn expand(
        &self,
        store: &dyn BlockStore,
        length: Option<usize>,
        on_progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<Log, LogError> {
        let tails = dag::find_tail_hashes(self.items());
        if tails.is_empty() {
            return Ok(self.clone());
        }

        let exclude: HashSet<Multihash> =
            self.items().iter().map(|e| e.hash.clone()).collect();
        let fetched = fetch_entries(
            store,
            &tails,
            FetchOptions {
                amount: length.map(|n| n.saturating_mul(tails.len())),
                exclude,
                ..Default::default()
            },
            on_progress,
        )
        .await?;

        let mut combined = self.items().to_vec();
        combined.extend(fetched);
        let mut items = sort_entries(combined);
        if let Some(length) = length {
            let cap = self.len() + length;
            if items.len() > cap {
                items = items.split_off(items.len() - cap);
            }
        }
        Ok(Log::builder().id(self.id()).entries(items).build())
    }

    /// Materialize a log from one or more already-hydrated entries.
    ///
    /// Seeds the traversal with the inputs' parents, fetches up to
    /// `length - entries.len()` more, and takes the log id from the first
    /// sorted item that is one of the inputs.
    pub async fn from_entry(
        store: &dyn BlockStore,
        entries: &[Entry],
        length: Option<usize>,
        exclude: &[Multihash],
        on_progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<Log, LogError> {
        if entries.is_empty() {
            return Err(LogError::InvalidArgument(
                "from_entry requires at least one entry".into(),
            ));
        }

        let mut seeds: Vec<Multihash> = entries
            .iter()
            .flat_map(|e| e.next.iter().cloned())
            .collect();
        seeds.sort();
        seeds.dedup();

        let mut known: HashSet<Multihash> = exclude.iter().cloned().collect();
        known.extend(entries.iter().map(|e| e.hash.clone()));

        let fetched = fetch_entries(
            store,
            &seeds,
            FetchOptions {
                amount: length.map(|n| n.saturating_sub(entries.len())),
                exclude: known,
                ..Default::default()
            },
            on_progress,
        )
        .await?;

        let input_hashes: HashSet<&Multihash> = entries.iter().map(|e| &e.hash).collect();
        let mut combined = entries.to_vec();
        combined.extend(fetched);
        let items = sort_entries(combined);

        let id = items
            .iter()
            .find(|e| input_hashes.contains(&e.hash))
            .map_or_else(|| entries[0].id.clone(), |e| e.id.clone());

        Ok(Log::builder().id(id).entries(items).build())
    }

    /// Reconstruct a log from a persisted log image.
    ///
    /// Fetches up to `length` entries reachable from the persisted heads;
    /// the returned log keeps the image's id and heads. Bytes that are
    /// not JSON fail with `Parse`; valid JSON of the wrong shape fails
    /// with `NotALog`.
    pub async fn from_multihash(
        store: &dyn BlockStore,
        hash: &Multihash,
        length: Option<usize>,
        exclude: &[Multihash],
        on_progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<Log, LogError> {
        let bytes = store.get(hash).await?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| LogError::Parse(format!("block {hash}: {e}")))?;
        let image: LogImage =
            serde_json::from_value(value).map_err(|_| LogError::NotALog(hash.clone()))?;

        let fetched = fetch_entries(
            store,
            &image.heads,
            FetchOptions {
                amount: length,
                exclude: exclude.iter().cloned().collect(),
                ..Default::default()
            },
            on_progress,
        )
        .await?;

        Ok(Log::builder()
            .id(image.id)
            .entries(fetched)
            .heads(image.heads)
            .build())
    }

    /// Persist this log's image and return its content address.
    pub async fn to_multihash(&self, store: &dyn BlockStore) -> Result<Multihash, LogError> {
        if self.items().is_empty() || self.heads().is_empty() {
            return Err(LogError::EmptyLog);
        }
        Ok(store.put(self.to_bytes()?).await?)
    }
}
