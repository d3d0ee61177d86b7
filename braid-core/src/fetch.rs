//! Breadth-bounded, time-bounded traversal of the entry DAG
//!
//! Walks the store from a set of seed digests, following `next` edges in
//! BFS order. Any single block that is slow or missing is abandoned after
//! a timeout and the traversal carries on, so an incomplete store yields
//! a partial result instead of an error.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use braid_model::{BlockStore, Multihash, StoreError};
use tracing::debug;

use crate::entry::Entry;
use crate::error::LogError;

/// Default bound on any single block-store `get`.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback invoked once per fetched entry, in BFS order:
/// `(hash, entry, parent, depth)`. `parent` is the entry whose `next`
/// enqueued this digest (`None` for seeds); a seed's depth is 0.
pub type ProgressFn<'a> = dyn FnMut(&Multihash, &Entry, Option<&Entry>, usize) + Send + 'a;

/// Tuning for a single traversal.
pub struct FetchOptions {
    /// Maximum number of entries to materialize; `None` is unbounded.
    /// The cap applies to results, not to discovery: children of the last
    /// fetched entry are still enqueued.
    pub amount: Option<usize>,
    /// Digests already known to the caller; never fetched.
    pub exclude: HashSet<Multihash>,
    /// Per-block bound; an overdue block is abandoned, not fatal.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            amount: None,
            exclude: HashSet::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Materialize entries reachable from `seeds` through the store.
///
/// Returns entries in the order they were fetched; ordering them into the
/// canonical sequence is the caller's job. Missing or overdue blocks
/// degrade to a partial result; malformed blocks and non-recoverable
/// store failures surface as errors.
pub async fn fetch_entries(
    store: &dyn BlockStore,
    seeds: &[Multihash],
    options: FetchOptions,
    mut on_progress: Option<&mut ProgressFn<'_>>,
) -> Result<Vec<Entry>, LogError> {
    let mut queue: VecDeque<(Multihash, Option<usize>, usize)> =
        seeds.iter().map(|h| (h.clone(), None, 0)).collect();
    let mut seen = options.exclude;
    let mut result: Vec<Entry> = Vec::new();

    while let Some((hash, parent, depth)) = queue.pop_front() {
        if options.amount.is_some_and(|n| result.len() >= n) {
            break;
        }
        if seen.contains(&hash) {
            continue;
        }
        seen.insert(hash.clone());

        let bytes = match tokio::time::timeout(options.timeout, store.get(&hash)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(StoreError::NotFound(_))) => {
                debug!(%hash, depth, "block not available, skipping");
                continue;
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                debug!(%hash, depth, timeout = ?options.timeout, "block fetch timed out, skipping");
                continue;
            }
        };

        let entry = Entry::from_bytes(&bytes, hash)?;
        let position = result.len();
        for next in &entry.next {
            if !seen.contains(next) {
                queue.push_back((next.clone(), Some(position), depth + 1));
            }
        }
        result.push(entry);

        if let Some(report) = on_progress.as_mut() {
            let fetched = &result[position];
            let via = parent.map(|p| &result[p]);
            report(&fetched.hash, fetched, via, depth);
        }
    }

    Ok(result)
}
