//! Pure queries over collections of entries
//!
//! These primitives never touch the block store; they answer structural
//! questions about a slice of entries: which are unreferenced (heads),
//! which sit at the frontier of missing parents (tails), and how deep an
//! entry's chain of referencing descendants runs.

use std::collections::HashSet;

use braid_model::Multihash;

use crate::entry::Entry;

/// Entries not referenced by any other entry in the slice, ascending
/// `(id, hash)`.
pub fn find_heads(entries: &[Entry]) -> Vec<&Entry> {
    let referenced: HashSet<&Multihash> =
        entries.iter().flat_map(|e| e.next.iter()).collect();
    let mut heads: Vec<&Entry> = entries
        .iter()
        .filter(|e| !referenced.contains(&e.hash))
        .collect();
    heads.sort_by(|a, b| (a.id.as_str(), &a.hash).cmp(&(b.id.as_str(), &b.hash)));
    heads
}

/// Entries with at least one parent digest absent from the slice, plus
/// entries with no parents at all. These are the roots the total order
/// grows from.
pub fn find_tails(entries: &[Entry]) -> Vec<&Entry> {
    let present: HashSet<&Multihash> = entries.iter().map(|e| &e.hash).collect();
    entries
        .iter()
        .filter(|e| e.next.is_empty() || e.next.iter().any(|h| !present.contains(h)))
        .collect()
}

/// Digests referenced by some entry but not present in the slice: the
/// frontier of missing parents. Deduplicated, ascending.
pub fn find_tail_hashes(entries: &[Entry]) -> Vec<Multihash> {
    let present: HashSet<&Multihash> = entries.iter().map(|e| &e.hash).collect();
    let mut missing: Vec<Multihash> = entries
        .iter()
        .flat_map(|e| e.next.iter())
        .filter(|h| !present.contains(h))
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

/// The chain of entries transitively referencing `entry`, ascending `seq`.
///
/// Walks forward one referencing entry at a time; the length of the result
/// is how far `entry` sits below the newest tip, which drives the indented
/// log rendering.
pub fn find_descendants<'a>(entry: &Entry, entries: &'a [Entry]) -> Vec<&'a Entry> {
    let mut chain: Vec<&'a Entry> = Vec::new();
    let mut cursor: &Entry = entry;
    while let Some(child) = entries.iter().find(|e| e.references(cursor)) {
        chain.push(child);
        cursor = child;
    }
    chain.sort_by_key(|e| e.seq);
    chain
}

/// Highest sequence number observed across the slice, or `None` when
/// empty.
pub fn latest_seq(entries: &[Entry]) -> Option<u64> {
    entries.iter().map(|e| e.seq).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Entry with a deterministic fake address derived from (id, seq).
    fn make_entry(id: &str, seq: u64, next: &[&Entry]) -> Entry {
        Entry {
            id: id.to_string(),
            seq,
            payload: json!(format!("{id}{seq}")),
            next: next.iter().map(|e| e.hash.clone()).collect(),
            hash: Multihash::from_digest(format!("{id}-{seq}").as_bytes()),
        }
    }

    #[test]
    fn heads_of_a_fork() {
        let root = make_entry("A", 0, &[]);
        let left = make_entry("A", 1, &[&root]);
        let right = make_entry("B", 0, &[&root]);
        let entries = vec![root.clone(), left.clone(), right.clone()];

        let heads = find_heads(&entries);
        assert_eq!(heads, vec![&left, &right]);
    }

    #[test]
    fn heads_order_by_id_then_hash() {
        let b = make_entry("B", 0, &[]);
        let a = make_entry("A", 0, &[]);
        let entries = vec![b.clone(), a.clone()];
        let heads = find_heads(&entries);
        assert_eq!(heads, vec![&a, &b]);
    }

    #[test]
    fn tails_are_roots_and_entries_with_missing_parents() {
        let a0 = make_entry("A", 0, &[]);
        let a1 = make_entry("A", 1, &[&a0]);
        let a2 = make_entry("A", 2, &[&a1]);
        // a0 dropped from the view: a1's parent is missing
        let entries = vec![a1.clone(), a2.clone()];

        let tails = find_tails(&entries);
        assert_eq!(tails, vec![&a1]);

        let full = vec![a0.clone(), a1, a2];
        let tails = find_tails(&full);
        assert_eq!(tails, vec![&a0]);
    }

    #[test]
    fn tail_hashes_are_the_missing_parent_digests() {
        let a0 = make_entry("A", 0, &[]);
        let a1 = make_entry("A", 1, &[&a0]);
        let entries = vec![a1.clone()];
        assert_eq!(find_tail_hashes(&entries), vec![a0.hash.clone()]);

        let entries = vec![a0, a1];
        assert!(find_tail_hashes(&entries).is_empty());
    }

    #[test]
    fn descendants_walk_the_referencing_chain() {
        let a0 = make_entry("A", 0, &[]);
        let a1 = make_entry("A", 1, &[&a0]);
        let a2 = make_entry("A", 2, &[&a1]);
        let entries = vec![a0.clone(), a1.clone(), a2.clone()];

        assert_eq!(find_descendants(&a0, &entries), vec![&a1, &a2]);
        assert_eq!(find_descendants(&a1, &entries), vec![&a2]);
        assert!(find_descendants(&a2, &entries).is_empty());
    }

    #[test]
    fn latest_seq_tracks_the_maximum() {
        assert_eq!(latest_seq(&[]), None);
        let a0 = make_entry("A", 0, &[]);
        let a1 = make_entry("A", 1, &[&a0]);
        let b0 = make_entry("B", 0, &[]);
        assert_eq!(latest_seq(&[a0, b0, a1]), Some(1));
    }
}
