//! Deterministic total ordering of a DAG of entries
//!
//! Flattens the causal partial order into a linear sequence that depends
//! only on the set of entries, never on their arrival order: parents
//! precede the entries that reference them, concurrent chains interleave
//! by ascending chain id, and re-sorting an already sorted sequence is a
//! no-op. This is the property that makes two replicas converge to
//! byte-identical logs after a merge.

use std::collections::{BTreeMap, HashMap, VecDeque};

use braid_model::Multihash;

use crate::entry::Entry;

/// Sort entries into the canonical total order.
///
/// Duplicates (by hash) are dropped, keeping the first occurrence. The
/// order is grown from the tails: an entry is emitted only once every
/// parent present in the set has been emitted and no same-chain entry
/// with a smaller `seq` is still waiting; ties between chains break by
/// ascending `(id, seq, hash)`.
pub fn sort_entries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut pool: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut index: HashMap<Multihash, usize> = HashMap::new();
    for entry in entries {
        if !index.contains_key(&entry.hash) {
            index.insert(entry.hash.clone(), pool.len());
            pool.push(entry);
        }
    }
    if pool.len() <= 1 {
        return pool;
    }

    let order = order_indices(&pool, &index);

    // Rearrange the owned pool into the computed order.
    let mut rank = vec![0usize; pool.len()];
    for (position, &i) in order.iter().enumerate() {
        rank[i] = position;
    }
    let mut ranked: Vec<(usize, Entry)> = pool
        .into_iter()
        .enumerate()
        .map(|(i, entry)| (rank[i], entry))
        .collect();
    ranked.sort_by_key(|(position, _)| *position);
    ranked.into_iter().map(|(_, entry)| entry).collect()
}

fn sort_key(entry: &Entry) -> (&str, u64, &Multihash) {
    (entry.id.as_str(), entry.seq, &entry.hash)
}

/// Compute the emission order of `pool` as indices into it.
fn order_indices(pool: &[Entry], index: &HashMap<Multihash, usize>) -> Vec<usize> {
    // children[p] = entries referencing pool[p], ascending (id, seq, hash)
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); pool.len()];
    for (child, entry) in pool.iter().enumerate() {
        for parent in &entry.next {
            if let Some(&p) = index.get(parent) {
                children[p].push(child);
            }
        }
    }
    for list in &mut children {
        list.sort_by(|&a, &b| sort_key(&pool[a]).cmp(&sort_key(&pool[b])));
    }

    // chain index: id -> seq -> pool indices, hash-ascending. Divergent
    // replicas of one chain can carry distinct entries with equal seq, so
    // a seq can map to more than one entry.
    let mut chains: HashMap<&str, BTreeMap<u64, Vec<usize>>> = HashMap::new();
    for (i, entry) in pool.iter().enumerate() {
        chains
            .entry(entry.id.as_str())
            .or_default()
            .entry(entry.seq)
            .or_default()
            .push(i);
    }
    for by_seq in chains.values_mut() {
        for list in by_seq.values_mut() {
            list.sort_by(|&a, &b| pool[a].hash.cmp(&pool[b].hash));
        }
    }

    // Seed with the tails, ascending (id, seq, hash).
    let mut seeds: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.next.is_empty() || e.next.iter().any(|h| !index.contains_key(h))
        })
        .map(|(i, _)| i)
        .collect();
    seeds.sort_by(|&a, &b| sort_key(&pool[a]).cmp(&sort_key(&pool[b])));

    let mut queue: VecDeque<usize> = seeds.into();
    let mut processed = vec![false; pool.len()];
    let mut order: Vec<usize> = Vec::with_capacity(pool.len());

    // Deferrals cannot cycle while per-chain seq respects causality; the
    // guard bounds traversal of inputs that violate that invariant.
    let mut guard = pool
        .len()
        .saturating_mul(pool.len())
        .saturating_add(pool.len());

    while let Some(i) = queue.pop_front() {
        if processed[i] {
            continue;
        }
        if guard == 0 {
            break;
        }
        guard -= 1;

        let entry = &pool[i];

        // A parent still waiting goes first: requeue right behind it.
        let pending_parents: Vec<usize> = entry
            .next
            .iter()
            .filter_map(|h| index.get(h).copied())
            .filter(|&p| !processed[p])
            .collect();
        if !pending_parents.is_empty() {
            match queue.iter().rposition(|q| pending_parents.contains(q)) {
                Some(position) => queue.insert(position + 1, i),
                None => queue.push_back(i),
            }
            continue;
        }

        // An earlier entry on the same chain goes first.
        let pending_sibling = chains.get(entry.id.as_str()).and_then(|by_seq| {
            by_seq
                .range(..entry.seq)
                .rev()
                .flat_map(|(_, list)| list.iter().copied())
                .find(|&s| !processed[s])
        });
        if let Some(sibling) = pending_sibling {
            match queue.iter().position(|&q| q == sibling) {
                Some(position) => queue.insert(position + 1, i),
                None => queue.push_back(i),
            }
            continue;
        }

        processed[i] = true;
        order.push(i);
        for &child in &children[i] {
            if !processed[child] {
                queue.push_back(child);
            }
        }
    }

    // Guard exhaustion on malformed input: emit the leftovers in a
    // deterministic order so the result is still a permutation.
    if order.len() < pool.len() {
        let mut leftovers: Vec<usize> =
            (0..pool.len()).filter(|&i| !processed[i]).collect();
        leftovers.sort_by(|&a, &b| sort_key(&pool[a]).cmp(&sort_key(&pool[b])));
        order.extend(leftovers);
    }

    order
}
