//! Braid Core
//!
//! An append-only Merkle-DAG log that forms a CRDT under `join`:
//! - **Entry**: immutable, content-addressed record in the DAG
//! - **Log**: deterministically ordered view over a set of entries
//! - **dag**: pure structural queries (heads, tails, descendants)
//! - **sort**: the canonical total order replicas converge on
//! - **fetch**: bounded traversal of the DAG through a block store
//!
//! Logs are values: `append`, `join`, and the hydration operations all
//! return new logs and never mutate their inputs. Two replicas that have
//! diverged can `join` their logs in either order, any grouping, any
//! number of times, and end up with identical items and heads.

pub mod dag;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod log;
mod ops;
pub mod sort;

pub use entry::{Entry, EntryImage};
pub use error::LogError;
pub use fetch::{fetch_entries, FetchOptions, ProgressFn, DEFAULT_FETCH_TIMEOUT};
pub use log::{Log, LogBuilder, LogImage};
pub use sort::sort_entries;

// Re-exports from the model crate
pub use braid_model::{BlockStore, InvalidHash, Multihash, StoreError};
