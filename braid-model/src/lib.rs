//! Braid Model
//!
//! Pure data types and traits for the braid log, decoupled from store
//! backends and the log engine itself:
//! - **Multihash**: validated base58 content address
//! - **BlockStore**: contract for content-addressed block storage

pub mod storage;
pub mod types;

pub use storage::{BlockStore, StoreError};
pub use types::{InvalidHash, Multihash};
