//! # worklog
//!
//! Persistent queue-processing log. Reads work items from an input JSON
//! list, skips items already marked done, yields the rest to a caller loop,
//! and records outcomes to a durable, human-readable JSON store keyed by
//! categories.
//!
//! Identity is content-addressed: an item's id is the SHA-256 of its
//! canonical (key-sorted) JSON form, so structurally-equal items dedup
//! regardless of key order or object identity. The `dones` category is the
//! skip signal — marking an item done persists across process restarts, so
//! re-running the same queue naturally resumes where the last run stopped.

pub mod diag;
pub mod error;
pub mod hash;
pub mod model;
pub mod store;
pub mod stream;

pub use error::{Error, Result};
pub use model::{DEFAULT_CATEGORY, DONES, Entry};
pub use store::Store;
pub use stream::ItemStream;
