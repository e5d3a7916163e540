//! Persistent hash cache for incremental scans
//!
//! Stores (mtime, size, resolved record) per file path so unchanged files are
//! never re-hashed or re-parsed across runs. Each scan root gets its own
//! SQLite database, bound to that root; a scope or schema mismatch purges the
//! store wholesale before use.

pub mod entry;
pub mod store;

pub use entry::CacheEntry;
pub use store::HashStore;
