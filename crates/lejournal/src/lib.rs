//! lejournal - Interaction Journal & Persistence
//!
//! *Le Journal* (The Journal) - Append-only, size-bounded log of user
//! interactions, persisted through a pluggable key-value port. Storage
//! failures degrade to in-memory operation; they are never surfaced to
//! tracking callers.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// The interaction journal and its GDPR export/import surface.
pub mod journal;
/// Key-value persistence port and the in-memory backend.
pub mod kv;
/// SQLite-backed key-value store.
pub mod sqlite;

pub use journal::{ImportReport, InteractionJournal, INTERACTIONS_KEY};
pub use kv::{KeyValueStore, MemoryStore, StorageError};
pub use sqlite::SqliteStore;

/// Journal library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
