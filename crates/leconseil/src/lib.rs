//! leconseil - Marketplace Recommendation Engine
//!
//! *Le Conseil* (The Recommendation) - Answers "what is similar to this
//! model", "what is trending right now", and "what should this user see
//! next" over an in-memory catalog snapshot and interaction journal,
//! merging multiple scoring algorithms into one bounded, cached result.
//!
//! The engine performs no network I/O. Persistence goes through the
//! [`lejournal`] key-value port; catalog data arrives as an immutable
//! snapshot and is never mutated.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// TTL result cache keyed by request context.
pub mod cache;
/// Co-purchase collaborative signal.
mod collaborative;
/// Recommendation requests and results.
pub mod context;
/// Diversity re-ranking of merged candidates.
mod diversity;
/// The recommendation engine facade.
pub mod engine;

pub use cache::{CacheEntry, CacheKey, ResultCache};
pub use context::{
    Algorithm, EngineStatistics, RecommendationContext, RecommendationResult,
    RecommendationScore,
};
pub use engine::RecommendationEngine;

// The shared domain surface, re-exported for embedders
pub use lecatalogue::{
    Catalog, CatalogModel, EngineConfig, EventMetadata, InteractionEvent, InteractionKind,
    ModelCategory, SimilarityWeights, SizeClass, ANONYMOUS_USER,
};
pub use lejournal::{ImportReport, KeyValueStore, MemoryStore, SqliteStore, StorageError};

/// Engine library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
