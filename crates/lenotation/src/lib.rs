//! lenotation - Scoring & Profiles
//!
//! *La Notation* (The Scoring) - Pairwise model similarity, time-windowed
//! trend scoring, and per-user preference profiles derived from the
//! interaction journal. Every function here is a pure function of its
//! inputs; "now" always arrives as an explicit argument.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Per-user preference profiles.
pub mod profile;
/// Pairwise model similarity scoring.
pub mod similarity;
/// Time-windowed trend scoring.
pub mod trend;

pub use profile::{PreferenceProfile, PriceRange, ProfileBuilder};
pub use similarity::{jaccard, rank_similar, similarity, size_adjacency, ScoredModel};
pub use trend::{TrendScore, TrendScorer};

/// Scoring library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
