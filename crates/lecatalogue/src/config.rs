// Engine configuration

use serde::{Deserialize, Serialize};

/// One day in milliseconds
pub const DAY_MS: i64 = 86_400_000;

/// Default interaction journal capacity
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100;

/// Default trending window (7 days)
pub const DEFAULT_TRENDING_WINDOW_MS: i64 = 7 * DAY_MS;

/// Default minimum in-window interactions for a model to trend
pub const DEFAULT_MIN_TRENDING_THRESHOLD: u64 = 5;

/// Default result cache TTL (5 minutes)
pub const DEFAULT_CACHE_TTL_MS: i64 = 5 * 60 * 1_000;

/// Default maximum result cache entries
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 100;

/// Default diversity factor for personalized ranking
pub const DEFAULT_DIVERSITY_FACTOR: f32 = 0.3;

/// Default session window for view co-occurrence (30 minutes)
pub const DEFAULT_SESSION_WINDOW_MS: i64 = 30 * 60 * 1_000;

/// Weights for pairwise model similarity
///
/// The defaults sum to 1.0, which keeps similarity scores inside [0, 100].
/// Custom weights are accepted as-is; a set that does not sum to 1 simply
/// changes the score range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Weight of exact category match
    pub category: f32,

    /// Weight of tag-set Jaccard overlap
    pub tags: f32,

    /// Weight of exact framework match
    pub framework: f32,

    /// Weight of size-class adjacency
    pub model_size: f32,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            category: 0.40,
            tags: 0.30,
            framework: 0.15,
            model_size: 0.15,
        }
    }
}

/// Recommendation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Similarity weights for content-based scoring
    pub weights: SimilarityWeights,

    /// Trending interaction window in milliseconds
    pub trending_window_ms: i64,

    /// Minimum in-window (sales + inferences) for a model to trend
    pub min_trending_threshold: u64,

    /// Result cache time-to-live in milliseconds
    pub cache_ttl_ms: i64,

    /// Maximum result cache entries before size eviction
    pub max_cache_entries: usize,

    /// Diversity factor for the personalized category penalty
    pub diversity_factor: f32,

    /// Session window for view co-occurrence in milliseconds
    pub session_window_ms: i64,

    /// Maximum interaction events retained in the journal
    pub journal_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            trending_window_ms: DEFAULT_TRENDING_WINDOW_MS,
            min_trending_threshold: DEFAULT_MIN_TRENDING_THRESHOLD,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            diversity_factor: DEFAULT_DIVERSITY_FACTOR,
            session_window_ms: DEFAULT_SESSION_WINDOW_MS,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}
