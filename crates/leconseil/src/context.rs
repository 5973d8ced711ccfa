// Recommendation requests and results

use serde::{Deserialize, Serialize};

/// Default number of recommendations per request
pub const DEFAULT_LIMIT: usize = 10;

/// Reason attached to content-based candidates
pub const REASON_CONTENT_BASED: &str = "Similar to what you're viewing";

/// Reason attached to collaborative candidates
pub const REASON_COLLABORATIVE: &str = "Users who bought this also bought";

/// Reason attached to trending candidates
pub const REASON_TRENDING: &str = "Trending in the marketplace";

/// Reason attached to personalized candidates
pub const REASON_PERSONALIZED: &str = "Based on your interaction history";

/// Fixed representative score for content-based candidates
pub const CONTENT_BASED_SCORE: f32 = 85.0;

/// Fixed representative score for collaborative candidates
pub const COLLABORATIVE_SCORE: f32 = 80.0;

/// Fixed representative score for trending candidates
pub const TRENDING_SCORE: f32 = 75.0;

/// A recommendation algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Attribute similarity to a target model
    ContentBased,
    /// Co-purchase / co-view signal around a target model
    Collaborative,
    /// Recent marketplace-wide interaction volume
    Trending,
    /// Preference-profile match for a target user
    Personalized,
}

impl Algorithm {
    /// Stable identifier used in cache keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::ContentBased => "content-based",
            Algorithm::Collaborative => "collaborative",
            Algorithm::Trending => "trending",
            Algorithm::Personalized => "personalized",
        }
    }

    /// The default algorithm set, in merge-precedence order
    pub fn default_order() -> [Algorithm; 4] {
        [
            Algorithm::ContentBased,
            Algorithm::Collaborative,
            Algorithm::Trending,
            Algorithm::Personalized,
        ]
    }
}

/// What a recommendation request knows about its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    /// Target model, required by content-based and collaborative
    pub model_id: Option<String>,

    /// Target user, required by personalized
    pub user_id: Option<String>,

    /// Algorithms to run, in order
    ///
    /// On merge, equal scores keep the entry of whichever algorithm ran
    /// first in this order; reordering the list changes tie outcomes.
    pub algorithms: Vec<Algorithm>,

    /// Maximum recommendations to return
    pub limit: usize,

    /// Model identifiers to drop from the results
    pub exclude: Vec<String>,

    /// Drop candidates scoring below this, when set
    pub min_score: Option<f32>,
}

impl Default for RecommendationContext {
    fn default() -> Self {
        Self {
            model_id: None,
            user_id: None,
            algorithms: Algorithm::default_order().to_vec(),
            limit: DEFAULT_LIMIT,
            exclude: Vec::new(),
            min_score: None,
        }
    }
}

impl RecommendationContext {
    /// Context centered on a model listing
    pub fn for_model(model_id: impl Into<String>) -> Self {
        Self {
            model_id: Some(model_id.into()),
            ..Self::default()
        }
    }

    /// Context centered on a user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to the given algorithms, keeping their order
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }
}

/// One scored recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationScore {
    /// Recommended model identifier
    pub model_id: String,

    /// Algorithm-scale score; scales are not normalized across algorithms
    pub score: f32,

    /// Human-readable reason
    pub reason: String,

    /// Algorithm that produced this entry
    pub algorithm: Algorithm,
}

/// Outcome of a recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Ranked recommendations, at most `context.limit`
    pub recommendations: Vec<RecommendationScore>,

    /// The request this result answers
    pub context: RecommendationContext,

    /// Candidates considered across algorithms before filtering
    pub total_candidates: usize,

    /// Wall-clock execution time in milliseconds
    pub took_ms: u64,

    /// Algorithms that actually contributed candidates
    ///
    /// An algorithm that lacked required context, or produced nothing, is
    /// absent.
    pub algorithms_used: Vec<Algorithm>,
}

/// Engine counters for dashboards and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatistics {
    /// Models in the current catalog snapshot
    pub total_models: usize,

    /// Active models in the current catalog snapshot
    pub active_models: usize,

    /// Entries currently in the result cache
    pub cache_entries: usize,
}
