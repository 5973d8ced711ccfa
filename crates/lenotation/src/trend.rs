// Time-windowed trend scoring

use lecatalogue::config::{DAY_MS, DEFAULT_MIN_TRENDING_THRESHOLD, DEFAULT_TRENDING_WINDOW_MS};
use lecatalogue::{Catalog, InteractionEvent, InteractionKind};
use serde::{Deserialize, Serialize};

/// Momentum always looks at the trailing 7 days, whatever the window
const MOMENTUM_WINDOW_MS: i64 = 7 * DAY_MS;

/// Trend metrics for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendScore {
    /// Scored model identifier
    pub model_id: String,

    /// Popularity score: age-normalized sales-weighted volume, boosted by
    /// last-24h activity
    pub score: f32,

    /// (sales + inferences) per day of listing age
    pub velocity: f32,

    /// Fraction of the model's lifetime interaction volume that happened
    /// in the last 7 days
    pub momentum: f32,

    /// Purchase events inside the window
    pub sales: u64,

    /// Inference events inside the window
    pub inferences: u64,
}

/// Scores catalog models by recent interaction volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendScorer {
    /// Interaction window in milliseconds
    pub window_ms: i64,

    /// Minimum in-window (sales + inferences) to qualify
    pub min_threshold: u64,
}

impl Default for TrendScorer {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_TRENDING_WINDOW_MS,
            min_threshold: DEFAULT_MIN_TRENDING_THRESHOLD,
        }
    }
}

impl TrendScorer {
    /// Create a scorer with an explicit window
    pub fn new(window_ms: i64, min_threshold: u64) -> Self {
        Self {
            window_ms,
            min_threshold,
        }
    }

    /// Score every active catalog model, descending, truncated to `limit`
    ///
    /// Listing age is clamped to one day so same-day listings don't blow
    /// the normalization up. Models below the interaction threshold are
    /// dropped. Ties keep catalog order (stable sort).
    pub fn score_catalog(
        &self,
        catalog: &Catalog,
        events: &[InteractionEvent],
        now_ms: i64,
        limit: usize,
    ) -> Vec<TrendScore> {
        let window_cutoff = now_ms - self.window_ms;
        let last_day_cutoff = now_ms - DAY_MS;
        let momentum_cutoff = now_ms - MOMENTUM_WINDOW_MS;

        let mut scored = Vec::new();
        for model in catalog.iter().filter(|m| m.active) {
            let lifetime: Vec<&InteractionEvent> = events
                .iter()
                .filter(|e| e.model_id == model.id)
                .collect();
            let in_window: Vec<&&InteractionEvent> = lifetime
                .iter()
                .filter(|e| e.timestamp_ms >= window_cutoff)
                .collect();

            let sales = in_window
                .iter()
                .filter(|e| e.kind == InteractionKind::Purchase)
                .count() as u64;
            let inferences = in_window
                .iter()
                .filter(|e| e.kind == InteractionKind::Inference)
                .count() as u64;

            if sales + inferences < self.min_threshold {
                continue;
            }

            let days_since_listing =
                ((now_ms - model.listed_at_ms) as f32 / DAY_MS as f32).max(1.0);

            let last_day_count = in_window
                .iter()
                .filter(|e| e.timestamp_ms >= last_day_cutoff)
                .count();
            let recent_weight = 1.0 + 0.5 * last_day_count as f32;

            let score = ((sales * 2 + inferences) as f32 / days_since_listing) * recent_weight;
            let velocity = (sales + inferences) as f32 / days_since_listing;

            let momentum_count = lifetime
                .iter()
                .filter(|e| e.timestamp_ms >= momentum_cutoff)
                .count();
            let momentum = momentum_count as f32 / lifetime.len().max(1) as f32;

            scored.push(TrendScore {
                model_id: model.id.clone(),
                score,
                velocity,
                momentum,
                sales,
                inferences,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }
}
