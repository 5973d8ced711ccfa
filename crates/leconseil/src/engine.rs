// Recommendation engine

use crate::cache::{CacheKey, ResultCache};
use crate::collaborative;
use crate::context::{
    Algorithm, EngineStatistics, RecommendationContext, RecommendationResult,
    RecommendationScore, COLLABORATIVE_SCORE, CONTENT_BASED_SCORE, REASON_COLLABORATIVE,
    REASON_CONTENT_BASED, REASON_PERSONALIZED, REASON_TRENDING, TRENDING_SCORE,
};
use crate::diversity::diversify;
use anyhow::Context as _;
use chrono::Utc;
use indexmap::IndexMap;
use lecatalogue::{
    Catalog, CatalogModel, EngineConfig, EventMetadata, InteractionEvent, InteractionKind,
    ModelCategory, ANONYMOUS_USER,
};
use lejournal::{ImportReport, InteractionJournal, KeyValueStore};
use lenotation::{rank_similar, ProfileBuilder, TrendScorer};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info};

/// Orchestrates similarity, trend, collaborative, and preference scoring
/// over one catalog snapshot
///
/// One engine value per composition root; whoever builds the application
/// owns it and passes it by reference. Scoring is a pure function of the
/// snapshot, the interaction log, and the request; the only mutable state
/// is the journal and the result cache.
pub struct RecommendationEngine {
    catalog: Catalog,
    config: EngineConfig,
    journal: InteractionJournal,
    cache: ResultCache,
}

impl RecommendationEngine {
    /// Build an engine over a catalog snapshot
    pub fn new(
        models: Vec<CatalogModel>,
        config: EngineConfig,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let catalog = Catalog::new(models);
        let journal = InteractionJournal::with_capacity(store, config.journal_capacity);
        let cache = ResultCache::new(config.max_cache_entries);

        info!(
            total_models = catalog.len(),
            active_models = catalog.active_count(),
            "recommendation engine initialized"
        );

        Self {
            catalog,
            config,
            journal,
            cache,
        }
    }

    /// Build an engine with the default configuration
    pub fn with_defaults(models: Vec<CatalogModel>, store: Box<dyn KeyValueStore>) -> Self {
        Self::new(models, EngineConfig::default(), store)
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current catalog snapshot
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Read access to the interaction journal
    pub fn journal(&self) -> &InteractionJournal {
        &self.journal
    }

    // ---- tracking -------------------------------------------------------

    /// Record a listing view
    pub fn track_view(
        &mut self,
        model_id: &str,
        user_id: Option<&str>,
        metadata: Option<EventMetadata>,
    ) {
        let mut event = InteractionEvent::new(
            InteractionKind::View,
            model_id,
            user_id.unwrap_or(ANONYMOUS_USER),
            Self::now_ms(),
        );
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.journal.record(event);
    }

    /// Record a completed purchase
    pub fn track_purchase(&mut self, model_id: &str, user_id: &str) {
        self.journal.record(InteractionEvent::new(
            InteractionKind::Purchase,
            model_id,
            user_id,
            Self::now_ms(),
        ));
    }

    /// Record an inference call
    pub fn track_inference(&mut self, model_id: &str, user_id: &str) {
        self.journal.record(InteractionEvent::new(
            InteractionKind::Inference,
            model_id,
            user_id,
            Self::now_ms(),
        ));
    }

    /// Record a pre-stamped event, e.g. when replaying history
    pub fn record_event(&mut self, event: InteractionEvent) {
        self.journal.record(event);
    }

    // ---- recommendations ------------------------------------------------

    /// Answer a recommendation request at the current wall-clock time
    pub fn get_recommendations(&mut self, context: RecommendationContext) -> RecommendationResult {
        self.recommend_at(context, Self::now_ms())
    }

    /// Answer a recommendation request at an explicit point in time
    ///
    /// A fresh cache entry for the same context is returned verbatim, with
    /// no re-ranking or re-filtering; the cached result is authoritative
    /// until it expires or the catalog is replaced.
    pub fn recommend_at(
        &mut self,
        context: RecommendationContext,
        now_ms: i64,
    ) -> RecommendationResult {
        let started = Instant::now();

        let key = CacheKey::from_context(&context);
        if let Some(hit) = self.cache.lookup(&key, now_ms) {
            debug!(key = key.as_str(), "returning cached recommendations");
            return hit;
        }

        let events = self.journal.all();
        let mut merged: IndexMap<String, RecommendationScore> = IndexMap::new();
        let mut algorithms_used: Vec<Algorithm> = Vec::new();
        let mut total_candidates = 0usize;

        for algorithm in context.algorithms.iter().copied() {
            let candidates = self.candidates_for(algorithm, &context, &events, now_ms);
            if candidates.is_empty() {
                continue;
            }
            algorithms_used.push(algorithm);
            total_candidates += candidates.len();

            for candidate in candidates {
                if context.exclude.contains(&candidate.model_id) {
                    continue;
                }
                if context.min_score.is_some_and(|min| candidate.score < min) {
                    continue;
                }
                // Highest score wins; equal scores keep the entry of the
                // algorithm that ran first
                let better = merged
                    .get(&candidate.model_id)
                    .map_or(true, |existing| candidate.score > existing.score);
                if better {
                    merged.insert(candidate.model_id.clone(), candidate);
                }
            }
        }

        let mut ranked: Vec<RecommendationScore> = merged.into_values().collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let recommendations = diversify(ranked, &self.catalog, context.limit);

        let result = RecommendationResult {
            recommendations,
            context,
            total_candidates,
            took_ms: started.elapsed().as_millis() as u64,
            algorithms_used,
        };

        debug!(
            returned = result.recommendations.len(),
            candidates = total_candidates,
            "generated recommendations"
        );
        self.cache
            .insert(key, result.clone(), now_ms, self.config.cache_ttl_ms);
        result
    }

    fn candidates_for(
        &self,
        algorithm: Algorithm,
        context: &RecommendationContext,
        events: &[InteractionEvent],
        now_ms: i64,
    ) -> Vec<RecommendationScore> {
        match algorithm {
            Algorithm::ContentBased => {
                let Some(model_id) = context.model_id.as_deref() else {
                    return Vec::new();
                };
                rank_similar(model_id, &self.catalog, &self.config.weights, context.limit)
                    .into_iter()
                    .map(|scored| RecommendationScore {
                        model_id: scored.model_id,
                        score: CONTENT_BASED_SCORE,
                        reason: REASON_CONTENT_BASED.to_string(),
                        algorithm,
                    })
                    .collect()
            }
            Algorithm::Collaborative => {
                let Some(model_id) = context.model_id.as_deref() else {
                    return Vec::new();
                };
                self.also_bought_ranked(model_id, events)
                    .into_iter()
                    .filter(|(id, _)| self.catalog.get(id).is_some_and(|m| m.active))
                    .take(context.limit)
                    .map(|(model_id, _)| RecommendationScore {
                        model_id,
                        score: COLLABORATIVE_SCORE,
                        reason: REASON_COLLABORATIVE.to_string(),
                        algorithm,
                    })
                    .collect()
            }
            Algorithm::Trending => {
                TrendScorer::new(
                    self.config.trending_window_ms,
                    self.config.min_trending_threshold,
                )
                .score_catalog(&self.catalog, events, now_ms, context.limit)
                .into_iter()
                .map(|trend| RecommendationScore {
                    model_id: trend.model_id,
                    score: TRENDING_SCORE,
                    reason: REASON_TRENDING.to_string(),
                    algorithm,
                })
                .collect()
            }
            Algorithm::Personalized => {
                let Some(user_id) = context.user_id.as_deref() else {
                    return Vec::new();
                };
                self.personalized_scores(user_id, events, context.limit)
            }
        }
    }

    // ---- content-based --------------------------------------------------

    /// Active models most similar to the given one
    pub fn similar_models(&self, model_id: &str, limit: usize) -> Vec<CatalogModel> {
        rank_similar(model_id, &self.catalog, &self.config.weights, limit)
            .into_iter()
            .filter_map(|scored| self.catalog.get(&scored.model_id).cloned())
            .collect()
    }

    // ---- collaborative --------------------------------------------------

    fn also_bought_ranked(
        &self,
        model_id: &str,
        events: &[InteractionEvent],
    ) -> Vec<(String, u32)> {
        // Purchase-based signal when anyone bought the model; otherwise
        // fall back to session-proximity view co-occurrence
        let counts = if collaborative::purchasers(model_id, events).is_empty() {
            self.journal
                .co_occurring(model_id, self.config.session_window_ms)
        } else {
            collaborative::also_bought(model_id, events)
        };
        collaborative::rank_counts(counts)
    }

    /// Active models most often bought by buyers of the given one
    pub fn users_who_bought_also_bought(&self, model_id: &str, limit: usize) -> Vec<CatalogModel> {
        let events = self.journal.all();
        self.also_bought_ranked(model_id, &events)
            .into_iter()
            .filter_map(|(id, _)| self.catalog.get(&id))
            .filter(|m| m.active)
            .take(limit)
            .cloned()
            .collect()
    }

    // ---- trending -------------------------------------------------------

    /// Trending models over a window ending now
    pub fn trending_models(&self, window_ms: i64, limit: usize) -> Vec<CatalogModel> {
        self.trending_models_at(window_ms, limit, Self::now_ms())
    }

    /// Trending models over a window ending at an explicit time
    pub fn trending_models_at(
        &self,
        window_ms: i64,
        limit: usize,
        now_ms: i64,
    ) -> Vec<CatalogModel> {
        let events = self.journal.all();
        TrendScorer::new(window_ms, self.config.min_trending_threshold)
            .score_catalog(&self.catalog, &events, now_ms, limit)
            .into_iter()
            .filter_map(|trend| self.catalog.get(&trend.model_id).cloned())
            .collect()
    }

    /// Most popular active models of a category
    pub fn category_recommendations(
        &self,
        category: ModelCategory,
        limit: usize,
    ) -> Vec<CatalogModel> {
        let sales_weighted = |m: &CatalogModel| m.total_sales * 2 + m.total_inferences;

        let mut models: Vec<&CatalogModel> = self
            .catalog
            .iter()
            .filter(|m| m.active && m.category == category)
            .collect();
        models.sort_by(|a, b| sales_weighted(b).cmp(&sales_weighted(a)));
        models.into_iter().take(limit).cloned().collect()
    }

    // ---- personalized ---------------------------------------------------

    /// Active, not-yet-purchased models matched to a user's profile
    pub fn personalized_recommendations(&self, user_id: &str, limit: usize) -> Vec<CatalogModel> {
        let events = self.journal.all();
        self.personalized_scores(user_id, &events, limit)
            .into_iter()
            .filter_map(|scored| self.catalog.get(&scored.model_id).cloned())
            .collect()
    }

    fn personalized_scores(
        &self,
        user_id: &str,
        events: &[InteractionEvent],
        limit: usize,
    ) -> Vec<RecommendationScore> {
        let profile = ProfileBuilder::build(user_id, events, &self.catalog);

        let purchased: HashSet<&str> = events
            .iter()
            .filter(|e| e.user_id == user_id && e.kind == InteractionKind::Purchase)
            .map(|e| e.model_id.as_str())
            .collect();

        let mut category_repeats: HashMap<ModelCategory, u32> = HashMap::new();
        let mut scored: Vec<RecommendationScore> = Vec::new();

        for model in self.catalog.iter() {
            if !model.active || purchased.contains(model.id.as_str()) {
                continue;
            }

            let mut score = 0.0f32;

            score += 40.0 * profile.categories.get(&model.category).copied().unwrap_or(0) as f32;

            let tag_overlap: u32 = model
                .tags
                .iter()
                .map(|tag| profile.tags.get(tag).copied().unwrap_or(0))
                .sum();
            score += (20.0 * tag_overlap as f32).min(30.0);

            score += 15.0
                * profile
                    .frameworks
                    .get(&model.framework)
                    .copied()
                    .unwrap_or(0) as f32;

            // A zero-purchase profile has range {0,0}, so this bonus then
            // only reaches free listings
            let low = 0.5 * profile.price_range.min;
            let high = 2.0 * profile.price_range.max;
            if model.base_price >= low && model.base_price <= high {
                score += 15.0;
            }

            let repeats = category_repeats.entry(model.category).or_insert(0);
            score *= 0.9f32.powf(*repeats as f32 * self.config.diversity_factor);
            *repeats += 1;

            scored.push(RecommendationScore {
                model_id: model.id.clone(),
                score,
                reason: REASON_PERSONALIZED.to_string(),
                algorithm: Algorithm::Personalized,
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

    // ---- lifecycle ------------------------------------------------------

    /// Drop every cached result
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("result cache cleared");
    }

    /// Replace the catalog snapshot
    ///
    /// Always invalidates the whole result cache; stale results must not
    /// outlive the snapshot they were computed from.
    pub fn update_models(&mut self, models: Vec<CatalogModel>) {
        self.catalog = Catalog::new(models);
        self.cache.clear();
        info!(
            total_models = self.catalog.len(),
            "catalog replaced, result cache invalidated"
        );
    }

    /// Engine counters
    pub fn statistics(&self) -> EngineStatistics {
        EngineStatistics {
            total_models: self.catalog.len(),
            active_models: self.catalog.active_count(),
            cache_entries: self.cache.len(),
        }
    }

    // ---- user data ------------------------------------------------------

    /// Serialize the user's interaction history as a JSON document
    pub fn export_user_data(&self) -> anyhow::Result<String> {
        self.journal
            .export_json(Self::now_ms())
            .context("failed to serialize user data export")
    }

    /// Replace the interaction history from an exported document
    pub fn import_user_data(&mut self, json: &str) -> ImportReport {
        self.journal.import_json(json)
    }

    /// Erase the interaction history
    pub fn clear_history(&mut self) {
        self.journal.clear_history();
    }
}
