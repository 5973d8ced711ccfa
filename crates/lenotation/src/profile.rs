// Per-user preference profiles

use indexmap::IndexMap;
use lecatalogue::{Catalog, InteractionEvent, InteractionKind, ModelCategory};
use serde::{Deserialize, Serialize};

/// How many trailing events a profile keeps verbatim
const RECENT_EVENT_LIMIT: usize = 20;

/// Observed purchase price range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest base price among purchased models
    pub min: f64,

    /// Highest base price among purchased models
    pub max: f64,
}

/// Derived preference profile for one user
///
/// Recomputed on demand from the interaction log; never persisted.
/// Frequency counters are raw counts in first-encounter order of the log,
/// not normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Profiled user
    pub user_id: String,

    /// Category interaction counts
    pub categories: IndexMap<ModelCategory, u32>,

    /// Tag interaction counts
    pub tags: IndexMap<String, u32>,

    /// Framework interaction counts
    pub frameworks: IndexMap<String, u32>,

    /// Price range observed across purchases only; {0, 0} when the user
    /// has never purchased
    pub price_range: PriceRange,

    /// Timestamp of the user's earliest logged event
    pub first_seen_ms: Option<i64>,

    /// Timestamp of the user's latest logged event
    pub last_seen_ms: Option<i64>,

    /// Total purchase events
    pub purchases: u32,

    /// Total inference events
    pub inferences: u32,

    /// The user's most recent events, in log order
    pub recent_events: Vec<InteractionEvent>,
}

impl PreferenceProfile {
    fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            categories: IndexMap::new(),
            tags: IndexMap::new(),
            frameworks: IndexMap::new(),
            price_range: PriceRange::default(),
            first_seen_ms: None,
            last_seen_ms: None,
            purchases: 0,
            inferences: 0,
            recent_events: Vec::new(),
        }
    }

    /// Whether the profile observed any catalog attributes at all
    pub fn is_cold(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty() && self.frameworks.is_empty()
    }
}

/// Builds preference profiles from the interaction log
pub struct ProfileBuilder;

impl ProfileBuilder {
    /// Derive a profile for `user_id`
    ///
    /// Attribute counters only consider events whose model exists in the
    /// catalog snapshot; activity counts and timestamps consider every
    /// event of the user. The price range comes from purchase events
    /// alone, at the model's current base price.
    pub fn build(
        user_id: &str,
        events: &[InteractionEvent],
        catalog: &Catalog,
    ) -> PreferenceProfile {
        let mut profile = PreferenceProfile::empty(user_id);

        let user_events: Vec<&InteractionEvent> =
            events.iter().filter(|e| e.user_id == user_id).collect();

        let mut price_min = f64::INFINITY;
        let mut price_max = f64::NEG_INFINITY;

        for event in &user_events {
            profile.first_seen_ms = Some(
                profile
                    .first_seen_ms
                    .map_or(event.timestamp_ms, |t| t.min(event.timestamp_ms)),
            );
            profile.last_seen_ms = Some(
                profile
                    .last_seen_ms
                    .map_or(event.timestamp_ms, |t| t.max(event.timestamp_ms)),
            );

            match event.kind {
                InteractionKind::Purchase => profile.purchases += 1,
                InteractionKind::Inference => profile.inferences += 1,
                InteractionKind::View => {}
            }

            let Some(model) = catalog.get(&event.model_id) else {
                continue;
            };

            *profile.categories.entry(model.category).or_insert(0) += 1;
            for tag in &model.tags {
                *profile.tags.entry(tag.clone()).or_insert(0) += 1;
            }
            *profile.frameworks.entry(model.framework.clone()).or_insert(0) += 1;

            if event.kind == InteractionKind::Purchase {
                price_min = price_min.min(model.base_price);
                price_max = price_max.max(model.base_price);
            }
        }

        if price_min.is_finite() {
            profile.price_range = PriceRange {
                min: price_min,
                max: price_max,
            };
        }

        let skip = user_events.len().saturating_sub(RECENT_EVENT_LIMIT);
        profile.recent_events = user_events[skip..].iter().map(|e| (*e).clone()).collect();

        profile
    }
}
