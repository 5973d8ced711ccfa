// TTL result cache

use crate::context::{RecommendationContext, RecommendationResult};
use std::collections::HashMap;
use tracing::debug;

/// Cache key derived from a recommendation context
///
/// A BLAKE3 hex digest over the context fields that shape the result set:
/// target model, target user, the sorted algorithm list, and the limit.
/// Sorting the algorithms makes the key order-insensitive even though the
/// merge tie-break is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a context
    pub fn from_context(ctx: &RecommendationContext) -> Self {
        let mut algos: Vec<&str> = ctx.algorithms.iter().map(|a| a.as_str()).collect();
        algos.sort_unstable();

        let material = format!(
            "model:{}|user:{}|algos:{}|limit:{}",
            ctx.model_id.as_deref().unwrap_or("-"),
            ctx.user_id.as_deref().unwrap_or("-"),
            algos.join(","),
            ctx.limit
        );
        Self(blake3::hash(material.as_bytes()).to_hex().to_string())
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One cached result with its lifetime bounds
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached result, returned verbatim on hits
    pub result: RecommendationResult,

    /// When the entry was created, wall-clock milliseconds
    pub created_at_ms: i64,

    /// Absolute expiry, wall-clock milliseconds
    pub expires_at_ms: i64,
}

/// Bounded TTL cache for recommendation results
///
/// Entries expire at an absolute timestamp regardless of access. Size
/// pressure evicts the single entry with the oldest creation timestamp,
/// not the least recently used one.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<CacheKey, CacheEntry>,
    max_entries: usize,
}

impl ResultCache {
    /// Create a cache holding at most `max_entries` results
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    /// Return the cached result for `key`, if present and fresh
    ///
    /// A lookup that finds an expired entry removes it and misses.
    pub fn lookup(&mut self, key: &CacheKey, now_ms: i64) -> Option<RecommendationResult> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if now_ms <= entry.expires_at_ms {
                    return Some(entry.result.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a result under `key`, evicting the oldest entry while over
    /// capacity
    pub fn insert(
        &mut self,
        key: CacheKey,
        result: RecommendationResult,
        now_ms: i64,
        ttl_ms: i64,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                result,
                created_at_ms: now_ms,
                expires_at_ms: now_ms + ttl_ms,
            },
        );

        while self.entries.len() > self.max_entries {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(key, entry)| (entry.created_at_ms, key.as_str().to_string()))
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            debug!(key = oldest.as_str(), "evicting oldest cache entry");
            self.entries.remove(&oldest);
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries (including any not yet swept expired ones)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Algorithm;

    fn result(ctx: &RecommendationContext) -> RecommendationResult {
        RecommendationResult {
            recommendations: Vec::new(),
            context: ctx.clone(),
            total_candidates: 0,
            took_ms: 0,
            algorithms_used: Vec::new(),
        }
    }

    fn context(limit: usize) -> RecommendationContext {
        RecommendationContext::for_model("m1").with_limit(limit)
    }

    #[test]
    fn test_key_is_order_insensitive_over_algorithms() {
        let a = context(10).with_algorithms(vec![Algorithm::Trending, Algorithm::ContentBased]);
        let b = context(10).with_algorithms(vec![Algorithm::ContentBased, Algorithm::Trending]);
        assert_eq!(CacheKey::from_context(&a), CacheKey::from_context(&b));
    }

    #[test]
    fn test_key_varies_with_limit_and_targets() {
        let base = CacheKey::from_context(&context(10));
        assert_ne!(base, CacheKey::from_context(&context(5)));
        assert_ne!(
            base,
            CacheKey::from_context(&RecommendationContext::for_user("u1").with_limit(10))
        );
    }

    #[test]
    fn test_lookup_respects_ttl() {
        let mut cache = ResultCache::new(10);
        let ctx = context(10);
        let key = CacheKey::from_context(&ctx);
        cache.insert(key.clone(), result(&ctx), 1_000, 500);

        // Fresh at the expiry boundary
        assert!(cache.lookup(&key, 1_500).is_some());
        // Expired just past it, and the entry is swept
        assert!(cache.lookup(&key, 1_501).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_size_eviction_drops_oldest_created() {
        let mut cache = ResultCache::new(2);
        let contexts: Vec<RecommendationContext> =
            (1..=3).map(|i| context(i)).collect();

        for (i, ctx) in contexts.iter().enumerate() {
            cache.insert(
                CacheKey::from_context(ctx),
                result(ctx),
                1_000 + i as i64,
                10_000,
            );
        }

        assert_eq!(cache.len(), 2);
        // The first-inserted (oldest created) entry is gone
        assert!(cache
            .lookup(&CacheKey::from_context(&contexts[0]), 1_500)
            .is_none());
        assert!(cache
            .lookup(&CacheKey::from_context(&contexts[1]), 1_500)
            .is_some());
        assert!(cache
            .lookup(&CacheKey::from_context(&contexts[2]), 1_500)
            .is_some());
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = ResultCache::new(10);
        let ctx = context(10);
        cache.insert(CacheKey::from_context(&ctx), result(&ctx), 1_000, 10_000);
        cache.clear();
        assert!(cache.is_empty());
    }
}
