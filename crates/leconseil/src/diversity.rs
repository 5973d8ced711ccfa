// Diversity re-ranking

use crate::context::RecommendationScore;
use lecatalogue::{Catalog, ModelCategory};
use std::collections::{HashMap, HashSet};

/// Same-category entries admitted before the cap applies
const CATEGORY_CAP: u32 = 3;

/// Fraction of the limit that must be filled before the cap bites
const FILL_RATIO: f32 = 0.7;

/// Cap same-category repetition among the top results
///
/// Walks the ranked list in score order. An entry is admitted while its
/// category has appeared fewer than three times, or while the output is
/// still under 70% of the requested limit. Entries deferred by the cap
/// backfill any remaining slots afterwards, still in score order, so the
/// output only shrinks when the input does.
pub(crate) fn diversify(
    ranked: Vec<RecommendationScore>,
    catalog: &Catalog,
    limit: usize,
) -> Vec<RecommendationScore> {
    let fill_floor = limit as f32 * FILL_RATIO;

    let mut category_counts: HashMap<ModelCategory, u32> = HashMap::new();
    let mut picked: Vec<RecommendationScore> = Vec::new();
    let mut deferred: Vec<RecommendationScore> = Vec::new();

    for entry in ranked {
        if picked.len() >= limit {
            break;
        }

        match catalog.get(&entry.model_id).map(|m| m.category) {
            Some(category) => {
                let count = category_counts.entry(category).or_insert(0);
                if *count < CATEGORY_CAP || (picked.len() as f32) < fill_floor {
                    *count += 1;
                    picked.push(entry);
                } else {
                    deferred.push(entry);
                }
            }
            // No category to repeat: admit freely
            None => picked.push(entry),
        }
    }

    if picked.len() < limit {
        let included: HashSet<String> = picked.iter().map(|e| e.model_id.clone()).collect();
        for entry in deferred {
            if picked.len() >= limit {
                break;
            }
            if !included.contains(&entry.model_id) {
                picked.push(entry);
            }
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Algorithm, REASON_TRENDING};
    use lecatalogue::{CatalogModel, SizeClass};
    use std::collections::BTreeSet;

    fn model(id: &str, category: ModelCategory) -> CatalogModel {
        CatalogModel {
            id: id.to_string(),
            name: id.to_uppercase(),
            category,
            tags: BTreeSet::new(),
            framework: "pytorch".to_string(),
            size_class: Some(SizeClass::Medium),
            base_price: 10.0,
            listed_at_ms: 1_000,
            active: true,
            total_sales: 0,
            total_inferences: 0,
        }
    }

    fn entry(id: &str, score: f32) -> RecommendationScore {
        RecommendationScore {
            model_id: id.to_string(),
            score,
            reason: REASON_TRENDING.to_string(),
            algorithm: Algorithm::Trending,
        }
    }

    fn catalog_of(categories: &[(&str, ModelCategory)]) -> Catalog {
        Catalog::new(categories.iter().map(|(id, c)| model(id, *c)).collect())
    }

    #[test]
    fn test_caps_category_after_three_once_filled() {
        // 6 language models then 2 embeddings, limit 5: the fourth+ LLM
        // is deferred once 70% (3.5) of the limit is reached
        let catalog = catalog_of(&[
            ("l1", ModelCategory::LanguageModel),
            ("l2", ModelCategory::LanguageModel),
            ("l3", ModelCategory::LanguageModel),
            ("l4", ModelCategory::LanguageModel),
            ("l5", ModelCategory::LanguageModel),
            ("l6", ModelCategory::LanguageModel),
            ("e1", ModelCategory::Embedding),
            ("e2", ModelCategory::Embedding),
        ]);
        let ranked: Vec<RecommendationScore> = [
            ("l1", 90.0),
            ("l2", 89.0),
            ("l3", 88.0),
            ("l4", 87.0),
            ("l5", 86.0),
            ("l6", 85.0),
            ("e1", 50.0),
            ("e2", 49.0),
        ]
        .iter()
        .map(|(id, s)| entry(id, *s))
        .collect();

        let picked = diversify(ranked, &catalog, 5);
        let ids: Vec<&str> = picked.iter().map(|e| e.model_id.as_str()).collect();
        // l4 admitted while under the 70% floor; l5/l6 deferred past it,
        // which promotes the lower-scored embedding into the final slot
        assert_eq!(ids, vec!["l1", "l2", "l3", "l4", "e1"]);
    }

    #[test]
    fn test_backfill_when_only_one_category() {
        let catalog = catalog_of(&[
            ("a", ModelCategory::LanguageModel),
            ("b", ModelCategory::LanguageModel),
            ("c", ModelCategory::LanguageModel),
            ("d", ModelCategory::LanguageModel),
            ("e", ModelCategory::LanguageModel),
        ]);
        let ranked: Vec<RecommendationScore> = [
            ("a", 90.0),
            ("b", 80.0),
            ("c", 70.0),
            ("d", 60.0),
            ("e", 50.0),
        ]
        .iter()
        .map(|(id, s)| entry(id, *s))
        .collect();

        // Insufficient variety must not shrink the output
        let picked = diversify(ranked, &catalog, 5);
        let ids: Vec<&str> = picked.iter().map(|e| e.model_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_respects_limit() {
        let catalog = catalog_of(&[
            ("a", ModelCategory::LanguageModel),
            ("b", ModelCategory::Embedding),
            ("c", ModelCategory::Translation),
        ]);
        let ranked = vec![entry("a", 3.0), entry("b", 2.0), entry("c", 1.0)];

        let picked = diversify(ranked, &catalog, 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].model_id, "a");
    }

    #[test]
    fn test_empty_input() {
        let catalog = catalog_of(&[]);
        assert!(diversify(Vec::new(), &catalog, 10).is_empty());
    }
}
