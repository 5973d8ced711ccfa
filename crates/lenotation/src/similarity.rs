// Pairwise model similarity

use lecatalogue::{Catalog, CatalogModel, SimilarityWeights, SizeClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A model identifier with its computed score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredModel {
    /// Scored model identifier
    pub model_id: String,

    /// Computed score
    pub score: f32,
}

/// Jaccard overlap of two tag sets
///
/// |intersection| / |union|; 0.0 when the union is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

/// Size-class adjacency in [0, 1]
///
/// Identical sizes score 1.0 and each step apart in the size ordering
/// costs 0.25. A missing size on either side scores 0.
pub fn size_adjacency(a: Option<SizeClass>, b: Option<SizeClass>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => {
            let distance = (a.index() as f32 - b.index() as f32).abs();
            (1.0 - 0.25 * distance).max(0.0)
        }
        _ => 0.0,
    }
}

/// Weighted pairwise similarity of two catalog models
///
/// Four terms, each sub-score in [0, 1] scaled by its weight and 100:
/// category equality, tag Jaccard, framework equality (case-sensitive),
/// and size-class adjacency. With the default weights the result stays
/// inside [0, 100].
pub fn similarity(a: &CatalogModel, b: &CatalogModel, weights: &SimilarityWeights) -> f32 {
    let mut score = 0.0;

    if a.category == b.category {
        score += weights.category * 100.0;
    }

    score += jaccard(&a.tags, &b.tags) * weights.tags * 100.0;

    if a.framework == b.framework {
        score += weights.framework * 100.0;
    }

    score += size_adjacency(a.size_class, b.size_class) * weights.model_size * 100.0;

    score
}

/// Rank catalog models by similarity to a target
///
/// The target itself and inactive models are excluded. The sort is stable
/// and descending, so score ties keep catalog order. An unknown target
/// yields no results.
pub fn rank_similar(
    target_id: &str,
    catalog: &Catalog,
    weights: &SimilarityWeights,
    limit: usize,
) -> Vec<ScoredModel> {
    let Some(target) = catalog.get(target_id) else {
        return Vec::new();
    };

    let mut scored: Vec<ScoredModel> = catalog
        .iter()
        .filter(|m| m.id != target_id && m.active)
        .map(|m| ScoredModel {
            model_id: m.id.clone(),
            score: similarity(target, m, weights),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecatalogue::ModelCategory;
    use proptest::prelude::*;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn model(id: &str, category: ModelCategory, tag_list: &[&str]) -> CatalogModel {
        CatalogModel {
            id: id.to_string(),
            name: id.to_uppercase(),
            category,
            tags: tags(tag_list),
            framework: "pytorch".to_string(),
            size_class: Some(SizeClass::Medium),
            base_price: 10.0,
            listed_at_ms: 1_000,
            active: true,
            total_sales: 0,
            total_inferences: 0,
        }
    }

    #[test]
    fn test_jaccard_cases() {
        let empty = BTreeSet::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);

        let a = tags(&["nlp", "gpt"]);
        assert_eq!(jaccard(&a, &a), 1.0);

        let b = tags(&["nlp", "vision"]);
        let j = jaccard(&a, &b);
        assert!((j - 1.0 / 3.0).abs() < 1e-6);
    }

    #[rstest::rstest]
    #[case(Some(SizeClass::Medium), Some(SizeClass::Medium), 1.0)]
    #[case(Some(SizeClass::Medium), Some(SizeClass::Large), 0.75)]
    #[case(Some(SizeClass::Small), Some(SizeClass::Large), 0.5)]
    #[case(Some(SizeClass::Tiny), Some(SizeClass::XLarge), 0.0)]
    #[case(None, Some(SizeClass::Tiny), 0.0)]
    #[case(Some(SizeClass::Tiny), None, 0.0)]
    fn test_size_adjacency_steps(
        #[case] a: Option<SizeClass>,
        #[case] b: Option<SizeClass>,
        #[case] expected: f32,
    ) {
        assert_eq!(size_adjacency(a, b), expected);
        assert_eq!(size_adjacency(b, a), expected);
    }

    #[test]
    fn test_same_category_shared_tag_scores_fifty() {
        // Same category (40) plus 1-of-3 tag Jaccard (10): exactly 50
        let mut a = model("a", ModelCategory::LanguageModel, &["nlp", "gpt"]);
        let mut b = model("b", ModelCategory::LanguageModel, &["nlp", "vision"]);
        a.framework = "jax".to_string();
        b.framework = "pytorch".to_string();
        a.size_class = None;
        b.size_class = None;

        let score = similarity(&a, &b, &SimilarityWeights::default());
        assert!((score - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_identical_models_score_hundred() {
        let a = model("a", ModelCategory::Embedding, &["fast", "small"]);
        let score = similarity(&a, &a, &SimilarityWeights::default());
        assert!((score - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_framework_match_is_case_sensitive() {
        let a = model("a", ModelCategory::Other, &[]);
        let mut b = model("b", ModelCategory::LanguageModel, &[]);
        b.framework = "PyTorch".to_string();
        b.size_class = None;

        let score = similarity(&a, &b, &SimilarityWeights::default());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_rank_similar_excludes_target_and_inactive() {
        let mut inactive = model("c", ModelCategory::LanguageModel, &["nlp"]);
        inactive.active = false;
        let catalog = Catalog::new(vec![
            model("a", ModelCategory::LanguageModel, &["nlp"]),
            model("b", ModelCategory::LanguageModel, &["nlp"]),
            inactive,
        ]);

        let ranked = rank_similar("a", &catalog, &SimilarityWeights::default(), 10);
        let ids: Vec<&str> = ranked.iter().map(|s| s.model_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_rank_similar_ties_keep_catalog_order() {
        let catalog = Catalog::new(vec![
            model("a", ModelCategory::LanguageModel, &["nlp"]),
            model("z", ModelCategory::LanguageModel, &["nlp"]),
            model("b", ModelCategory::LanguageModel, &["nlp"]),
        ]);

        let ranked = rank_similar("a", &catalog, &SimilarityWeights::default(), 10);
        let ids: Vec<&str> = ranked.iter().map(|s| s.model_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "b"]);
    }

    #[test]
    fn test_rank_similar_unknown_target() {
        let catalog = Catalog::new(vec![model("a", ModelCategory::Other, &[])]);
        assert!(rank_similar("missing", &catalog, &SimilarityWeights::default(), 5).is_empty());
    }

    proptest! {
        #[test]
        fn prop_jaccard_symmetric(
            a in proptest::collection::btree_set("[a-d]{1,3}", 0..6),
            b in proptest::collection::btree_set("[a-d]{1,3}", 0..6),
        ) {
            prop_assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        }

        #[test]
        fn prop_similarity_bounded_with_default_weights(
            tags_a in proptest::collection::btree_set("[a-c]{1,2}", 0..4),
            tags_b in proptest::collection::btree_set("[a-c]{1,2}", 0..4),
            same_category in any::<bool>(),
            same_framework in any::<bool>(),
        ) {
            let mut a = model("a", ModelCategory::LanguageModel, &[]);
            let mut b = model(
                "b",
                if same_category { ModelCategory::LanguageModel } else { ModelCategory::Other },
                &[],
            );
            a.tags = tags_a;
            b.tags = tags_b;
            if !same_framework {
                b.framework = "jax".to_string();
            }

            let score = similarity(&a, &b, &SimilarityWeights::default());
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }
}
