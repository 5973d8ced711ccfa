// Co-purchase collaborative signal

use indexmap::{IndexMap, IndexSet};
use lecatalogue::{InteractionEvent, InteractionKind};

/// Users who purchased the given model, in log order
pub(crate) fn purchasers<'a>(model_id: &str, events: &'a [InteractionEvent]) -> IndexSet<&'a str> {
    events
        .iter()
        .filter(|e| e.kind == InteractionKind::Purchase && e.model_id == model_id)
        .map(|e| e.user_id.as_str())
        .collect()
}

/// Count the other purchases of everyone who bought `model_id`
///
/// Each purchase event counts once, so a user who bought the same other
/// model twice contributes two. Counts keep first-encounter order for
/// deterministic tie-breaking downstream.
pub(crate) fn also_bought(model_id: &str, events: &[InteractionEvent]) -> IndexMap<String, u32> {
    let buyers = purchasers(model_id, events);

    let mut counts: IndexMap<String, u32> = IndexMap::new();
    for event in events {
        if event.kind == InteractionKind::Purchase
            && event.model_id != model_id
            && buyers.contains(event.user_id.as_str())
        {
            *counts.entry(event.model_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Sort a count map descending, count ties keeping map (insertion) order
pub(crate) fn rank_counts(counts: IndexMap<String, u32>) -> Vec<(String, u32)> {
    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(model: &str, user: &str, ts: i64) -> InteractionEvent {
        InteractionEvent::new(InteractionKind::Purchase, model, user, ts)
    }

    fn view(model: &str, user: &str, ts: i64) -> InteractionEvent {
        InteractionEvent::new(InteractionKind::View, model, user, ts)
    }

    #[test]
    fn test_also_bought_counts_other_purchases() {
        let events = vec![
            purchase("target", "alice", 1_000),
            purchase("other-a", "alice", 2_000),
            purchase("other-a", "alice", 3_000),
            purchase("other-b", "alice", 4_000),
            purchase("target", "bob", 5_000),
            purchase("other-b", "bob", 6_000),
            // carol never bought the target
            purchase("other-c", "carol", 7_000),
            // views never count
            view("other-d", "alice", 8_000),
        ];

        let counts = also_bought("target", &events);
        assert_eq!(counts.get("other-a"), Some(&2));
        assert_eq!(counts.get("other-b"), Some(&2));
        assert!(counts.get("other-c").is_none());
        assert!(counts.get("other-d").is_none());
        assert!(counts.get("target").is_none());
    }

    #[test]
    fn test_no_purchasers_yields_empty() {
        let events = vec![view("target", "alice", 1_000), purchase("other", "alice", 2_000)];
        assert!(purchasers("target", &events).is_empty());
        assert!(also_bought("target", &events).is_empty());
    }

    #[test]
    fn test_rank_counts_breaks_ties_by_first_encounter() {
        let mut counts = IndexMap::new();
        counts.insert("first".to_string(), 2u32);
        counts.insert("bigger".to_string(), 5u32);
        counts.insert("tied-with-first".to_string(), 2u32);

        let ranked = rank_counts(counts);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["bigger", "first", "tied-with-first"]);
    }
}
