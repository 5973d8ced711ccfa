// Interaction journal

use crate::kv::KeyValueStore;
use indexmap::IndexMap;
use lecatalogue::config::DEFAULT_JOURNAL_CAPACITY;
use lecatalogue::{InteractionEvent, InteractionKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Well-known key the serialized event log lives under
pub const INTERACTIONS_KEY: &str = "leconseil/interactions";

/// Current export document version
const EXPORT_VERSION: u32 = 1;

/// Outcome of a user-data import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Whether the import replaced the log
    pub success: bool,

    /// Number of events now in the log
    pub imported: usize,

    /// Failure description, when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportReport {
    fn imported(count: usize) -> Self {
        Self {
            success: true,
            imported: count,
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            imported: 0,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ExportDocument {
    version: u32,
    exported_at_ms: i64,
    events: Vec<InteractionEvent>,
}

/// Append-only, size-bounded log of user interactions
///
/// The single writer appends through [`record`](Self::record); the log is
/// trimmed to capacity oldest-first. Every mutation is persisted through
/// the key-value port as one JSON document. Storage failures are logged
/// and absorbed; the journal keeps serving from memory.
pub struct InteractionJournal {
    store: Box<dyn KeyValueStore>,
    events: Vec<InteractionEvent>,
    capacity: usize,
}

impl InteractionJournal {
    /// Open a journal with the default capacity
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_JOURNAL_CAPACITY)
    }

    /// Open a journal that retains at most `capacity` events
    ///
    /// Loads the persisted log if one exists. An unavailable backend or a
    /// corrupt stored document falls back to an empty log.
    pub fn with_capacity(store: Box<dyn KeyValueStore>, capacity: usize) -> Self {
        let events = match store.get(INTERACTIONS_KEY) {
            Ok(Some(bytes)) => Self::parse_log(&bytes),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to load interaction log, starting empty: {err}");
                Vec::new()
            }
        };

        Self {
            store,
            events,
            capacity,
        }
    }

    /// Lenient log parse: damaged elements are dropped, not fatal
    fn parse_log(bytes: &[u8]) -> Vec<InteractionEvent> {
        let values: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
            Ok(values) => values,
            Err(err) => {
                warn!("interaction log is corrupt, starting empty: {err}");
                return Vec::new();
            }
        };

        let total = values.len();
        let events: Vec<InteractionEvent> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        if events.len() < total {
            warn!(
                dropped = total - events.len(),
                "dropped malformed interaction records on load"
            );
        }
        events
    }

    /// Append one event, trimming the oldest beyond capacity
    ///
    /// Never fails: a storage error is logged and the event stays in the
    /// in-memory log.
    pub fn record(&mut self, event: InteractionEvent) {
        self.events.push(event);
        if self.events.len() > self.capacity {
            let excess = self.events.len() - self.capacity;
            self.events.drain(..excess);
        }
        self.persist();
    }

    fn persist(&mut self) {
        let bytes = match serde_json::to_vec(&self.events) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to serialize interaction log: {err}");
                return;
            }
        };

        if let Err(err) = self.store.set(INTERACTIONS_KEY, &bytes) {
            warn!("failed to persist interaction log, continuing in memory: {err}");
        }
    }

    /// All stored events that pass shape validation
    pub fn all(&self) -> Vec<InteractionEvent> {
        self.events
            .iter()
            .filter(|e| e.is_valid())
            .cloned()
            .collect()
    }

    /// Events with `timestamp >= now - window`, optionally by kind
    pub fn recent_by_window(
        &self,
        now_ms: i64,
        window_ms: i64,
        kind: Option<InteractionKind>,
    ) -> Vec<InteractionEvent> {
        let cutoff = now_ms - window_ms;
        self.events
            .iter()
            .filter(|e| e.is_valid() && e.timestamp_ms >= cutoff)
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect()
    }

    /// Events recorded for one user
    pub fn by_user(&self, user_id: &str) -> Vec<InteractionEvent> {
        self.events
            .iter()
            .filter(|e| e.is_valid() && e.user_id == user_id)
            .cloned()
            .collect()
    }

    /// View co-occurrence counts around views of `model_id`
    ///
    /// For every view of `model_id`, counts other models viewed by any
    /// user within `session_window_ms` of that view, in either direction.
    /// A time-proximity stand-in for real session boundaries. Counts keep
    /// first-encounter order.
    pub fn co_occurring(&self, model_id: &str, session_window_ms: i64) -> IndexMap<String, u32> {
        let views: Vec<&InteractionEvent> = self
            .events
            .iter()
            .filter(|e| e.is_valid() && e.kind == InteractionKind::View)
            .collect();

        let mut counts: IndexMap<String, u32> = IndexMap::new();
        for target in views.iter().filter(|e| e.model_id == model_id) {
            for other in &views {
                if other.model_id != model_id
                    && (other.timestamp_ms - target.timestamp_ms).abs() <= session_window_ms
                {
                    *counts.entry(other.model_id.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Number of stored events (including any not passing validation)
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the journal holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Empty the log and persist the empty state
    pub fn clear_history(&mut self) {
        self.events.clear();
        self.persist();
        debug!("interaction history cleared");
    }

    /// Serialize the full log as a portable JSON document
    pub fn export_json(&self, now_ms: i64) -> serde_json::Result<String> {
        serde_json::to_string(&ExportDocument {
            version: EXPORT_VERSION,
            exported_at_ms: now_ms,
            events: self.events.clone(),
        })
    }

    /// Replace the whole log from an exported document
    ///
    /// The document must be a JSON object carrying an `events` array.
    /// Damaged array elements are dropped; a document that is not the
    /// expected shape leaves the log untouched and reports failure.
    pub fn import_json(&mut self, json: &str) -> ImportReport {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(err) => return ImportReport::failure(format!("invalid JSON: {err}")),
        };

        let Some(events) = value.get("events").and_then(|v| v.as_array()) else {
            return ImportReport::failure("expected an object with an `events` array");
        };

        let mut imported: Vec<InteractionEvent> = events
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .filter(InteractionEvent::is_valid)
            .collect();

        if imported.len() > self.capacity {
            let excess = imported.len() - self.capacity;
            imported.drain(..excess);
        }

        self.events = imported;
        self.persist();
        debug!(count = self.events.len(), "interaction history imported");
        ImportReport::imported(self.events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use lecatalogue::ANONYMOUS_USER;

    fn journal() -> InteractionJournal {
        InteractionJournal::new(Box::new(MemoryStore::new()))
    }

    fn view(model: &str, ts: i64) -> InteractionEvent {
        InteractionEvent::new(InteractionKind::View, model, ANONYMOUS_USER, ts)
    }

    fn purchase(model: &str, user: &str, ts: i64) -> InteractionEvent {
        InteractionEvent::new(InteractionKind::Purchase, model, user, ts)
    }

    #[test]
    fn test_record_trims_oldest_beyond_capacity() {
        let mut journal = journal();
        for i in 0..150 {
            journal.record(purchase("m1", "u1", 1_000 + i));
        }

        let events = journal.all();
        assert_eq!(events.len(), 100);
        // Oldest 50 dropped, most recent 100 kept in order
        assert_eq!(events.first().unwrap().timestamp_ms, 1_050);
        assert_eq!(events.last().unwrap().timestamp_ms, 1_149);
    }

    #[test]
    fn test_all_filters_malformed_records() {
        let mut journal = journal();
        journal.record(view("m1", 1_000));
        journal.record(view("", 2_000));
        journal.record(purchase("m2", "u1", 0));

        assert_eq!(journal.len(), 3);
        let events = journal.all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].model_id, "m1");
    }

    #[test]
    fn test_recent_by_window_and_kind_filter() {
        let mut journal = journal();
        journal.record(view("m1", 1_000));
        journal.record(view("m2", 8_000));
        journal.record(purchase("m2", "u1", 9_000));

        let now = 10_000;
        let recent = journal.recent_by_window(now, 3_000, None);
        assert_eq!(recent.len(), 2);

        let purchases = journal.recent_by_window(now, 3_000, Some(InteractionKind::Purchase));
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].model_id, "m2");

        // Boundary: timestamp exactly at now - window is included
        let edge = journal.recent_by_window(now, 9_000, None);
        assert_eq!(edge.len(), 3);
    }

    #[test]
    fn test_co_occurring_counts_both_directions() {
        let mut journal = journal();
        journal.record(view("target", 10_000));
        journal.record(view("before", 9_000));
        journal.record(view("after", 11_000));
        journal.record(view("far", 100_000));
        journal.record(purchase("near-purchase", "u1", 10_500));

        let counts = journal.co_occurring("target", 5_000);
        assert_eq!(counts.get("before"), Some(&1));
        assert_eq!(counts.get("after"), Some(&1));
        assert!(counts.get("far").is_none());
        // Only view events participate
        assert!(counts.get("near-purchase").is_none());
    }

    #[test]
    fn test_co_occurring_counts_per_target_view() {
        let mut journal = journal();
        journal.record(view("target", 10_000));
        journal.record(view("target", 12_000));
        journal.record(view("other", 11_000));

        // "other" is near both target views, so it counts twice
        let counts = journal.co_occurring("target", 5_000);
        assert_eq!(counts.get("other"), Some(&2));
    }

    #[test]
    fn test_storage_failure_is_silent() {
        let mut journal = InteractionJournal::new(Box::new(MemoryStore::failing()));
        journal.record(view("m1", 1_000));

        // The write failed, but the event is still served from memory
        assert_eq!(journal.all().len(), 1);
    }

    #[test]
    fn test_corrupt_log_starts_empty() {
        let mut store = MemoryStore::new();
        store.set(INTERACTIONS_KEY, b"{not json").unwrap();

        let journal = InteractionJournal::new(Box::new(store));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_load_drops_damaged_elements() {
        let mut store = MemoryStore::new();
        let log = format!(
            "[{},{}]",
            serde_json::to_string(&view("m1", 1_000)).unwrap(),
            "{\"bogus\":true}"
        );
        store.set(INTERACTIONS_KEY, log.as_bytes()).unwrap();

        let journal = InteractionJournal::new(Box::new(store));
        assert_eq!(journal.len(), 1);
    }

    #[rstest::rstest]
    #[case::bare_array("[1,2,3]")]
    #[case::not_json("not json at all")]
    #[case::wrong_field("{\"records\": []}")]
    #[case::events_not_array("{\"events\": 7}")]
    fn test_import_rejects_wrong_shape(#[case] document: &str) {
        let mut journal = journal();
        journal.record(view("m1", 1_000));

        let report = journal.import_json(document);
        assert!(!report.success);
        assert_eq!(report.imported, 0);
        assert!(report.error.is_some());
        // Log untouched on failure
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_export_clear_import_round_trip() {
        let mut journal = journal();
        journal.record(view("m1", 1_000));
        journal.record(purchase("m2", "u1", 2_000));
        journal.record(purchase("m3", "u2", 3_000));
        let before = journal.all();

        let exported = journal.export_json(5_000).unwrap();
        journal.clear_history();
        assert!(journal.is_empty());

        let report = journal.import_json(&exported);
        assert!(report.success);
        assert_eq!(report.imported, 3);

        let mut after = journal.all();
        let mut expected = before;
        let key = |e: &InteractionEvent| (e.timestamp_ms, e.model_id.clone());
        after.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(after, expected);
    }

    #[test]
    fn test_import_trims_to_capacity() {
        let mut journal = InteractionJournal::with_capacity(Box::new(MemoryStore::new()), 2);
        let events: Vec<InteractionEvent> =
            (0..5).map(|i| view("m", 1_000 + i)).collect();
        let doc = serde_json::json!({
            "version": 1,
            "exported_at_ms": 0,
            "events": events,
        });

        let report = journal.import_json(&doc.to_string());
        assert!(report.success);
        assert_eq!(report.imported, 2);
        assert_eq!(journal.all()[0].timestamp_ms, 1_003);
    }
}
