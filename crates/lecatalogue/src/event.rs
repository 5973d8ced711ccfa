// Interaction events

use serde::{Deserialize, Serialize};

/// Sentinel user identifier for untracked sessions
pub const ANONYMOUS_USER: &str = "anonymous";

/// Kind of user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Listing page view
    View,
    /// Completed purchase
    Purchase,
    /// Inference call against the model
    Inference,
}

/// Optional context attached to an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// How long the listing was viewed, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_duration_ms: Option<u64>,

    /// Whether the interaction originated from a search result
    #[serde(default)]
    pub from_search: bool,

    /// The originating search query, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// A single recorded user interaction
///
/// Immutable once recorded. Timestamps are wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Acting user, or [`ANONYMOUS_USER`]
    pub user_id: String,

    /// Model the interaction targets
    pub model_id: String,

    /// Interaction kind
    pub kind: InteractionKind,

    /// When the interaction happened, wall-clock milliseconds
    pub timestamp_ms: i64,

    /// Optional interaction context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

impl InteractionEvent {
    /// Create an event of the given kind
    pub fn new(
        kind: InteractionKind,
        model_id: impl Into<String>,
        user_id: impl Into<String>,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            model_id: model_id.into(),
            kind,
            timestamp_ms,
            metadata: None,
        }
    }

    /// Attach metadata to the event
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Minimal shape validation for records read back from storage
    ///
    /// A record must name a model and carry a positive timestamp to be
    /// usable; anything else is dropped on read instead of failing the
    /// whole log.
    pub fn is_valid(&self) -> bool {
        !self.model_id.is_empty() && self.timestamp_ms > 0
    }
}
