// Catalog models and snapshot

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Marketplace model category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelCategory {
    /// Text generation and completion models
    LanguageModel,
    /// Text-to-image and image synthesis models
    ImageGeneration,
    /// Image labeling and classification models
    ImageClassification,
    /// Audio analysis and enhancement models
    AudioProcessing,
    /// Video analysis and generation models
    VideoProcessing,
    /// Vector embedding models
    Embedding,
    /// Object detection models
    ObjectDetection,
    /// Text-to-speech models
    TextToSpeech,
    /// Speech-to-text models
    SpeechToText,
    /// Translation models
    Translation,
    /// Anything that does not fit the above
    Other,
}

impl ModelCategory {
    /// Stable display name for logs and reason strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCategory::LanguageModel => "language-model",
            ModelCategory::ImageGeneration => "image-generation",
            ModelCategory::ImageClassification => "image-classification",
            ModelCategory::AudioProcessing => "audio-processing",
            ModelCategory::VideoProcessing => "video-processing",
            ModelCategory::Embedding => "embedding",
            ModelCategory::ObjectDetection => "object-detection",
            ModelCategory::TextToSpeech => "text-to-speech",
            ModelCategory::SpeechToText => "speech-to-text",
            ModelCategory::Translation => "translation",
            ModelCategory::Other => "other",
        }
    }
}

/// Ordered model size class
///
/// Declaration order is the adjacency order used by similarity scoring:
/// `Tiny < Small < Medium < Large < XLarge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// Under ~100M parameters
    Tiny,
    /// ~100M-1B parameters
    Small,
    /// ~1B-10B parameters
    Medium,
    /// ~10B-70B parameters
    Large,
    /// Over ~70B parameters
    XLarge,
}

impl SizeClass {
    /// Position in the size ordering (0-based)
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A listed model in the marketplace catalog
///
/// Read-only to the recommendation core. Identifiers are stable and unique
/// across a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogModel {
    /// Unique listing identifier
    pub id: String,

    /// Human-readable model name
    pub name: String,

    /// Model category
    pub category: ModelCategory,

    /// Descriptive tags
    pub tags: BTreeSet<String>,

    /// Framework the model ships in (exact, case-sensitive)
    pub framework: String,

    /// Size class, if declared by the lister
    pub size_class: Option<SizeClass>,

    /// Base price per inference
    pub base_price: f64,

    /// Listing timestamp, wall-clock milliseconds
    pub listed_at_ms: i64,

    /// Whether the listing is currently active
    pub active: bool,

    /// Lifetime sales counter
    pub total_sales: u64,

    /// Lifetime inference counter
    pub total_inferences: u64,
}

/// Immutable catalog snapshot with deterministic iteration order
///
/// Iteration follows the order models were supplied in. Rankings break
/// score ties by this order via stable sorts, which keeps results
/// reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<CatalogModel>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a snapshot from a list of models
    ///
    /// If an identifier repeats, the later entry wins lookups; iteration
    /// still visits every stored entry in input order.
    pub fn new(models: Vec<CatalogModel>) -> Self {
        let by_id = models
            .iter()
            .enumerate()
            .map(|(idx, model)| (model.id.clone(), idx))
            .collect();
        Self { models, by_id }
    }

    /// Look up a model by identifier
    pub fn get(&self, id: &str) -> Option<&CatalogModel> {
        self.by_id.get(id).map(|idx| &self.models[*idx])
    }

    /// Whether the snapshot contains the identifier
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate models in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogModel> {
        self.models.iter()
    }

    /// Number of models in the snapshot
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of active models
    pub fn active_count(&self) -> usize {
        self.models.iter().filter(|m| m.active).count()
    }
}
