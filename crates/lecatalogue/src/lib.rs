//! lecatalogue - Catalog & Interaction Domain Types
//!
//! *Le Catalogue* (The Catalog) - Shared domain types for the LeConseil
//! recommendation workspace: catalog snapshots, interaction events, and
//! engine configuration.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Engine configuration and scoring weights.
pub mod config;
/// User interaction events and metadata.
pub mod event;
/// Catalog models and the immutable catalog snapshot.
pub mod model;

pub use config::{EngineConfig, SimilarityWeights};
pub use event::{EventMetadata, InteractionEvent, InteractionKind, ANONYMOUS_USER};
pub use model::{Catalog, CatalogModel, ModelCategory, SizeClass};

/// Catalog library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
