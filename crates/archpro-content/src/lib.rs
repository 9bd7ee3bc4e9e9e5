//! Read-only content inputs: the topic catalog and the static fallback store

pub mod catalog;
pub mod fallback;

pub use catalog::{CatalogError, Topic, TopicCatalog};
pub use fallback::{StaticFallbackStore, StaticFallbackStoreBuilder};
