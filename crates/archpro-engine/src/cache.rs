//! In-memory content caches
//!
//! Sections are keyed by (topic, phase); diagrams and covers by topic; the
//! video is a single process-wide slot. Entries are write-once: an insert
//! for a key that is already present is ignored, so a late or failed
//! generation can never replace an earlier success. Nothing expires.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use archpro_llm::{ImageRef, VideoRef};
use archpro_utils::types::Phase;

/// Opaque cache key.
///
/// Topic ids are slugs and never contain `::`, so section keys cannot
/// collide with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// ```rust
    /// use archpro_engine::CacheKey;
    /// use archpro_utils::types::Phase;
    ///
    /// assert_eq!(CacheKey::section("uber", Phase::HighLevelDesign).as_str(), "uber::hld");
    /// assert_eq!(CacheKey::topic("uber").as_str(), "uber");
    /// ```
    #[must_use]
    pub fn section(topic_id: &str, phase: Phase) -> Self {
        Self(format!("{topic_id}::{}", phase.slug()))
    }

    /// Key for topic-scoped artifacts (diagram, cover).
    #[must_use]
    pub fn topic(topic_id: &str) -> Self {
        Self(topic_id.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Table<V> = RwLock<HashMap<CacheKey, V>>;

fn read<V: Clone>(table: &Table<V>, key: &CacheKey) -> Option<V> {
    table
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

fn contains<V>(table: &Table<V>, key: &CacheKey) -> bool {
    table
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(key)
}

fn insert_if_absent<V>(table: &Table<V>, key: CacheKey, value: V) -> bool {
    let mut guard = table.write().unwrap_or_else(PoisonError::into_inner);
    if guard.contains_key(&key) {
        return false;
    }
    guard.insert(key, value);
    true
}

#[derive(Default)]
pub struct ContentCache {
    sections: Table<String>,
    diagrams: Table<String>,
    covers: Table<ImageRef>,
    video: RwLock<Option<VideoRef>>,
}

impl ContentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn section(&self, key: &CacheKey) -> Option<String> {
        read(&self.sections, key)
    }

    #[must_use]
    pub fn has_section(&self, key: &CacheKey) -> bool {
        contains(&self.sections, key)
    }

    /// Returns `false` (and keeps the existing entry) if `key` is present.
    pub fn insert_section(&self, key: CacheKey, text: String) -> bool {
        insert_if_absent(&self.sections, key, text)
    }

    #[must_use]
    pub fn diagram(&self, key: &CacheKey) -> Option<String> {
        read(&self.diagrams, key)
    }

    #[must_use]
    pub fn has_diagram(&self, key: &CacheKey) -> bool {
        contains(&self.diagrams, key)
    }

    pub fn insert_diagram(&self, key: CacheKey, diagram: String) -> bool {
        insert_if_absent(&self.diagrams, key, diagram)
    }

    #[must_use]
    pub fn cover(&self, key: &CacheKey) -> Option<ImageRef> {
        read(&self.covers, key)
    }

    #[must_use]
    pub fn has_cover(&self, key: &CacheKey) -> bool {
        contains(&self.covers, key)
    }

    pub fn insert_cover(&self, key: CacheKey, cover: ImageRef) -> bool {
        insert_if_absent(&self.covers, key, cover)
    }

    #[must_use]
    pub fn video(&self) -> Option<VideoRef> {
        self.video
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The video slot is the one entry that is replaced rather than kept.
    pub fn set_video(&self, video: VideoRef) {
        *self.video.write().unwrap_or_else(PoisonError::into_inner) = Some(video);
    }

    pub fn clear_video(&self) {
        *self.video.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required generation
    pub misses: u64,
    /// Entries written
    pub writes: u64,
    /// Generation calls that produced nothing cacheable
    pub failures: u64,
    /// Callers that awaited another caller's in-flight generation
    pub joins: u64,
}

impl CacheStats {
    /// Hits over all lookups; 0.0 before any lookup.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    failures: AtomicU64,
    joins: AtomicU64,
}

impl StatsRecorder {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_keys_are_distinct_per_phase() {
        let keys: std::collections::HashSet<CacheKey> = Phase::ALL
            .iter()
            .map(|phase| CacheKey::section("parking-lot", *phase))
            .collect();
        assert_eq!(keys.len(), Phase::ALL.len());
        assert_ne!(
            CacheKey::section("uber", Phase::Requirements),
            CacheKey::topic("uber")
        );
    }

    #[test]
    fn test_entries_are_write_once() {
        let cache = ContentCache::new();
        let key = CacheKey::section("uber", Phase::Requirements);

        assert!(cache.insert_section(key.clone(), "first".into()));
        assert!(!cache.insert_section(key.clone(), "second".into()));
        assert_eq!(cache.section(&key).as_deref(), Some("first"));

        let topic = CacheKey::topic("uber");
        assert!(cache.insert_cover(topic.clone(), ImageRef::Url("a".into())));
        assert!(!cache.insert_cover(topic.clone(), ImageRef::Url("b".into())));
        assert_eq!(cache.cover(&topic), Some(ImageRef::Url("a".into())));
        assert!(!cache.has_diagram(&topic));
    }

    #[test]
    fn test_video_slot_replace_and_clear() {
        let cache = ContentCache::new();
        assert!(cache.video().is_none());
        cache.set_video(VideoRef::new("one"));
        cache.set_video(VideoRef::new("two"));
        assert_eq!(cache.video(), Some(VideoRef::new("two")));
        cache.clear_video();
        assert!(cache.video().is_none());
    }

    #[test]
    fn test_hit_ratio() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }
}
