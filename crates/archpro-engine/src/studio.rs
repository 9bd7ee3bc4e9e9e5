//! Cache and orchestration layer
//!
//! [`Studio`] owns the content caches and the in-flight markers. Its one
//! primary operation, [`Studio::ensure_content`], makes the section for a
//! (topic, phase) available with the fewest generation calls, then
//! best-effort fills the topic's diagram (High Level Design only) and cover.
//! Each of the three steps has its own failure domain and retry
//! eligibility; none of them raises to the caller.

use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, debug};

use archpro_content::Topic;
use archpro_llm::{GenerationCapability, GenerationError, ImageRef, VideoRef};
use archpro_utils::logging::generation_span;
use archpro_utils::redaction::redact_error_message;
use archpro_utils::types::Phase;

use crate::cache::{CacheKey, CacheStats, ContentCache, StatsRecorder};
use crate::inflight::InFlight;
use crate::presentation::ContentReader;

/// Outcome of one step of [`Studio::ensure_content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Already cached; nothing was generated
    CacheHit,
    /// Generated and written by this call
    Populated,
    /// Written by a concurrent call that this call awaited
    Joined,
    /// Step does not apply to this call
    NotRequested,
    /// Generation succeeded but produced nothing to cache
    Absent,
    /// Generation failed; the key stays absent and a later call retries
    Failed { reason: String },
}

impl StepOutcome {
    fn failed(err: &GenerationError) -> Self {
        Self::Failed {
            reason: redact_error_message(&err.to_string()),
        }
    }

    /// How a caller that awaited another caller's generation sees it.
    fn seen_by_joiner(self) -> Self {
        match self {
            Self::Populated | Self::CacheHit => Self::Joined,
            other => other,
        }
    }

    /// Whether the artifact is cached after this step.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::CacheHit | Self::Populated | Self::Joined)
    }
}

/// Per-step report of one `ensure_content` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsureReport {
    pub section: StepOutcome,
    pub diagram: StepOutcome,
    pub cover: StepOutcome,
}

impl EnsureReport {
    fn section_only(section: StepOutcome) -> Self {
        Self {
            section,
            diagram: StepOutcome::NotRequested,
            cover: StepOutcome::NotRequested,
        }
    }
}

pub struct Studio {
    capability: Arc<dyn GenerationCapability>,
    cache: ContentCache,
    sections: InFlight<StepOutcome>,
    diagrams: InFlight<StepOutcome>,
    covers: InFlight<StepOutcome>,
    stats: StatsRecorder,
}

impl Studio {
    #[must_use]
    pub fn new(capability: Arc<dyn GenerationCapability>) -> Self {
        Self {
            capability,
            cache: ContentCache::new(),
            sections: InFlight::new(),
            diagrams: InFlight::new(),
            covers: InFlight::new(),
            stats: StatsRecorder::default(),
        }
    }

    /// Whether generation currently reaches a live service.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.capability.is_live()
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.capability.name()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Ensure content for `topic` at `phase` is cached.
    ///
    /// A cached section returns immediately. Otherwise the section is
    /// generated (or awaited, if another call is already generating it) and
    /// written before the diagram and cover steps start; those two run
    /// concurrently and independently of the section's outcome.
    pub async fn ensure_content(&self, topic: &Topic, phase: Phase) -> EnsureReport {
        let key = CacheKey::section(&topic.id, phase);

        if self.cache.has_section(&key) {
            self.stats.hit();
            debug!(key = %key, "Section cache hit");
            return EnsureReport::section_only(StepOutcome::CacheHit);
        }

        let flight = self
            .sections
            .run(&key, || self.generate_section(topic, phase, &key))
            .await;

        if flight.joined {
            self.stats.join();
            return EnsureReport::section_only(flight.value.seen_by_joiner());
        }
        let section = flight.value;
        if section == StepOutcome::CacheHit {
            return EnsureReport::section_only(section);
        }

        let diagram = async {
            if phase == Phase::HighLevelDesign {
                self.ensure_diagram(topic).await
            } else {
                StepOutcome::NotRequested
            }
        };
        let (diagram, cover) = tokio::join!(diagram, self.ensure_cover(topic));

        let report = EnsureReport {
            section,
            diagram,
            cover,
        };
        debug!(
            key = %key,
            section = ?report.section,
            diagram = ?report.diagram,
            cover = ?report.cover,
            stats = ?self.stats.snapshot(),
            "Content ensured"
        );
        report
    }

    async fn generate_section(&self, topic: &Topic, phase: Phase, key: &CacheKey) -> StepOutcome {
        // A previous leader may have finished between the entry check and
        // registration.
        if self.cache.has_section(key) {
            self.stats.hit();
            return StepOutcome::CacheHit;
        }
        self.stats.miss();

        let result = self
            .capability
            .produce_section(&topic.id, &topic.name, phase, &topic.prompt)
            .instrument(generation_span(&topic.id, "section"))
            .await;

        match result {
            Ok(text) => {
                if self.cache.insert_section(key.clone(), text) {
                    self.stats.write();
                }
                StepOutcome::Populated
            }
            Err(err) => {
                self.stats.failure();
                StepOutcome::failed(&err)
            }
        }
    }

    async fn ensure_diagram(&self, topic: &Topic) -> StepOutcome {
        let key = CacheKey::topic(&topic.id);
        if self.cache.has_diagram(&key) {
            self.stats.hit();
            return StepOutcome::CacheHit;
        }

        let flight = self
            .diagrams
            .run(&key, || async {
                if self.cache.has_diagram(&key) {
                    return StepOutcome::CacheHit;
                }
                self.stats.miss();
                let result = self
                    .capability
                    .produce_diagram(&topic.id, &topic.name)
                    .instrument(generation_span(&topic.id, "diagram"))
                    .await;
                match result {
                    Ok(diagram) if !diagram.trim().is_empty() => {
                        if self.cache.insert_diagram(key.clone(), diagram) {
                            self.stats.write();
                        }
                        StepOutcome::Populated
                    }
                    Ok(_) => StepOutcome::Absent,
                    Err(err) => {
                        self.stats.failure();
                        StepOutcome::failed(&err)
                    }
                }
            })
            .await;

        if flight.joined {
            self.stats.join();
            return flight.value.seen_by_joiner();
        }
        flight.value
    }

    async fn ensure_cover(&self, topic: &Topic) -> StepOutcome {
        let key = CacheKey::topic(&topic.id);
        if self.cache.has_cover(&key) {
            self.stats.hit();
            return StepOutcome::CacheHit;
        }

        let flight = self
            .covers
            .run(&key, || async {
                if self.cache.has_cover(&key) {
                    return StepOutcome::CacheHit;
                }
                self.stats.miss();
                let result = self
                    .capability
                    .produce_cover(&topic.id, &topic.name)
                    .instrument(generation_span(&topic.id, "cover"))
                    .await;
                match result {
                    Ok(Some(cover)) => {
                        if self.cache.insert_cover(key.clone(), cover) {
                            self.stats.write();
                        }
                        StepOutcome::Populated
                    }
                    Ok(None) => StepOutcome::Absent,
                    Err(err) => {
                        self.stats.failure();
                        StepOutcome::failed(&err)
                    }
                }
            })
            .await;

        if flight.joined {
            self.stats.join();
            return flight.value.seen_by_joiner();
        }
        flight.value
    }

    /// Generate the explainer video and store it in the video slot.
    ///
    /// There is no in-flight guard: concurrent calls each reach the
    /// capability. Failures propagate and leave the slot untouched.
    ///
    /// # Errors
    ///
    /// Returns the capability's `GenerationError` unchanged.
    pub async fn generate_explainer_video(
        &self,
        topic_name: &str,
    ) -> Result<VideoRef, GenerationError> {
        let video = self
            .capability
            .produce_video(topic_name)
            .instrument(generation_span(topic_name, "video"))
            .await?;
        self.cache.set_video(video.clone());
        Ok(video)
    }

    pub fn clear_video(&self) {
        self.cache.clear_video();
    }
}

impl ContentReader for Studio {
    fn section(&self, topic_id: &str, phase: Phase) -> Option<String> {
        self.cache.section(&CacheKey::section(topic_id, phase))
    }

    fn diagram(&self, topic_id: &str) -> Option<String> {
        self.cache.diagram(&CacheKey::topic(topic_id))
    }

    fn cover(&self, topic_id: &str) -> Option<ImageRef> {
        self.cache.cover(&CacheKey::topic(topic_id))
    }

    fn video(&self) -> Option<VideoRef> {
        self.cache.video()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archpro_content::TopicCatalog;
    use archpro_llm::test_support::ScriptedCapability;

    fn topic(id: &str) -> Topic {
        TopicCatalog::builtin().get(id).cloned().unwrap()
    }

    fn studio(scripted: &Arc<ScriptedCapability>) -> Studio {
        Studio::new(scripted.clone())
    }

    #[tokio::test]
    async fn test_second_call_is_a_pure_cache_hit() {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = studio(&scripted);
        let uber = topic("uber");

        let first = studio.ensure_content(&uber, Phase::Requirements).await;
        assert_eq!(first.section, StepOutcome::Populated);
        assert_eq!(first.diagram, StepOutcome::NotRequested);
        assert_eq!(first.cover, StepOutcome::Populated);

        let second = studio.ensure_content(&uber, Phase::Requirements).await;
        assert_eq!(second, EnsureReport::section_only(StepOutcome::CacheHit));
        assert_eq!(scripted.section_calls(), 1);
        assert_eq!(scripted.cover_calls(), 1);
        assert_eq!(studio.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_diagram_only_for_high_level_design() {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = studio(&scripted);
        let uber = topic("uber");

        studio.ensure_content(&uber, Phase::Requirements).await;
        assert!(studio.diagram("uber").is_none());
        assert_eq!(scripted.diagram_calls(), 0);

        let report = studio.ensure_content(&uber, Phase::HighLevelDesign).await;
        assert_eq!(report.diagram, StepOutcome::Populated);
        assert_eq!(report.cover, StepOutcome::CacheHit);
        assert_eq!(studio.diagram("uber").as_deref(), Some("graph TD\n  uber"));
        assert!(studio.section("uber", Phase::HighLevelDesign).is_some());
    }

    #[tokio::test]
    async fn test_section_failure_leaves_key_absent_and_retryable() {
        let scripted =
            Arc::new(ScriptedCapability::new().fail_section("spotify", Phase::DataModelApis));
        let studio = studio(&scripted);
        let spotify = topic("spotify");

        let report = studio.ensure_content(&spotify, Phase::DataModelApis).await;
        assert!(matches!(report.section, StepOutcome::Failed { .. }));
        // Cover is independent of the section outcome.
        assert_eq!(report.cover, StepOutcome::Populated);
        assert!(studio.section("spotify", Phase::DataModelApis).is_none());

        scripted.heal_section("spotify", Phase::DataModelApis);
        let retry = studio.ensure_content(&spotify, Phase::DataModelApis).await;
        assert_eq!(retry.section, StepOutcome::Populated);
        assert_eq!(scripted.section_calls(), 2);
        assert_eq!(studio.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_secondary_failures_do_not_roll_back_section() {
        let scripted = Arc::new(ScriptedCapability::new().fail_diagrams().fail_covers());
        let studio = studio(&scripted);
        let paytm = topic("paytm");

        let report = studio.ensure_content(&paytm, Phase::HighLevelDesign).await;
        assert_eq!(report.section, StepOutcome::Populated);
        assert!(matches!(report.diagram, StepOutcome::Failed { .. }));
        assert!(matches!(report.cover, StepOutcome::Failed { .. }));
        assert!(studio.section("paytm", Phase::HighLevelDesign).is_some());
        assert!(studio.cover("paytm").is_none());

        // Both secondary keys are retried by the next miss.
        studio.ensure_content(&paytm, Phase::LowLevelDesign).await;
        assert_eq!(scripted.cover_calls(), 2);
    }

    #[tokio::test]
    async fn test_absent_cover_is_not_cached() {
        let scripted = Arc::new(ScriptedCapability::new().cover_absent());
        let studio = studio(&scripted);
        let report = studio
            .ensure_content(&topic("zomato"), Phase::Requirements)
            .await;
        assert_eq!(report.cover, StepOutcome::Absent);
        assert!(studio.cover("zomato").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_same_key_joins_leader() {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = studio(&scripted);
        let uber = topic("uber");

        let (a, b) = tokio::join!(
            studio.ensure_content(&uber, Phase::DeepDivesScaling),
            studio.ensure_content(&uber, Phase::DeepDivesScaling)
        );

        assert_eq!(a.section, StepOutcome::Populated);
        assert_eq!(b, EnsureReport::section_only(StepOutcome::Joined));
        assert_eq!(scripted.section_calls(), 1);
        assert_eq!(scripted.cover_calls(), 1);
        assert_eq!(studio.stats().joins, 1);
    }

    #[tokio::test]
    async fn test_concurrent_phases_share_cover_generation() {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = studio(&scripted);
        let uber = topic("uber");

        let (a, b) = tokio::join!(
            studio.ensure_content(&uber, Phase::Requirements),
            studio.ensure_content(&uber, Phase::MachineCoding)
        );

        assert_eq!(scripted.section_calls(), 2);
        assert_eq!(scripted.cover_calls(), 1);
        let covers = [a.cover, b.cover];
        assert!(covers.contains(&StepOutcome::Populated));
        assert!(covers.iter().all(StepOutcome::is_available));
    }

    #[tokio::test]
    async fn test_video_is_not_deduplicated() {
        let scripted = Arc::new(ScriptedCapability::new());
        let studio = studio(&scripted);

        let (a, b) = tokio::join!(
            studio.generate_explainer_video("Uber / Ride Sharing"),
            studio.generate_explainer_video("Uber / Ride Sharing")
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(scripted.video_calls(), 2);
        assert!(studio.video().is_some());

        studio.clear_video();
        assert!(studio.video().is_none());
    }

    #[tokio::test]
    async fn test_video_failure_propagates_and_keeps_slot() {
        let scripted = Arc::new(
            ScriptedCapability::new().fail_video_with(GenerationError::JobFailed("boom".into())),
        );
        let studio = studio(&scripted);
        let err = studio.generate_explainer_video("Uber").await.unwrap_err();
        assert_eq!(err, GenerationError::JobFailed("boom".into()));
        assert!(studio.video().is_none());
    }
}
