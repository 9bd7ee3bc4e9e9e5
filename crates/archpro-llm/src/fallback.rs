//! Fallback composition
//!
//! [`FallbackCapability`] wraps an optional live capability and the static
//! fallback store. Each operation first checks whether live generation is
//! possible (a live backend is configured and the credential source yields
//! a usable key). Text, diagram and cover calls never fail outwards except
//! for a live section failure with no store entry, which leaves the section
//! key absent so a later call can retry. Video failures always propagate.

use async_trait::async_trait;
use std::sync::Arc;

use archpro_config::CredentialSource;
use archpro_content::StaticFallbackStore;
use archpro_utils::error::GenerationError;
use archpro_utils::logging::{log_generation_error, log_generation_fallback};
use archpro_utils::types::Phase;

use crate::types::{GenerationCapability, ImageRef, VideoRef};

/// Diagram served in demo mode when the store has none for the topic.
pub const DEMO_DIAGRAM: &str =
    "graph TD\n  A[App] --> B[API Gateway]\n  B --> C[Microservice]\n  C --> D[(Database)]";

/// Diagram used when a live call answered with nothing usable.
pub const EMPTY_DIAGRAM: &str = "graph TD\n  Error --> Diagram";

/// Diagram used when a live call failed.
pub const FAILED_DIAGRAM: &str = "graph TD\n  Fallback --> Diagram";

/// Demo-mode placeholder section.
#[must_use]
pub fn demo_section(topic_name: &str, phase: Phase) -> String {
    format!(
        "### {label}\n\n\
         Detailed {label} for **{topic_name}** is coming soon.\n\n\
         This workspace is running in demo mode. Configure an API key to generate \
         live content for every phase.",
        label = phase.label()
    )
}

/// Deterministic placeholder cover seeded by topic id.
#[must_use]
pub fn placeholder_cover(topic_id: &str) -> ImageRef {
    ImageRef::Url(format!(
        "https://picsum.photos/seed/{topic_id}/1200/600?grayscale"
    ))
}

pub struct FallbackCapability {
    live: Option<Arc<dyn GenerationCapability>>,
    credentials: Arc<dyn CredentialSource>,
    store: Arc<StaticFallbackStore>,
}

impl FallbackCapability {
    /// `live` is `None` for the static provider.
    #[must_use]
    pub fn new(
        live: Option<Arc<dyn GenerationCapability>>,
        credentials: Arc<dyn CredentialSource>,
        store: Arc<StaticFallbackStore>,
    ) -> Self {
        Self {
            live,
            credentials,
            store,
        }
    }

    /// Static content only, never live.
    #[must_use]
    pub fn offline(store: Arc<StaticFallbackStore>) -> Self {
        Self::new(
            None,
            Arc::new(archpro_config::StaticCredential::none()),
            store,
        )
    }

    /// The live backend, if one is configured and a usable key is present.
    fn live(&self) -> Option<&Arc<dyn GenerationCapability>> {
        self.live
            .as_ref()
            .filter(|_| self.credentials.current().is_some())
    }
}

#[async_trait]
impl GenerationCapability for FallbackCapability {
    fn name(&self) -> &'static str {
        match &self.live {
            Some(live) => live.name(),
            None => "static",
        }
    }

    fn is_live(&self) -> bool {
        self.live().is_some()
    }

    async fn produce_section(
        &self,
        topic_id: &str,
        topic_name: &str,
        phase: Phase,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let stored = self.store.section(topic_id, phase);

        let Some(live) = self.live() else {
            return Ok(match stored {
                Some(text) => text.to_string(),
                None => demo_section(topic_name, phase),
            });
        };

        match live
            .produce_section(topic_id, topic_name, phase, prompt)
            .await
        {
            Ok(text) => Ok(text),
            Err(err) => match stored {
                Some(text) => {
                    log_generation_fallback(topic_id, "section", "static", &err.to_string());
                    Ok(text.to_string())
                }
                None => {
                    log_generation_error(topic_id, "section", &err.to_string());
                    Err(err)
                }
            },
        }
    }

    async fn produce_diagram(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<String, GenerationError> {
        let stored = self.store.diagram(topic_id);

        let Some(live) = self.live() else {
            return Ok(stored.unwrap_or(DEMO_DIAGRAM).to_string());
        };

        match live.produce_diagram(topic_id, topic_name).await {
            Ok(diagram) => Ok(diagram),
            Err(err) => {
                let placeholder = match err {
                    GenerationError::EmptyResponse(_) => EMPTY_DIAGRAM,
                    _ => FAILED_DIAGRAM,
                };
                let source = if stored.is_some() { "static" } else { "placeholder" };
                log_generation_fallback(topic_id, "diagram", source, &err.to_string());
                Ok(stored.unwrap_or(placeholder).to_string())
            }
        }
    }

    async fn produce_cover(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<Option<ImageRef>, GenerationError> {
        let Some(live) = self.live() else {
            return Ok(Some(placeholder_cover(topic_id)));
        };

        match live.produce_cover(topic_id, topic_name).await {
            Ok(cover) => Ok(cover),
            Err(err) => {
                log_generation_fallback(topic_id, "cover", "placeholder", &err.to_string());
                Ok(Some(placeholder_cover(topic_id)))
            }
        }
    }

    async fn produce_video(&self, topic_name: &str) -> Result<VideoRef, GenerationError> {
        let Some(backend) = &self.live else {
            return Err(GenerationError::Unsupported(
                "video generation needs a live provider".to_string(),
            ));
        };
        if self.credentials.current().is_none() {
            return Err(GenerationError::Unavailable(format!(
                "no usable API key ({})",
                self.credentials.describe()
            )));
        }

        backend.produce_video(topic_name).await.inspect_err(|err| {
            log_generation_error(topic_name, "video", &err.to_string());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedCapability;
    use archpro_config::StaticCredential;

    fn key() -> Arc<dyn CredentialSource> {
        Arc::new(StaticCredential::new("AIza-test-key"))
    }

    fn no_key() -> Arc<dyn CredentialSource> {
        Arc::new(StaticCredential::none())
    }

    fn builtin() -> Arc<StaticFallbackStore> {
        Arc::new(StaticFallbackStore::builtin())
    }

    #[tokio::test]
    async fn test_demo_mode_serves_exact_store_entry() {
        let scripted = Arc::new(ScriptedCapability::new());
        let capability = FallbackCapability::new(Some(scripted.clone()), no_key(), builtin());

        let text = capability
            .produce_section("uber", "Uber / Ride Sharing", Phase::Requirements, "ctx")
            .await
            .unwrap();
        assert_eq!(
            text,
            StaticFallbackStore::builtin()
                .section("uber", Phase::Requirements)
                .unwrap()
        );
        assert_eq!(scripted.section_calls(), 0);
        assert!(!capability.is_live());
    }

    #[tokio::test]
    async fn test_demo_mode_placeholder_has_no_cross_phase_leakage() {
        let capability = FallbackCapability::offline(builtin());
        let text = capability
            .produce_section("parking-lot", "Parking Lot", Phase::HighLevelDesign, "ctx")
            .await
            .unwrap();
        assert_eq!(text, demo_section("Parking Lot", Phase::HighLevelDesign));
        assert!(text.contains("coming soon"));
    }

    #[tokio::test]
    async fn test_live_section_failure_uses_store_or_fails() {
        let scripted = Arc::new(ScriptedCapability::new().fail_sections());
        let capability = FallbackCapability::new(Some(scripted.clone()), key(), builtin());

        let text = capability
            .produce_section("uber", "Uber", Phase::MachineCoding, "ctx")
            .await
            .unwrap();
        assert!(text.contains("Driver Matching Engine"));

        let err = capability
            .produce_section("spotify", "Spotify", Phase::Requirements, "ctx")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert_eq!(scripted.section_calls(), 2);
    }

    #[tokio::test]
    async fn test_live_section_success_passes_through() {
        let scripted = Arc::new(ScriptedCapability::new());
        let capability = FallbackCapability::new(Some(scripted.clone()), key(), builtin());
        let text = capability
            .produce_section("uber", "Uber", Phase::Requirements, "ctx")
            .await
            .unwrap();
        assert_eq!(text, "uber/requirements section");
        assert!(capability.is_live());
    }

    #[tokio::test]
    async fn test_diagram_fallback_chain() {
        let offline = FallbackCapability::offline(builtin());
        assert!(
            offline
                .produce_diagram("uber", "Uber")
                .await
                .unwrap()
                .contains("Trip Service")
        );
        assert_eq!(
            offline.produce_diagram("spotify", "Spotify").await.unwrap(),
            DEMO_DIAGRAM
        );

        let failing = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new().fail_diagrams())),
            key(),
            builtin(),
        );
        assert_eq!(
            failing.produce_diagram("spotify", "Spotify").await.unwrap(),
            FAILED_DIAGRAM
        );
        assert!(
            failing
                .produce_diagram("splitwise", "Splitwise")
                .await
                .unwrap()
                .contains("Async Balance Settler")
        );

        let empty = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new().empty_diagrams())),
            key(),
            builtin(),
        );
        assert_eq!(
            empty.produce_diagram("spotify", "Spotify").await.unwrap(),
            EMPTY_DIAGRAM
        );
    }

    #[tokio::test]
    async fn test_cover_placeholder_is_seeded() {
        let offline = FallbackCapability::offline(builtin());
        assert_eq!(
            offline.produce_cover("zomato", "Zomato").await.unwrap(),
            Some(ImageRef::Url(
                "https://picsum.photos/seed/zomato/1200/600?grayscale".into()
            ))
        );

        let failing = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new().fail_covers())),
            key(),
            builtin(),
        );
        assert_eq!(
            failing.produce_cover("zomato", "Zomato").await.unwrap(),
            Some(placeholder_cover("zomato"))
        );

        let absent = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new().cover_absent())),
            key(),
            builtin(),
        );
        assert_eq!(absent.produce_cover("zomato", "Zomato").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_video_errors_propagate() {
        let offline = FallbackCapability::offline(builtin());
        assert!(matches!(
            offline.produce_video("Uber").await,
            Err(GenerationError::Unsupported(_))
        ));

        let keyless = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new())),
            no_key(),
            builtin(),
        );
        assert!(matches!(
            keyless.produce_video("Uber").await,
            Err(GenerationError::Unavailable(_))
        ));

        let failing = FallbackCapability::new(
            Some(Arc::new(ScriptedCapability::new().fail_video_with(
                GenerationError::NotFound("Requested entity was not found.".into()),
            ))),
            key(),
            builtin(),
        );
        let err = failing.produce_video("Uber").await.unwrap_err();
        assert!(err.is_entity_not_found());
    }
}
