//! Interactive session state
//!
//! A [`Session`] tracks what the user is looking at (topic, phase, view
//! mode) and drives the [`Studio`] in response to user actions. Changing
//! the view never generates anything.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use archpro_content::{Topic, TopicCatalog};
use archpro_llm::VideoRef;
use archpro_utils::error::ArchProError;
use archpro_utils::redaction::redact_error_message;
use archpro_utils::types::{Phase, ViewMode};

use crate::hook::CredentialHook;
use crate::presentation::{BlogView, WelcomeView, WorkspaceView};
use crate::studio::{EnsureReport, Studio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoOutcome {
    /// No topic is selected
    NoTopic,
    Ready { video: VideoRef },
    Failed {
        reason: String,
        /// Credential selection was re-opened after an entity-not-found failure
        reselect_requested: bool,
    },
}

/// What the session currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Welcome(WelcomeView),
    Workspace(WorkspaceView),
    Blog(BlogView),
}

impl View {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Welcome(view) => view.to_markdown(),
            Self::Workspace(view) => view.to_markdown(),
            Self::Blog(view) => view.to_markdown(),
        }
    }
}

pub struct Session {
    studio: Arc<Studio>,
    catalog: Arc<TopicCatalog>,
    selected: Option<Topic>,
    active_phase: Phase,
    view_mode: ViewMode,
    generating_video: bool,
    hook: Option<Arc<dyn CredentialHook>>,
}

impl Session {
    #[must_use]
    pub fn new(studio: Arc<Studio>, catalog: Arc<TopicCatalog>, view_mode: ViewMode) -> Self {
        Self {
            studio,
            catalog,
            selected: None,
            active_phase: Phase::Requirements,
            view_mode,
            generating_video: false,
            hook: None,
        }
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn CredentialHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    #[must_use]
    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    #[must_use]
    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn selected_topic(&self) -> Option<&Topic> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn active_phase(&self) -> Phase {
        self.active_phase
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn is_generating_video(&self) -> bool {
        self.generating_video
    }

    /// Select a topic: reset to Requirements, clear the video slot and
    /// ensure Requirements content.
    ///
    /// # Errors
    ///
    /// Returns `ArchProError::UnknownTopic` if `id` is not in the catalog;
    /// the session is left unchanged.
    pub async fn select_topic(&mut self, id: &str) -> Result<EnsureReport, ArchProError> {
        let topic = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ArchProError::UnknownTopic { id: id.to_string() })?;

        info!(topic_id = %topic.id, "Topic selected");
        self.active_phase = Phase::Requirements;
        self.studio.clear_video();
        let report = self
            .studio
            .ensure_content(&topic, Phase::Requirements)
            .await;
        self.selected = Some(topic);
        Ok(report)
    }

    /// Switch phase; ensures content when a topic is selected.
    pub async fn change_phase(&mut self, phase: Phase) -> Option<EnsureReport> {
        self.active_phase = phase;
        let topic = self.selected.as_ref()?;
        Some(self.studio.ensure_content(topic, phase).await)
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Generate the explainer video for the selected topic.
    pub async fn request_video(&mut self) -> VideoOutcome {
        let Some(topic) = self.selected.clone() else {
            return VideoOutcome::NoTopic;
        };

        if let Some(hook) = &self.hook
            && !hook.has_selected_credential().await
        {
            hook.open_selection().await;
        }

        self.generating_video = true;
        let result = self.studio.generate_explainer_video(&topic.name).await;
        self.generating_video = false;

        match result {
            Ok(video) => VideoOutcome::Ready { video },
            Err(err) => {
                let reason = redact_error_message(&err.to_string());
                warn!(topic_id = %topic.id, error = %reason, "Video generation failed");

                let mut reselect_requested = false;
                if err.is_entity_not_found()
                    && let Some(hook) = &self.hook
                {
                    hook.open_selection().await;
                    reselect_requested = true;
                }
                VideoOutcome::Failed {
                    reason,
                    reselect_requested,
                }
            }
        }
    }

    #[must_use]
    pub fn render(&self) -> View {
        let Some(topic) = &self.selected else {
            return View::Welcome(WelcomeView {
                demo_mode: !self.studio.is_live(),
            });
        };
        match self.view_mode {
            ViewMode::Workspace => View::Workspace(WorkspaceView::build(
                self.studio.as_ref(),
                topic,
                self.active_phase,
            )),
            ViewMode::Blog => View::Blog(BlogView::build(self.studio.as_ref(), topic)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::ContentReader;
    use crate::studio::StepOutcome;
    use archpro_llm::GenerationError;
    use archpro_llm::test_support::ScriptedCapability;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingHook {
        selected: AtomicBool,
        prompts: AtomicUsize,
    }

    #[async_trait]
    impl CredentialHook for RecordingHook {
        async fn has_selected_credential(&self) -> bool {
            self.selected.load(Ordering::SeqCst)
        }

        async fn open_selection(&self) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(scripted: ScriptedCapability) -> (Session, Arc<ScriptedCapability>) {
        let scripted = Arc::new(scripted);
        let studio = Arc::new(Studio::new(scripted.clone()));
        let session = Session::new(
            studio,
            Arc::new(TopicCatalog::builtin()),
            ViewMode::Workspace,
        );
        (session, scripted)
    }

    #[tokio::test]
    async fn test_select_topic_resets_phase_and_video() {
        let (mut session, scripted) = session(ScriptedCapability::new());

        session.select_topic("uber").await.unwrap();
        session.change_phase(Phase::DeepDivesScaling).await;
        assert!(matches!(
            session.request_video().await,
            VideoOutcome::Ready { .. }
        ));
        assert!(session.studio().video().is_some());

        let report = session.select_topic("zomato").await.unwrap();
        assert_eq!(report.section, StepOutcome::Populated);
        assert_eq!(session.active_phase(), Phase::Requirements);
        assert!(session.studio().video().is_none());
        assert_eq!(scripted.section_calls(), 3);
    }

    #[tokio::test]
    async fn test_unknown_topic_leaves_session_unchanged() {
        let (mut session, scripted) = session(ScriptedCapability::new());
        let err = session.select_topic("myspace").await.unwrap_err();
        assert!(matches!(err, ArchProError::UnknownTopic { .. }));
        assert!(session.selected_topic().is_none());
        assert_eq!(scripted.section_calls(), 0);
    }

    #[tokio::test]
    async fn test_phase_change_without_topic_generates_nothing() {
        let (mut session, scripted) = session(ScriptedCapability::new());
        assert!(session.change_phase(Phase::LowLevelDesign).await.is_none());
        assert_eq!(session.active_phase(), Phase::LowLevelDesign);
        assert_eq!(scripted.section_calls(), 0);
        assert!(matches!(session.render(), View::Welcome(_)));
    }

    #[tokio::test]
    async fn test_view_toggle_never_generates() {
        let (mut session, scripted) = session(ScriptedCapability::new());
        session.select_topic("uber").await.unwrap();
        session.change_phase(Phase::HighLevelDesign).await;
        let calls = scripted.section_calls();

        assert_eq!(session.toggle_view(), ViewMode::Blog);
        let View::Blog(blog) = session.render() else {
            panic!("expected blog view");
        };
        assert_eq!(
            blog.body,
            "uber/requirements section\n\n---\n\nuber/hld section"
        );
        assert_eq!(blog.diagram.as_deref(), Some("graph TD\n  uber"));

        session.set_view(ViewMode::Workspace);
        assert!(matches!(session.render(), View::Workspace(_)));
        assert_eq!(scripted.section_calls(), calls);
    }

    #[tokio::test]
    async fn test_video_without_topic() {
        let (mut session, scripted) = session(ScriptedCapability::new());
        assert_eq!(session.request_video().await, VideoOutcome::NoTopic);
        assert_eq!(scripted.video_calls(), 0);
    }

    #[tokio::test]
    async fn test_entity_not_found_reopens_selection() {
        let (session, _scripted) = session(ScriptedCapability::new().fail_video_with(
            GenerationError::NotFound("gemini returned 404 Not Found: Requested entity was not found.".into()),
        ));
        let hook = Arc::new(RecordingHook::default());
        let mut session = session.with_hook(hook.clone());
        session.select_topic("uber").await.unwrap();

        let outcome = session.request_video().await;
        let VideoOutcome::Failed {
            reselect_requested, ..
        } = outcome
        else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reselect_requested);
        // Once before (nothing selected), once after the failure.
        assert_eq!(hook.prompts.load(Ordering::SeqCst), 2);
        assert!(!session.is_generating_video());
    }

    #[tokio::test]
    async fn test_other_video_failures_do_not_reopen_selection() {
        let (session, _scripted) = session(
            ScriptedCapability::new().fail_video_with(GenerationError::JobFailed("quota".into())),
        );
        let hook = Arc::new(RecordingHook::default());
        hook.selected.store(true, Ordering::SeqCst);
        let mut session = session.with_hook(hook.clone());
        session.select_topic("uber").await.unwrap();

        let outcome = session.request_video().await;
        assert!(matches!(
            outcome,
            VideoOutcome::Failed {
                reselect_requested: false,
                ..
            }
        ));
        assert_eq!(hook.prompts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let json = serde_json::to_value(View::Welcome(WelcomeView { demo_mode: true })).unwrap();
        assert_eq!(json["view"], "welcome");
        assert_eq!(json["demo_mode"], true);
    }
}
