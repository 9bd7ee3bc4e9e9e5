//! Scripted generation capability for tests
//!
//! Counts every call per operation and yields once before answering, so
//! tasks joined with `tokio::join!` interleave deterministically.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

use archpro_utils::error::GenerationError;
use archpro_utils::types::Phase;

use crate::types::{GenerationCapability, ImageRef, VideoRef};

#[derive(Default)]
pub struct ScriptedCapability {
    section_calls: AtomicUsize,
    diagram_calls: AtomicUsize,
    cover_calls: AtomicUsize,
    video_calls: AtomicUsize,
    fail_all_sections: bool,
    failing_sections: Mutex<HashSet<(String, Phase)>>,
    fail_diagrams: bool,
    empty_diagrams: bool,
    fail_covers: bool,
    cover_absent: bool,
    video_error: Option<GenerationError>,
    gate: Option<Semaphore>,
}

impl ScriptedCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fail_sections(mut self) -> Self {
        self.fail_all_sections = true;
        self
    }

    /// Fail only the section for (topic, phase).
    #[must_use]
    pub fn fail_section(self, topic_id: &str, phase: Phase) -> Self {
        self.failing_sections
            .lock()
            .unwrap()
            .insert((topic_id.to_string(), phase));
        self
    }

    /// Let a previously failing section succeed from now on.
    pub fn heal_section(&self, topic_id: &str, phase: Phase) {
        self.failing_sections
            .lock()
            .unwrap()
            .remove(&(topic_id.to_string(), phase));
    }

    #[must_use]
    pub fn fail_diagrams(mut self) -> Self {
        self.fail_diagrams = true;
        self
    }

    #[must_use]
    pub fn empty_diagrams(mut self) -> Self {
        self.empty_diagrams = true;
        self
    }

    #[must_use]
    pub fn fail_covers(mut self) -> Self {
        self.fail_covers = true;
        self
    }

    /// Covers succeed without an image.
    #[must_use]
    pub fn cover_absent(mut self) -> Self {
        self.cover_absent = true;
        self
    }

    #[must_use]
    pub fn fail_video_with(mut self, error: GenerationError) -> Self {
        self.video_error = Some(error);
        self
    }

    /// Hold every call until [`ScriptedCapability::release`] adds permits.
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn section_calls(&self) -> usize {
        self.section_calls.load(Ordering::SeqCst)
    }

    pub fn diagram_calls(&self) -> usize {
        self.diagram_calls.load(Ordering::SeqCst)
    }

    pub fn cover_calls(&self) -> usize {
        self.cover_calls.load(Ordering::SeqCst)
    }

    pub fn video_calls(&self) -> usize {
        self.video_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        tokio::task::yield_now().await;
        if let Some(gate) = &self.gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
    }

    fn transport(what: &str) -> GenerationError {
        GenerationError::Transport(format!("scripted {what} failure"))
    }
}

#[async_trait]
impl GenerationCapability for ScriptedCapability {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn produce_section(
        &self,
        topic_id: &str,
        _topic_name: &str,
        phase: Phase,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        self.section_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let scripted_failure = self
            .failing_sections
            .lock()
            .unwrap()
            .contains(&(topic_id.to_string(), phase));
        if self.fail_all_sections || scripted_failure {
            return Err(Self::transport("section"));
        }
        Ok(format!("{topic_id}/{} section", phase.slug()))
    }

    async fn produce_diagram(
        &self,
        topic_id: &str,
        _topic_name: &str,
    ) -> Result<String, GenerationError> {
        self.diagram_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_diagrams {
            return Err(Self::transport("diagram"));
        }
        if self.empty_diagrams {
            return Err(GenerationError::EmptyResponse(format!(
                "no diagram for {topic_id}"
            )));
        }
        Ok(format!("graph TD\n  {topic_id}"))
    }

    async fn produce_cover(
        &self,
        topic_id: &str,
        _topic_name: &str,
    ) -> Result<Option<ImageRef>, GenerationError> {
        self.cover_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_covers {
            return Err(Self::transport("cover"));
        }
        if self.cover_absent {
            return Ok(None);
        }
        Ok(Some(ImageRef::Url(format!("https://img.test/{topic_id}"))))
    }

    async fn produce_video(&self, topic_name: &str) -> Result<VideoRef, GenerationError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.video_error {
            Some(error) => Err(error.clone()),
            None => Ok(VideoRef::new(format!("https://video.test/{topic_name}"))),
        }
    }
}
