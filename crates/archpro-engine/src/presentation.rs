//! Read-only presentation of cached content
//!
//! Views are built from a [`ContentReader`] and never trigger generation.
//! Workspace mode shows one phase; blog mode concatenates every cached
//! phase of a topic in phase order.

use serde::Serialize;

use archpro_content::Topic;
use archpro_llm::{ImageRef, VideoRef};
use archpro_utils::types::Phase;

/// Separator between sections in a blog body
pub const BLOG_SECTION_SEPARATOR: &str = "\n\n---\n\n";

pub const BLOG_BYLINE: &str =
    "Architect Pro Editorial · Published · 12 min read · Engineering Blog";

pub const COVER_PENDING: &str = "Generating AI Artwork...";

const DIAGRAM_HEADING: &str = "System Architecture Blueprint";

/// Read surface of the content caches.
pub trait ContentReader {
    fn section(&self, topic_id: &str, phase: Phase) -> Option<String>;

    fn diagram(&self, topic_id: &str) -> Option<String>;

    fn cover(&self, topic_id: &str) -> Option<ImageRef>;

    fn video(&self) -> Option<VideoRef>;

    /// Phases with a cached section, in phase order.
    fn cached_phases(&self, topic_id: &str) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|phase| self.section(topic_id, *phase).is_some())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicHeader {
    pub id: String,
    pub name: String,
    pub icon: String,
}

impl From<&Topic> for TopicHeader {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id.clone(),
            name: topic.name.clone(),
            icon: topic.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub phase: Phase,
    pub label: &'static str,
    pub active: bool,
    pub cached: bool,
}

/// One phase of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceView {
    pub topic: TopicHeader,
    pub active_phase: Phase,
    pub tabs: Vec<Tab>,
    /// Empty when the section is not cached
    pub section: String,
    /// Only for the High Level Design phase
    pub diagram: Option<String>,
    pub video: Option<VideoRef>,
}

impl WorkspaceView {
    #[must_use]
    pub fn build(reader: &dyn ContentReader, topic: &Topic, active_phase: Phase) -> Self {
        let tabs = Phase::ALL
            .into_iter()
            .map(|phase| Tab {
                phase,
                label: phase.label(),
                active: phase == active_phase,
                cached: reader.section(&topic.id, phase).is_some(),
            })
            .collect();

        let diagram = if active_phase == Phase::HighLevelDesign {
            reader.diagram(&topic.id)
        } else {
            None
        };

        Self {
            topic: TopicHeader::from(topic),
            active_phase,
            tabs,
            section: reader
                .section(&topic.id, active_phase)
                .unwrap_or_default(),
            diagram,
            video: reader.video(),
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {} {}\n\n", self.topic.icon, self.topic.name);

        let tabs: Vec<String> = self
            .tabs
            .iter()
            .map(|tab| {
                let mark = if tab.cached { "" } else { " ·" };
                if tab.active {
                    format!("**[{}]**{mark}", tab.label)
                } else {
                    format!("{}{mark}", tab.label)
                }
            })
            .collect();
        out.push_str(&tabs.join(" | "));
        out.push_str("\n\n");

        if let Some(video) = &self.video {
            out.push_str(&format!("Explainer video: {}\n\n", video.redacted()));
        }
        if let Some(diagram) = &self.diagram {
            push_diagram(&mut out, diagram);
        }
        out.push_str(&self.section);
        if !self.section.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// All cached phases of one topic as a single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogView {
    pub topic_id: String,
    pub title: String,
    pub cover: Option<ImageRef>,
    pub byline: &'static str,
    pub body: String,
    pub diagram: Option<String>,
    pub video: Option<VideoRef>,
}

impl BlogView {
    #[must_use]
    pub fn build(reader: &dyn ContentReader, topic: &Topic) -> Self {
        Self {
            topic_id: topic.id.clone(),
            title: blog_title(topic),
            cover: reader.cover(&topic.id),
            byline: BLOG_BYLINE,
            body: blog_body(reader, &topic.id),
            diagram: reader.diagram(&topic.id),
            video: reader.video(),
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        match &self.cover {
            Some(cover) if cover.is_inline() => out.push_str("![Cover](inline image)\n\n"),
            Some(cover) => out.push_str(&format!("![Cover]({})\n\n", cover.to_src())),
            None => out.push_str(&format!("_{COVER_PENDING}_\n\n")),
        }
        out.push_str(&format!("# {}\n\n_{}_\n\n", self.title, self.byline));

        if let Some(video) = &self.video {
            out.push_str(&format!("Explainer video: {}\n\n", video.redacted()));
        }
        if let Some(diagram) = &self.diagram {
            push_diagram(&mut out, diagram);
        }
        out.push_str(&self.body);
        if !self.body.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// `"Designing <name before the first '/'>: An SDE-3 Deep Dive"`
#[must_use]
pub fn blog_title(topic: &Topic) -> String {
    format!("Designing {}: An SDE-3 Deep Dive", topic.short_name())
}

/// Cached sections in phase order, absent phases skipped.
#[must_use]
pub fn blog_body(reader: &dyn ContentReader, topic_id: &str) -> String {
    Phase::ALL
        .into_iter()
        .filter_map(|phase| reader.section(topic_id, phase))
        .collect::<Vec<_>>()
        .join(BLOG_SECTION_SEPARATOR)
}

fn push_diagram(out: &mut String, diagram: &str) {
    out.push_str(&format!(
        "### {DIAGRAM_HEADING}\n\n```mermaid\n{diagram}\n```\n\n"
    ));
}

/// Landing screen before a topic is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeView {
    pub demo_mode: bool,
}

impl WelcomeView {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from(
            "# Architect Pro Workspace\n\n\
             Master system design at an SDE-3 level. Select a blueprint to begin your deep dive.\n",
        );
        if self.demo_mode {
            out.push_str("\n**Demo Mode: Running with Static Fallbacks**\n");
        }
        out
    }
}
