//! Core types for the generation capability abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use archpro_utils::error::GenerationError;
use archpro_utils::redaction::redact_error_message;
use archpro_utils::types::Phase;

/// A cover image, either remote or embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Url(String),
    Inline { mime_type: String, data: String },
}

impl ImageRef {
    /// Value usable as an `<img src>`: the URL, or a base64 data URI.
    ///
    /// ```rust
    /// use archpro_llm::ImageRef;
    ///
    /// let inline = ImageRef::Inline { mime_type: "image/png".into(), data: "iVBO".into() };
    /// assert_eq!(inline.to_src(), "data:image/png;base64,iVBO");
    /// ```
    #[must_use]
    pub fn to_src(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Inline { mime_type, data } => format!("data:{mime_type};base64,{data}"),
        }
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

/// A playable explainer video.
///
/// The URI may embed the API key as a `key` query parameter; use
/// [`VideoRef::redacted`] for anything that is logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub uri: String,
}

impl VideoRef {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Append `key=<key>` to a download URI.
    ///
    /// ```rust
    /// use archpro_llm::VideoRef;
    ///
    /// let v = VideoRef::with_key("https://host/files/a:download?alt=media", "k3y123");
    /// assert_eq!(v.uri, "https://host/files/a:download?alt=media&key=k3y123");
    /// let v = VideoRef::with_key("https://host/files/a", "k3y123");
    /// assert_eq!(v.uri, "https://host/files/a?key=k3y123");
    /// ```
    #[must_use]
    pub fn with_key(uri: &str, key: &str) -> Self {
        let separator = if uri.contains('?') { '&' } else { '?' };
        Self {
            uri: format!("{uri}{separator}key={key}"),
        }
    }

    /// The URI with any credential removed.
    #[must_use]
    pub fn redacted(&self) -> String {
        redact_error_message(&self.uri)
    }
}

/// The four generation operations.
///
/// Implementations are stateless with respect to the content caches: they
/// receive a key's coordinates and return a value or a failure.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Whether calls currently reach a live service (false in demo mode).
    fn is_live(&self) -> bool {
        false
    }

    async fn produce_section(
        &self,
        topic_id: &str,
        topic_name: &str,
        phase: Phase,
        prompt: &str,
    ) -> Result<String, GenerationError>;

    /// Mermaid source for the high-level architecture.
    async fn produce_diagram(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<String, GenerationError>;

    /// `Ok(None)` when the service answered without an image.
    async fn produce_cover(
        &self,
        topic_id: &str,
        topic_name: &str,
    ) -> Result<Option<ImageRef>, GenerationError>;

    async fn produce_video(&self, topic_name: &str) -> Result<VideoRef, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_image_ref_sources() {
        let url = ImageRef::Url("https://picsum.photos/seed/uber/1200/600?grayscale".into());
        assert_eq!(
            url.to_src(),
            "https://picsum.photos/seed/uber/1200/600?grayscale"
        );
        assert!(!url.is_inline());
    }

    #[test]
    fn test_image_ref_serializes_by_variant() {
        let json = serde_json::to_string(&ImageRef::Url("u".into())).unwrap();
        assert_eq!(json, r#"{"url":"u"}"#);
    }

    #[test]
    fn test_video_ref_redacted() {
        let v = VideoRef::with_key("https://host/v?alt=media", "AIzaSecret");
        assert!(v.uri.ends_with("key=AIzaSecret"));
        assert!(!v.redacted().contains("AIzaSecret"));
    }

    proptest! {
        #[test]
        fn prop_redacted_video_uri_hides_key(
            base in "https://generativelanguage\\.googleapis\\.com/v1beta/files/[a-z0-9]{4,12}(:download\\?alt=media)?",
            key in "[A-Za-z0-9_-]{6,40}",
        ) {
            prop_assume!(!base.contains(&key));
            prop_assume!(!"[REDACTED_KEY]".contains(&key));
            let video = VideoRef::with_key(&base, &key);
            prop_assert!(video.uri.contains(&key));
            prop_assert!(!video.redacted().contains(&key));
        }
    }
}
