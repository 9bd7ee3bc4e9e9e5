use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use archpro_utils::types::ConfigSource;

/// Default environment variable holding the generation API key
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_DIAGRAM_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Thinking budget for section generation
pub const DEFAULT_THINKING_BUDGET: u32 = 16_384;

/// Per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Seconds between video job status polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Maximum number of video job status polls (10 minutes at the default interval)
pub const DEFAULT_MAX_POLLS: u32 = 60;

/// Generation provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Live Gemini REST backend; falls back to static content without a key.
    Gemini,
    /// Static fallback content only; never performs network calls.
    Static,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Static => "static",
        }
    }
}

/// Configuration for archpro.
///
/// Precedence: CLI arguments > environment > config file > built-in defaults.
/// Use [`Config::discover()`] for CLI behavior or [`Config::builder()`] for
/// embedding.
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub llm: LlmConfig,
    pub video: VideoConfig,
    /// Config file that contributed values, if any
    pub config_path: Option<PathBuf>,
    pub(crate) source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// `workspace` or `blog`
    pub view_mode: Option<String>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            view_mode: Some("workspace".to_string()),
            verbose: Some(false),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    pub provider: Option<String>,
    pub gemini: Option<GeminiConfig>,
}

/// `[llm.gemini]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub diagram_model: Option<String>,
    pub image_model: Option<String>,
    pub video_model: Option<String>,
    pub thinking_budget: Option<u32>,
    /// Seconds
    pub request_timeout: Option<u64>,
}

/// `[video]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VideoConfig {
    /// Seconds between job status polls
    pub poll_interval: Option<u64>,
    pub max_polls: Option<u32>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval: Some(DEFAULT_POLL_INTERVAL_SECS),
            max_polls: Some(DEFAULT_MAX_POLLS),
        }
    }
}

/// Fully resolved Gemini settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGemini {
    pub api_key_env: String,
    pub base_url: String,
    pub text_model: String,
    pub diagram_model: String,
    pub image_model: String,
    pub video_model: String,
    pub thinking_budget: u32,
    pub request_timeout: std::time::Duration,
}

impl GeminiConfig {
    /// Apply built-in defaults to every unset field.
    #[must_use]
    pub fn resolve(&self) -> ResolvedGemini {
        ResolvedGemini {
            api_key_env: self
                .api_key_env
                .clone()
                .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            text_model: self
                .text_model
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            diagram_model: self
                .diagram_model
                .clone()
                .unwrap_or_else(|| DEFAULT_DIAGRAM_MODEL.to_string()),
            image_model: self
                .image_model
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            video_model: self
                .video_model
                .clone()
                .unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            thinking_budget: self.thinking_budget.unwrap_or(DEFAULT_THINKING_BUDGET),
            request_timeout: std::time::Duration::from_secs(
                self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        }
    }
}
