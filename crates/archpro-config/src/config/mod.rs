//! Configuration management for archpro
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. The TOML file has `[defaults]`,
//! `[llm]`, `[llm.gemini]` and `[video]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

use std::time::Duration;

pub use archpro_utils::types::ConfigSource;
pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use discovery::{CONFIG_DIR_NAME, PROVIDER_ENV_VAR};
pub use model::*;

use archpro_utils::types::ViewMode;

use crate::credential::EnvCredentialSource;

impl Config {
    /// Initial view mode; an unparsable value was rejected by validation.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.defaults
            .view_mode
            .as_deref()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Gemini settings with defaults applied.
    #[must_use]
    pub fn gemini(&self) -> ResolvedGemini {
        self.llm.gemini.clone().unwrap_or_default().resolve()
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.video.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }

    #[must_use]
    pub fn max_polls(&self) -> u32 {
        self.video.max_polls.unwrap_or(DEFAULT_MAX_POLLS)
    }

    /// Environment-backed credential source named by `api_key_env`.
    #[must_use]
    pub fn credential_source(&self) -> EnvCredentialSource {
        EnvCredentialSource::new(self.gemini().api_key_env)
    }

    /// Built-in defaults only, with no discovery.
    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Config {
            defaults: Defaults::default(),
            llm: LlmConfig {
                provider: Some("static".to_string()),
                gemini: None,
            },
            video: VideoConfig::default(),
            config_path: None,
            source_attribution: std::collections::HashMap::new(),
        }
    }
}
