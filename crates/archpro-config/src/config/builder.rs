use std::collections::HashMap;
use std::time::Duration;

use archpro_utils::error::ConfigError;

use super::{Config, ConfigSource, Defaults, GeminiConfig, LlmConfig, VideoConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use archpro_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .provider("static")
    ///     .poll_interval(Duration::from_secs(5))
    ///     .max_polls(12)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_polls(), 12);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// Values set here are attributed to `ConfigSource::Programmatic`. Nothing
/// is read from the environment or the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    provider: Option<String>,
    view_mode: Option<String>,
    verbose: Option<bool>,
    gemini: GeminiConfig,
    gemini_keys: Vec<&'static str>,
    poll_interval: Option<u64>,
    max_polls: Option<u32>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `gemini` or `static`
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// `workspace` or `blog`
    #[must_use]
    pub fn view_mode(mut self, mode: impl Into<String>) -> Self {
        self.view_mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Name of the environment variable holding the API key.
    #[must_use]
    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.gemini.api_key_env = Some(var.into());
        self.gemini_keys.push("api_key_env");
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini.base_url = Some(url.into());
        self.gemini_keys.push("base_url");
        self
    }

    #[must_use]
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.gemini.text_model = Some(model.into());
        self.gemini_keys.push("text_model");
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.gemini.request_timeout = Some(timeout.as_secs());
        self.gemini_keys.push("request_timeout");
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval.as_secs());
        self
    }

    #[must_use]
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut video = VideoConfig::default();

        if self.view_mode.is_some() {
            defaults.view_mode = self.view_mode;
            source_attribution.insert("view_mode".to_string(), ConfigSource::Programmatic);
        }
        if self.verbose.is_some() {
            defaults.verbose = self.verbose;
            source_attribution.insert("verbose".to_string(), ConfigSource::Programmatic);
        }
        if self.poll_interval.is_some() {
            video.poll_interval = self.poll_interval;
            source_attribution.insert("poll_interval".to_string(), ConfigSource::Programmatic);
        }
        if self.max_polls.is_some() {
            video.max_polls = self.max_polls;
            source_attribution.insert("max_polls".to_string(), ConfigSource::Programmatic);
        }
        if self.provider.is_some() {
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Programmatic);
        }
        for key in &self.gemini_keys {
            source_attribution.insert((*key).to_string(), ConfigSource::Programmatic);
        }

        let config = Config {
            defaults,
            llm: LlmConfig {
                provider: Some(self.provider.unwrap_or_else(|| "gemini".to_string())),
                gemini: Some(self.gemini),
            },
            video,
            config_path: None,
            source_attribution,
        };

        config.validate()?;
        Ok(config)
    }
}
