use archpro_utils::error::ConfigError;
use archpro_utils::types::ViewMode;

use super::{Config, ProviderKind};

pub(crate) const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 1..=300;
pub(crate) const MAX_POLLS_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;
pub(crate) const REQUEST_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 5..=3600;
pub(crate) const MAX_THINKING_BUDGET: u32 = 32_768;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider_kind()?;

        if let Some(mode) = &self.defaults.view_mode
            && mode.parse::<ViewMode>().is_err()
        {
            return Err(invalid(
                "view_mode",
                format!("'{mode}' (expected 'workspace' or 'blog')"),
            ));
        }

        if let Some(interval) = self.video.poll_interval
            && !POLL_INTERVAL_RANGE.contains(&interval)
        {
            return Err(invalid(
                "poll_interval",
                format!("{interval} (must be between 1 and 300 seconds)"),
            ));
        }

        if let Some(max_polls) = self.video.max_polls
            && !MAX_POLLS_RANGE.contains(&max_polls)
        {
            return Err(invalid(
                "max_polls",
                format!("{max_polls} (must be between 1 and 1000)"),
            ));
        }

        if let Some(gemini) = &self.llm.gemini {
            if let Some(timeout) = gemini.request_timeout
                && !REQUEST_TIMEOUT_RANGE.contains(&timeout)
            {
                return Err(invalid(
                    "request_timeout",
                    format!("{timeout} (must be between 5 and 3600 seconds)"),
                ));
            }

            if let Some(budget) = gemini.thinking_budget
                && budget > MAX_THINKING_BUDGET
            {
                return Err(invalid(
                    "thinking_budget",
                    format!("{budget} (exceeds maximum of {MAX_THINKING_BUDGET})"),
                ));
            }

            if let Some(var) = &gemini.api_key_env
                && var.trim().is_empty()
            {
                return Err(invalid("api_key_env", "must not be empty"));
            }

            if let Some(url) = &gemini.base_url
                && !(url.starts_with("https://") || url.starts_with("http://"))
            {
                return Err(invalid("base_url", format!("'{url}' is not an http(s) URL")));
            }
        }

        Ok(())
    }

    /// Parse the configured provider name.
    pub fn provider_kind(&self) -> Result<ProviderKind, ConfigError> {
        match self.llm.provider.as_deref().unwrap_or("gemini") {
            "gemini" => Ok(ProviderKind::Gemini),
            "static" => Ok(ProviderKind::Static),
            other => Err(invalid(
                "llm_provider",
                format!("Unknown provider '{other}' (expected 'gemini' or 'static')"),
            )),
        }
    }
}
