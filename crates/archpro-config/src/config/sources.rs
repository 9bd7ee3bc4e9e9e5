use std::collections::BTreeMap;

use archpro_utils::types::ConfigSource;

use super::Config;

fn source_label(source: Option<&ConfigSource>) -> String {
    source.copied().unwrap_or(ConfigSource::Default).as_str().to_string()
}

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key.
    ///
    /// Only the name of the credential variable is reported, never its value.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();
        let gemini = self.gemini();

        let gemini_source = |key: &str| {
            self.source_attribution
                .get(key)
                .or_else(|| self.source_attribution.get("llm_gemini"))
        };

        let mut add = |key: &str, value: String, source: Option<&ConfigSource>| {
            config.insert(key.to_string(), (value, source_label(source)));
        };

        add(
            "view_mode",
            self.view_mode().as_str().to_string(),
            self.source_attribution.get("view_mode"),
        );
        add(
            "verbose",
            self.verbose().to_string(),
            self.source_attribution.get("verbose"),
        );
        add(
            "llm_provider",
            self.llm.provider.clone().unwrap_or_else(|| "gemini".to_string()),
            self.source_attribution.get("llm_provider"),
        );
        add("api_key_env", gemini.api_key_env, gemini_source("api_key_env"));
        add("base_url", gemini.base_url, gemini_source("base_url"));
        add("text_model", gemini.text_model, gemini_source("text_model"));
        add("diagram_model", gemini.diagram_model, gemini_source("diagram_model"));
        add("image_model", gemini.image_model, gemini_source("image_model"));
        add("video_model", gemini.video_model, gemini_source("video_model"));
        add(
            "thinking_budget",
            gemini.thinking_budget.to_string(),
            gemini_source("thinking_budget"),
        );
        add(
            "request_timeout",
            gemini.request_timeout.as_secs().to_string(),
            gemini_source("request_timeout"),
        );
        add(
            "poll_interval",
            self.poll_interval().as_secs().to_string(),
            self.source_attribution.get("poll_interval"),
        );
        add(
            "max_polls",
            self.max_polls().to_string(),
            self.source_attribution.get("max_polls"),
        );

        config
    }

    /// Source of a single key, `default` when unattributed.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}
