use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use super::{CliArgs, Config, ConfigSource, Defaults, LlmConfig, VideoConfig};

/// Environment variable overriding `[llm].provider`
pub const PROVIDER_ENV_VAR: &str = "ARCHPRO_LLM_PROVIDER";

/// Directory holding the config file
pub const CONFIG_DIR_NAME: &str = ".archpro";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    llm: Option<LlmConfig>,
    video: Option<VideoConfig>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover configuration starting from a specific directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::discover_with_env(start_dir, cli_args, |key| env::var(key).ok())
    }

    /// Path- and environment-driven variant used by tests to avoid
    /// process-global state.
    pub fn discover_with_env<F>(start_dir: &Path, cli_args: &CliArgs, env_lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults::default();
        let mut llm = LlmConfig::default();
        let mut video = VideoConfig::default();

        for key in ["view_mode", "verbose", "llm_provider", "poll_interval", "max_polls"] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit_path) => Some(explicit_path.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "Loading config file");
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::Config;

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.view_mode.is_some() {
                    defaults.view_mode = file_defaults.view_mode;
                    source_attribution.insert("view_mode".to_string(), source);
                }
                if file_defaults.verbose.is_some() {
                    defaults.verbose = file_defaults.verbose;
                    source_attribution.insert("verbose".to_string(), source);
                }
            }

            if let Some(file_llm) = file_config.llm {
                if file_llm.provider.is_some() {
                    llm.provider = file_llm.provider;
                    source_attribution.insert("llm_provider".to_string(), source);
                }
                if let Some(file_gemini) = file_llm.gemini {
                    llm.gemini = Some(file_gemini);
                    source_attribution.insert("llm_gemini".to_string(), source);
                }
            }

            if let Some(file_video) = file_config.video {
                if file_video.poll_interval.is_some() {
                    video.poll_interval = file_video.poll_interval;
                    source_attribution.insert("poll_interval".to_string(), source);
                }
                if file_video.max_polls.is_some() {
                    video.max_polls = file_video.max_polls;
                    source_attribution.insert("max_polls".to_string(), source);
                }
            }
        }

        if let Some(env_provider) = env_lookup(PROVIDER_ENV_VAR)
            && !env_provider.is_empty()
        {
            llm.provider = Some(env_provider);
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Env);
        }

        // CLI overrides (highest priority)
        if let Some(provider) = &cli_args.llm_provider {
            llm.provider = Some(provider.clone());
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Cli);
        }
        if let Some(api_key_env) = &cli_args.api_key_env {
            llm.gemini.get_or_insert_with(Default::default).api_key_env =
                Some(api_key_env.clone());
            source_attribution.insert("api_key_env".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }
        if let Some(view_mode) = &cli_args.view_mode {
            defaults.view_mode = Some(view_mode.clone());
            source_attribution.insert("view_mode".to_string(), ConfigSource::Cli);
        }
        if let Some(poll_interval) = cli_args.poll_interval {
            video.poll_interval = Some(poll_interval);
            source_attribution.insert("poll_interval".to_string(), ConfigSource::Cli);
        }
        if let Some(max_polls) = cli_args.max_polls {
            video.max_polls = Some(max_polls);
            source_attribution.insert("max_polls".to_string(), ConfigSource::Cli);
        }

        if llm.provider.is_none() {
            llm.provider = Some("gemini".to_string());
        }

        let config = Self {
            defaults,
            llm,
            video,
            config_path,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.archpro/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(CONFIG_DIR_NAME).join("config.toml");
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).with_context(|| {
                format!("Failed to parse TOML config file: {}", path.display())
            }),
            // A missing explicit file behaves like an empty one.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }
}
