//! Configuration and credential resolution for archpro

mod config;
pub mod credential;

pub use config::{
    CliArgs, Config, ConfigBuilder, Defaults, GeminiConfig, LlmConfig, ProviderKind,
    ResolvedGemini, VideoConfig,
};
pub use config::{CONFIG_DIR_NAME, PROVIDER_ENV_VAR};
pub use config::{
    DEFAULT_API_KEY_ENV, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_THINKING_BUDGET,
};
pub use credential::{
    Credential, CredentialSource, EnvCredentialSource, SelectedCredentialSource, StaticCredential,
};
