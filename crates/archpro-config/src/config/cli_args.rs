use std::path::PathBuf;

/// CLI overrides consumed by [`Config::discover`](super::Config::discover).
///
/// Every field is optional; `None` leaves the lower-precedence value alone.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub view_mode: Option<String>,
    pub llm_provider: Option<String>,
    pub api_key_env: Option<String>,
    pub poll_interval: Option<u64>,
    pub max_polls: Option<u32>,
}
