//! Environment health checks for `archpro doctor`
//!
//! Checks never print or serialize the credential value; only the name of
//! its source and whether it is usable.

use serde::{Deserialize, Serialize};

use archpro_config::{Config, CredentialSource, ProviderKind};
use archpro_content::{StaticFallbackStore, TopicCatalog};
use archpro_utils::types::Phase;

/// Schema version of the doctor JSON output
pub const DOCTOR_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Pass => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

impl DoctorCheck {
    fn new(name: &str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorOutput {
    pub schema_version: String,
    /// False if any check failed; warnings keep it true
    pub ok: bool,
    /// Sorted by name
    pub checks: Vec<DoctorCheck>,
}

impl DoctorOutput {
    /// Human-readable report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::from("archpro environment health check\n\n");
        for check in &self.checks {
            out.push_str(&format!(
                "  {} {}: {}\n",
                check.status.symbol(),
                check.name,
                check.details
            ));
        }
        let count = |status: CheckStatus| self.checks.iter().filter(|c| c.status == status).count();
        out.push_str(&format!(
            "\n{} passed, {} warnings, {} failed\n",
            count(CheckStatus::Pass),
            count(CheckStatus::Warn),
            count(CheckStatus::Fail)
        ));
        out
    }
}

/// Run every check.
#[must_use]
pub fn run_checks(
    config: &Config,
    credentials: &dyn CredentialSource,
    catalog: &TopicCatalog,
    store: &StaticFallbackStore,
) -> DoctorOutput {
    let mut checks = vec![
        check_config_file(config),
        check_provider(config),
        check_credential(config, credentials),
        check_catalog(catalog),
        check_fallback_coverage(catalog, store),
        check_video_polling(config),
    ];
    checks.sort_by(|a, b| a.name.cmp(&b.name));

    DoctorOutput {
        schema_version: DOCTOR_SCHEMA_VERSION.to_string(),
        ok: checks.iter().all(|c| c.status != CheckStatus::Fail),
        checks,
    }
}

fn check_config_file(config: &Config) -> DoctorCheck {
    let details = match &config.config_path {
        Some(path) if path.is_file() => format!("loaded {}", path.display()),
        Some(path) => format!("{} not found; using defaults", path.display()),
        None => "no config file; using defaults".to_string(),
    };
    DoctorCheck::new("config_file", CheckStatus::Pass, details)
}

fn check_provider(config: &Config) -> DoctorCheck {
    match config.provider_kind() {
        Ok(ProviderKind::Gemini) => DoctorCheck::new(
            "llm_provider",
            CheckStatus::Pass,
            format!("gemini ({})", config.gemini().base_url),
        ),
        Ok(ProviderKind::Static) => DoctorCheck::new(
            "llm_provider",
            CheckStatus::Pass,
            "static fallback content only",
        ),
        Err(e) => DoctorCheck::new("llm_provider", CheckStatus::Fail, e.to_string()),
    }
}

fn check_credential(config: &Config, credentials: &dyn CredentialSource) -> DoctorCheck {
    if matches!(config.provider_kind(), Ok(ProviderKind::Static)) {
        return DoctorCheck::new("credential", CheckStatus::Pass, "not required");
    }
    match credentials.current() {
        Some(_) => DoctorCheck::new(
            "credential",
            CheckStatus::Pass,
            format!("usable key from {}", credentials.describe()),
        ),
        None => DoctorCheck::new(
            "credential",
            CheckStatus::Warn,
            format!(
                "no usable key from {}; demo mode serves static fallbacks",
                credentials.describe()
            ),
        ),
    }
}

fn check_catalog(catalog: &TopicCatalog) -> DoctorCheck {
    if catalog.is_empty() {
        DoctorCheck::new("topic_catalog", CheckStatus::Fail, "catalog is empty")
    } else {
        DoctorCheck::new(
            "topic_catalog",
            CheckStatus::Pass,
            format!("{} topics", catalog.len()),
        )
    }
}

fn check_fallback_coverage(catalog: &TopicCatalog, store: &StaticFallbackStore) -> DoctorCheck {
    let uncovered: Vec<&str> = catalog
        .iter()
        .filter(|topic| store.covered_phases(&topic.id).is_empty() && store.diagram(&topic.id).is_none())
        .map(|topic| topic.id.as_str())
        .collect();

    let summary = format!(
        "{} sections and {} diagrams bundled ({} phases per topic)",
        store.section_count(),
        store.diagram_count(),
        Phase::ALL.len()
    );
    if uncovered.is_empty() {
        DoctorCheck::new("fallback_coverage", CheckStatus::Pass, summary)
    } else {
        DoctorCheck::new(
            "fallback_coverage",
            CheckStatus::Warn,
            format!(
                "{summary}; demo placeholders only for: {}",
                uncovered.join(", ")
            ),
        )
    }
}

fn check_video_polling(config: &Config) -> DoctorCheck {
    let interval = config.poll_interval();
    let max_polls = config.max_polls();
    DoctorCheck::new(
        "video_polling",
        CheckStatus::Pass,
        format!(
            "every {}s, at most {max_polls} polls ({}s)",
            interval.as_secs(),
            interval.as_secs() * u64::from(max_polls)
        ),
    )
}
