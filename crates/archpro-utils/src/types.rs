use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, EnumString};

/// Content phases of a system-design write-up.
///
/// `Phase` is a closed, ordered enumeration. The declaration order is the
/// reading order of a published article: blog composition walks
/// [`Phase::ALL`], never cache insertion order.
///
/// # Phase Order
///
/// ```text
/// Requirements → High Level Design → Data Model & APIs → Low Level Design
///   → Machine Coding → Deep Dives & Scaling → Interview Follow-ups
/// ```
///
/// # Parsing
///
/// Phases parse case-insensitively from their CLI slug, a long kebab-case
/// name, or the display label:
///
/// ```rust
/// use archpro_utils::types::Phase;
///
/// assert_eq!("hld".parse::<Phase>().unwrap(), Phase::HighLevelDesign);
/// assert_eq!("High Level Design".parse::<Phase>().unwrap(), Phase::HighLevelDesign);
/// assert_eq!(Phase::DataModelApis.slug(), "data-model");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumCount,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Phase {
    /// Functional and non-functional requirements, capacity planning.
    #[strum(serialize = "requirements", serialize = "req")]
    Requirements,
    /// Component breakdown and request flow.
    #[strum(
        serialize = "hld",
        serialize = "high-level-design",
        serialize = "High Level Design"
    )]
    HighLevelDesign,
    /// Storage schemas and API surface.
    #[strum(
        serialize = "data-model",
        serialize = "data-model-apis",
        serialize = "Data Model & APIs"
    )]
    DataModelApis,
    /// Class-level design with code.
    #[strum(
        serialize = "lld",
        serialize = "low-level-design",
        serialize = "Low Level Design (Java)"
    )]
    LowLevelDesign,
    /// Time-boxed build exercise.
    #[strum(
        serialize = "machine-coding",
        serialize = "Machine Coding / Craft"
    )]
    MachineCoding,
    /// Throughput, ordering and consistency trade-offs.
    #[strum(
        serialize = "deep-dives",
        serialize = "deep-dives-scaling",
        serialize = "Deep Dives & Scaling"
    )]
    DeepDivesScaling,
    /// Senior-level follow-up questions.
    #[strum(
        serialize = "follow-ups",
        serialize = "interview-followups",
        serialize = "Interview Follow-ups"
    )]
    InterviewFollowups,
}

impl Phase {
    /// All phases in reading order.
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Requirements,
        Phase::HighLevelDesign,
        Phase::DataModelApis,
        Phase::LowLevelDesign,
        Phase::MachineCoding,
        Phase::DeepDivesScaling,
        Phase::InterviewFollowups,
    ];

    /// Position of the phase in [`Phase::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Requirements => "Requirements",
            Self::HighLevelDesign => "High Level Design",
            Self::DataModelApis => "Data Model & APIs",
            Self::LowLevelDesign => "Low Level Design (Java)",
            Self::MachineCoding => "Machine Coding / Craft",
            Self::DeepDivesScaling => "Deep Dives & Scaling",
            Self::InterviewFollowups => "Interview Follow-ups",
        }
    }

    /// Short CLI name; also the suffix of section cache keys.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::HighLevelDesign => "hld",
            Self::DataModelApis => "data-model",
            Self::LowLevelDesign => "lld",
            Self::MachineCoding => "machine-coding",
            Self::DeepDivesScaling => "deep-dives",
            Self::InterviewFollowups => "follow-ups",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How cached content is composed for display.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ViewMode {
    /// One phase at a time, tabbed.
    #[default]
    Workspace,
    /// Every cached phase as one article.
    Blog,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Workspace => Self::Blog,
            Self::Blog => Self::Workspace,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Blog => "blog",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an effective configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value read from an environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Env => "env",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_phase_all_matches_declaration_order() {
        let iterated: Vec<Phase> = Phase::iter().collect();
        assert_eq!(iterated, Phase::ALL.to_vec());
        assert_eq!(Phase::ALL.len(), Phase::COUNT);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_phase_parses_slug_label_and_case() {
        for phase in Phase::ALL {
            assert_eq!(phase.slug().parse::<Phase>().unwrap(), phase);
            assert_eq!(phase.label().parse::<Phase>().unwrap(), phase);
            assert_eq!(
                phase.slug().to_uppercase().parse::<Phase>().unwrap(),
                phase
            );
        }
        assert!("architecture".parse::<Phase>().is_err());
    }

    #[test]
    fn test_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&Phase::DeepDivesScaling).unwrap();
        assert_eq!(json, r#""deep-dives-scaling""#);
        let back: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Phase::DeepDivesScaling);
    }

    #[test]
    fn test_phase_ordering_follows_enumeration() {
        assert!(Phase::Requirements < Phase::HighLevelDesign);
        assert!(Phase::DeepDivesScaling < Phase::InterviewFollowups);
    }

    #[test]
    fn test_view_mode_toggle_and_parse() {
        assert_eq!(ViewMode::default(), ViewMode::Workspace);
        assert_eq!(ViewMode::Workspace.toggled(), ViewMode::Blog);
        assert_eq!(ViewMode::Blog.toggled(), ViewMode::Workspace);
        assert_eq!("BLOG".parse::<ViewMode>().unwrap(), ViewMode::Blog);
        assert!("gallery".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_config_source_labels() {
        assert_eq!(ConfigSource::Cli.as_str(), "cli");
        assert_eq!(ConfigSource::Env.as_str(), "env");
        assert_eq!(ConfigSource::Default.as_str(), "default");
    }
}
