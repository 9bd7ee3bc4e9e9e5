use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::redaction::redact_error_message;

/// Provider message that signals a stale or unselected credential.
pub const ENTITY_NOT_FOUND_SIGNAL: &str = "Requested entity was not found";

/// Library-level error type with user-friendly reporting.
///
/// `ArchProError` is what the CLI layer sees. Generation failures inside
/// `ensure_content` never reach it (they degrade to fallback content); only
/// explicitly surfaced operations (video generation, topic resolution,
/// configuration loading) produce one.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration, unknown topic or phase |
/// | 10 | Generation timeout or exhausted poll budget |
/// | 70 | Other generation failures |
/// | 77 | Credential rejected or stale |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use archpro_utils::error::ArchProError;
/// use archpro_utils::exit_codes::ExitCode;
///
/// let err = ArchProError::UnknownTopic { id: "myspace".to_string() };
/// assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
#[derive(Error, Debug)]
pub enum ArchProError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Unknown topic: {id}")]
    UnknownTopic { id: String },

    #[error("Unknown phase: {name}")]
    UnknownPhase { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Generation,
    Credentials,
    Input,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Generation => write!(f, "Generation"),
            Self::Credentials => write!(f, "Credentials"),
            Self::Input => write!(f, "Input"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => format!("Configuration file has invalid format: {reason}"),
            Self::MissingRequired(key) => format!("Required configuration '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files are TOML with [defaults], [llm] and [video] sections."
                    .to_string(),
            ),
            Self::MissingRequired(_) => None,
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has range or format requirements."
            )),
            Self::DiscoveryFailed { .. } => Some(
                "archpro searches for .archpro/config.toml from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of the configuration file".to_string(),
                "Run 'archpro config' to see the effective configuration".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!("Set '{key}' in .archpro/config.toml")],
            Self::InvalidValue { key, .. } => vec![
                format!("Correct the value of '{key}'"),
                "Run 'archpro doctor' to validate the setup".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Pass an explicit file with --config <PATH>".to_string(),
                "Check directory permissions".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Failures of a single Generation Capability call.
///
/// Text, diagram and cover failures are absorbed by the fallback layer;
/// video failures propagate to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport-level failure (HTTP connectivity, malformed response body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Model, operation or credential entity unknown to the provider (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Provider answered but produced no usable content
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Long-running job finished with an error payload
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Long-running job did not finish within the poll budget
    #[error("Job still running after {attempts} polls ({waited:?})")]
    PollBudgetExhausted { attempts: u32, waited: Duration },

    /// No usable credential; live generation not possible
    #[error("Live generation unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported operation for this provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl GenerationError {
    /// Whether the failure carries the provider's entity-not-found signal.
    ///
    /// Callers use this to decide whether to re-open credential selection.
    #[must_use]
    pub fn is_entity_not_found(&self) -> bool {
        self.to_string().contains(ENTITY_NOT_FOUND_SIGNAL)
    }

    /// Whether the failure is a timeout of any kind.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::PollBudgetExhausted { .. }
        )
    }
}

impl UserFriendlyError for GenerationError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Generation service unreachable: {msg}"),
            Self::ProviderAuth(msg) => format!("Generation service rejected the API key: {msg}"),
            Self::ProviderQuota(msg) => format!("Generation quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("Generation service outage: {msg}"),
            Self::NotFound(msg) => format!("Generation resource not found: {msg}"),
            Self::Timeout { duration } => format!("Generation timed out after {duration:?}"),
            Self::EmptyResponse(msg) => format!("Generation returned no content: {msg}"),
            Self::JobFailed(msg) => format!("Generation job failed: {msg}"),
            Self::PollBudgetExhausted { attempts, waited } => format!(
                "Generation job still running after {attempts} status checks ({waited:?})"
            ),
            Self::Unavailable(msg) => format!("Live generation unavailable: {msg}"),
            Self::Misconfiguration(msg) => format!("Generation backend misconfigured: {msg}"),
            Self::Unsupported(msg) => format!("Generation feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ProviderAuth(_) | Self::Unavailable(_) => Some(
                "Live generation needs a valid API key; without one archpro serves demo content."
                    .to_string(),
            ),
            Self::NotFound(_) if self.is_entity_not_found() => Some(
                "The provider did not recognize the selected key or project.".to_string(),
            ),
            Self::PollBudgetExhausted { .. } => Some(
                "Video jobs are polled at a fixed interval up to a maximum number of checks."
                    .to_string(),
            ),
            Self::ProviderOutage(_) => {
                Some("Provider outages are temporary service disruptions.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ProviderAuth(_) | Self::Unavailable(_) => vec![
                "Export the API key in the variable named by llm.gemini.api_key_env".to_string(),
                "In a session, choose a key with 'key <value>'".to_string(),
            ],
            Self::NotFound(_) if self.is_entity_not_found() => vec![
                "Select a different API key with access to video generation".to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) | Self::Transport(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Try running with --verbose to see detailed error information".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase llm.gemini.request_timeout in configuration".to_string(),
            ],
            Self::PollBudgetExhausted { .. } => vec![
                "Increase video.max_polls or --max-polls".to_string(),
            ],
            Self::Misconfiguration(_) => vec![
                "Run 'archpro doctor' to validate the setup".to_string(),
            ],
            Self::EmptyResponse(_) | Self::JobFailed(_) | Self::NotFound(_) => {
                vec!["Try again; generated content is not deterministic".to_string()]
            }
            Self::Unsupported(_) => vec![
                "Switch to the gemini provider for live generation".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) | Self::Unavailable(_) => ErrorCategory::Credentials,
            Self::NotFound(_) if self.is_entity_not_found() => ErrorCategory::Credentials,
            Self::Misconfiguration(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::Generation,
        }
    }
}

impl UserFriendlyError for ArchProError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Generation(err) => err.user_message(),
            Self::UnknownTopic { id } => format!("No topic with id '{id}'"),
            Self::UnknownPhase { name } => format!("'{name}' is not a content phase"),
            Self::Io(err) => format!("File system error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Generation(err) => err.context(),
            Self::UnknownTopic { .. } => {
                Some("Topics come from the built-in catalog.".to_string())
            }
            Self::UnknownPhase { .. } => Some(
                "Phases: requirements, hld, data-model, lld, machine-coding, deep-dives, follow-ups."
                    .to_string(),
            ),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Generation(err) => err.suggestions(),
            Self::UnknownTopic { .. } => {
                vec!["Run 'archpro topics' to list available topics".to_string()]
            }
            Self::UnknownPhase { .. } => {
                vec!["Use a phase slug such as 'hld' or 'deep-dives'".to_string()]
            }
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Generation(err) => err.category(),
            Self::UnknownTopic { .. } | Self::UnknownPhase { .. } => ErrorCategory::Input,
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl ArchProError {
    /// Message with context and suggestions, redacted for terminal output.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        redact_error_message(&output)
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) | Self::UnknownTopic { .. } | Self::UnknownPhase { .. } => {
                ExitCode::CLI_ARGS
            }
            Self::Generation(err) if err.is_timeout() => ExitCode::GENERATION_TIMEOUT,
            Self::Generation(err) if err.category() == ErrorCategory::Credentials => {
                ExitCode::CREDENTIAL_REJECTED
            }
            Self::Generation(_) => ExitCode::GENERATION_FAILURE,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn test_entity_not_found_detection() {
        let err = GenerationError::NotFound("Requested entity was not found.".to_string());
        assert!(err.is_entity_not_found());
        let err = GenerationError::JobFailed("Requested entity was not found.".to_string());
        assert!(err.is_entity_not_found());
        let err = GenerationError::NotFound("model gemini-x".to_string());
        assert!(!err.is_entity_not_found());
    }

    #[test]
    fn test_exit_code_mapping() {
        let cases = [
            (
                ArchProError::Config(ConfigError::MissingRequired("llm".into())),
                ExitCode::CLI_ARGS,
            ),
            (
                ArchProError::UnknownPhase { name: "x".into() },
                ExitCode::CLI_ARGS,
            ),
            (
                ArchProError::Generation(GenerationError::PollBudgetExhausted {
                    attempts: 3,
                    waited: Duration::from_secs(30),
                }),
                ExitCode::GENERATION_TIMEOUT,
            ),
            (
                ArchProError::Generation(GenerationError::NotFound(
                    "Requested entity was not found.".into(),
                )),
                ExitCode::CREDENTIAL_REJECTED,
            ),
            (
                ArchProError::Generation(GenerationError::JobFailed("boom".into())),
                ExitCode::GENERATION_FAILURE,
            ),
            (
                ArchProError::Io(std::io::Error::other("disk")),
                ExitCode::INTERNAL,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.to_exit_code(), code, "{err}");
        }
    }

    #[test]
    fn test_display_for_user_redacts() {
        let err = ArchProError::Generation(GenerationError::Transport(
            "GET https://x/files/v?alt=media&key=AIzaTopSecret failed".into(),
        ));
        let shown = err.display_for_user();
        assert!(shown.starts_with("Error: Generation service unreachable"));
        assert!(!shown.contains("AIzaTopSecret"));
        assert!(shown.contains("Suggestions:"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            GenerationError::ProviderAuth("401".into()).category(),
            ErrorCategory::Credentials
        );
        assert_eq!(
            ArchProError::UnknownTopic { id: "x".into() }.category(),
            ErrorCategory::Input
        );
        assert_eq!(ErrorCategory::FileSystem.to_string(), "File System");
    }
}
