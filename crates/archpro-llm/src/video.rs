//! Long-running video jobs
//!
//! A job is submitted once and then polled at a fixed interval until it
//! reports completion, reports a failure, or the poll budget runs out.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use archpro_config::{DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL_SECS};
use archpro_utils::error::GenerationError;

/// Polling cadence and limit for a video job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollBudget {
    #[must_use]
    pub const fn new(interval: Duration, max_polls: u32) -> Self {
        Self {
            interval,
            max_polls,
        }
    }

    /// Total time spent waiting after `polls` status checks.
    #[must_use]
    pub fn waited(&self, polls: u32) -> Duration {
        self.interval * polls
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            DEFAULT_MAX_POLLS,
        )
    }
}

/// Status reported by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Done { uri: Option<String> },
    Failed { message: String },
}

/// Client-side view of a video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoJob {
    Submitted { operation: String },
    Polling { operation: String, polls: u32 },
    Done { uri: String },
    Failed { error: GenerationError },
}

impl VideoJob {
    /// Advance on one poll result.
    #[must_use]
    pub fn on_status(self, status: JobStatus) -> Self {
        let (operation, polls) = match self {
            Self::Submitted { operation } => (operation, 1),
            Self::Polling { operation, polls } => (operation, polls + 1),
            terminal => return terminal,
        };

        match status {
            JobStatus::Pending => Self::Polling { operation, polls },
            JobStatus::Done { uri: Some(uri) } if !uri.trim().is_empty() => Self::Done { uri },
            JobStatus::Done { .. } => Self::Failed {
                error: GenerationError::EmptyResponse(format!(
                    "video job {operation} finished without a download link"
                )),
            },
            JobStatus::Failed { message } => Self::Failed {
                error: GenerationError::JobFailed(message),
            },
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }

    #[must_use]
    pub fn polls(&self) -> u32 {
        match self {
            Self::Polling { polls, .. } => *polls,
            _ => 0,
        }
    }
}

/// Provider operations behind a video job.
#[async_trait]
pub trait VideoOperations: Send + Sync {
    /// Start a job; returns the provider's operation handle.
    async fn submit(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn poll(&self, operation: &str) -> Result<JobStatus, GenerationError>;
}

/// Submit and wait, returning the raw (un-keyed) download URI.
///
/// Each poll is preceded by one interval of sleep. Transport failures while
/// polling end the job.
pub async fn run_video_job<O>(
    ops: &O,
    prompt: &str,
    budget: PollBudget,
) -> Result<String, GenerationError>
where
    O: VideoOperations + ?Sized,
{
    let operation = ops.submit(prompt).await?;
    debug!(operation = %operation, "Video job submitted");

    let mut job = VideoJob::Submitted { operation };
    let mut polls = 0;

    while polls < budget.max_polls {
        tokio::time::sleep(budget.interval).await;

        let operation = match &job {
            VideoJob::Submitted { operation } | VideoJob::Polling { operation, .. } => {
                operation.clone()
            }
            VideoJob::Done { .. } | VideoJob::Failed { .. } => break,
        };

        let status = ops.poll(&operation).await?;
        polls += 1;
        job = job.on_status(status);
        debug!(operation = %operation, polls = polls, "Video job polled");

        match job {
            VideoJob::Done { uri } => return Ok(uri),
            VideoJob::Failed { error } => return Err(error),
            _ => {}
        }
    }

    Err(GenerationError::PollBudgetExhausted {
        attempts: polls,
        waited: budget.waited(polls),
    })
}
