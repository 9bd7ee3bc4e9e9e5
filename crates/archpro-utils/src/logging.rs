//! Logging setup and structured generation events
//!
//! Logs go to stderr so that rendered Markdown and JSON on stdout stay
//! pipeable. Every error string passes through the redactor first.

use std::time::Duration;
use tracing::{Level, debug, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::redaction::redact_error_message;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects between
/// `archpro=debug` with targets and span close events, and a compact
/// `warn` level.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("archpro=debug,info")
            } else {
                EnvFilter::try_new("archpro=warn,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one generation call.
///
/// `artifact` is one of `section`, `diagram`, `cover`, `video`.
#[must_use]
pub fn generation_span(topic_id: &str, artifact: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "generation",
        topic_id = %topic_id,
        artifact = %artifact,
    )
}

pub fn log_generation_start(topic_id: &str, artifact: &str, provider: &str) {
    debug!(
        topic_id = %topic_id,
        artifact = %artifact,
        provider = %provider,
        "Starting generation"
    );
}

pub fn log_generation_complete(topic_id: &str, artifact: &str, duration: Duration) {
    info!(
        topic_id = %topic_id,
        artifact = %artifact,
        duration_ms = duration.as_millis() as u64,
        "Generation completed"
    );
}

/// Log that a generation was served from fallback content.
///
/// `source` is `static` (store entry) or `placeholder`.
pub fn log_generation_fallback(topic_id: &str, artifact: &str, source: &str, cause: &str) {
    let cause = redact_error_message(cause);
    warn!(
        topic_id = %topic_id,
        artifact = %artifact,
        source = %source,
        cause = %cause,
        "Serving fallback content"
    );
}

/// Log a surfaced generation failure. The error text is redacted.
pub fn log_generation_error(topic_id: &str, artifact: &str, error_message: &str) {
    let sanitized = redact_error_message(error_message);
    error!(
        topic_id = %topic_id,
        artifact = %artifact,
        error = %sanitized,
        "Generation failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_do_not_panic_without_subscriber() {
        let span = generation_span("uber", "section");
        let _guard = span.enter();
        log_generation_start("uber", "section", "gemini");
        log_generation_complete("uber", "section", Duration::from_millis(12));
        log_generation_fallback("uber", "diagram", "static", "Provider outage: 503");
        log_generation_error("uber", "video", "key=AIzaSecretValue rejected");
    }

    #[test]
    fn test_init_tracing_twice_reports_error() {
        // The first call may lose the race with another test's subscriber.
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }
}
