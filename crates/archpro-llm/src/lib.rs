//! Generation capability abstraction
//!
//! All backends implement [`GenerationCapability`], so the orchestration
//! layer works with any provider without knowing its wire format. The value
//! handed to the orchestrator is always a [`FallbackCapability`], which
//! decides per call between live generation and the static fallback store.

mod fallback;
mod gemini_backend;
pub(crate) mod http_client;
pub mod prompts;
mod types;
pub mod video;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use fallback::{
    DEMO_DIAGRAM, EMPTY_DIAGRAM, FAILED_DIAGRAM, FallbackCapability, demo_section,
    placeholder_cover,
};
pub use gemini_backend::GeminiBackend;
pub use types::{GenerationCapability, ImageRef, VideoRef};
pub use video::{JobStatus, PollBudget, VideoJob, VideoOperations};
pub use archpro_utils::error::GenerationError;

use std::sync::Arc;

use archpro_config::{Config, CredentialSource, ProviderKind};
use archpro_content::StaticFallbackStore;

/// Build the capability for the configured provider.
///
/// `credentials` is consulted on every call; pass a
/// `SelectedCredentialSource` to allow choosing a key at runtime.
///
/// # Errors
///
/// Returns `GenerationError::Misconfiguration` if the provider name is invalid
/// or the HTTP client cannot be constructed.
pub fn from_config(
    config: &Config,
    credentials: Arc<dyn CredentialSource>,
    store: Arc<StaticFallbackStore>,
) -> Result<Arc<dyn GenerationCapability>, GenerationError> {
    let kind = config
        .provider_kind()
        .map_err(|e| GenerationError::Misconfiguration(e.to_string()))?;

    let live: Option<Arc<dyn GenerationCapability>> = match kind {
        ProviderKind::Gemini => {
            let budget = PollBudget::new(config.poll_interval(), config.max_polls());
            let backend = GeminiBackend::new(config.gemini(), credentials.clone(), budget)?;
            Some(Arc::new(backend))
        }
        ProviderKind::Static => None,
    };

    tracing::debug!(
        provider = kind.as_str(),
        credentials = %credentials.describe(),
        "Generation capability constructed"
    );
    Ok(Arc::new(FallbackCapability::new(live, credentials, store)))
}
