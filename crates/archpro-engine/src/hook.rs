//! Credential reselection hook
//!
//! Video generation consults the hook before starting and again after an
//! entity-not-found failure. Without a hook both checks are skipped.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use archpro_config::{CredentialSource, SelectedCredentialSource};

#[async_trait]
pub trait CredentialHook: Send + Sync {
    /// Whether a usable credential has been chosen.
    async fn has_selected_credential(&self) -> bool;

    /// Ask the user to choose a credential.
    async fn open_selection(&self);
}

/// Terminal hook over a [`SelectedCredentialSource`].
///
/// The prompt prints instructions for setting a key, or choosing one with
/// the `key <value>` session command, to stderr and returns without blocking.
pub struct TerminalCredentialHook {
    source: Arc<SelectedCredentialSource>,
    prompts: AtomicUsize,
}

impl TerminalCredentialHook {
    #[must_use]
    pub fn new(source: Arc<SelectedCredentialSource>) -> Self {
        Self {
            source,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Number of times selection was requested.
    #[must_use]
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CredentialHook for TerminalCredentialHook {
    async fn has_selected_credential(&self) -> bool {
        self.source.current().is_some()
    }

    async fn open_selection(&self) {
        self.prompts.fetch_add(1, Ordering::Relaxed);
        eprintln!(
            "An API key with access to video generation is required ({}).\n\
             Set it in the environment, or choose one in `archpro session` with: key <value>",
            self.source.describe()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archpro_config::StaticCredential;

    #[tokio::test]
    async fn test_terminal_hook_tracks_selection() {
        let source = Arc::new(SelectedCredentialSource::new(Arc::new(
            StaticCredential::none(),
        )));
        let hook = TerminalCredentialHook::new(source.clone());
        assert!(!hook.has_selected_credential().await);

        hook.open_selection().await;
        assert_eq!(hook.prompts(), 1);

        assert!(source.select("AIza-selected"));
        assert!(hook.has_selected_credential().await);
    }
}
