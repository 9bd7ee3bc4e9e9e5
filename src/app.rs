//! Process-wide wiring of configuration, credentials, content and the studio.

use std::sync::Arc;

use archpro_config::{Config, CredentialSource, SelectedCredentialSource};
use archpro_content::{StaticFallbackStore, Topic, TopicCatalog};
use archpro_engine::{Session, Studio, TerminalCredentialHook};
use archpro_utils::error::{ArchProError, GenerationError};

/// Everything a command needs, built once per process.
pub struct App {
    pub config: Config,
    /// Environment credential with an optional process-local selection on top
    pub credentials: Arc<SelectedCredentialSource>,
    pub catalog: Arc<TopicCatalog>,
    pub store: Arc<StaticFallbackStore>,
    pub studio: Arc<Studio>,
}

impl App {
    /// Wire the bundled catalog and fallback store.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` for an invalid provider.
    pub fn from_config(config: Config) -> Result<Self, GenerationError> {
        let credentials = Arc::new(SelectedCredentialSource::new(Arc::new(
            config.credential_source(),
        )));
        Self::new(
            config,
            credentials,
            Arc::new(TopicCatalog::builtin()),
            Arc::new(StaticFallbackStore::builtin()),
        )
    }

    /// Wire explicit content sources.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` for an invalid provider.
    pub fn new(
        config: Config,
        credentials: Arc<SelectedCredentialSource>,
        catalog: Arc<TopicCatalog>,
        store: Arc<StaticFallbackStore>,
    ) -> Result<Self, GenerationError> {
        let source: Arc<dyn CredentialSource> = credentials.clone();
        let capability = archpro_llm::from_config(&config, source, store.clone())?;
        Ok(Self {
            config,
            credentials,
            catalog,
            store,
            studio: Arc::new(Studio::new(capability)),
        })
    }

    /// Look up a catalog topic.
    ///
    /// # Errors
    ///
    /// Returns `ArchProError::UnknownTopic` if `id` is not in the catalog.
    pub fn topic(&self, id: &str) -> Result<Topic, ArchProError> {
        self.catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ArchProError::UnknownTopic { id: id.to_string() })
    }

    /// Interactive session sharing this app's studio, with the terminal
    /// credential hook attached.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            self.studio.clone(),
            self.catalog.clone(),
            self.config.view_mode(),
        )
        .with_hook(Arc::new(TerminalCredentialHook::new(
            self.credentials.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_topic() {
        let app = App::from_config(Config::minimal_for_testing()).unwrap();
        assert!(app.topic("uber").is_ok());
        assert!(matches!(
            app.topic("myspace"),
            Err(ArchProError::UnknownTopic { .. })
        ));
    }

    #[test]
    fn test_static_provider_is_not_live() {
        let app = App::from_config(Config::minimal_for_testing()).unwrap();
        assert!(!app.studio.is_live());
        assert_eq!(app.studio.provider_name(), "static");
    }
}
