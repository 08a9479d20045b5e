use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::application::{
    ChatOrchestrator, ConversationRepository, ListConversationsUseCase, UpstreamClient,
    DEFAULT_MODEL,
};
use crate::connector::adapter::{
    Credential, HttpUpstreamClient, InMemoryConversationRepository, MockUpstreamClient,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
use crate::domain::RetryPolicy;

pub struct ContainerConfig {
    pub upstream_url: String,
    /// Header forwarded upstream. Without one, live calls are disabled.
    pub credential: Option<Credential>,
    /// Answer from canned replies instead of calling the upstream.
    pub mock_responses: bool,
    pub default_model: String,
    pub retry_policy: RetryPolicy,
    pub request_timeout: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_BASE_URL.to_string(),
            credential: None,
            mock_responses: false,
            default_model: DEFAULT_MODEL.to_string(),
            retry_policy: RetryPolicy::default(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ContainerConfig {
    /// Live calls need both the flag off and a credential present.
    pub fn uses_mock(&self) -> bool {
        self.mock_responses || self.credential.is_none()
    }
}

pub struct Container {
    store: Arc<dyn ConversationRepository>,
    orchestrator: Arc<ChatOrchestrator>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let store: Arc<dyn ConversationRepository> =
            Arc::new(InMemoryConversationRepository::new());

        let upstream: Arc<dyn UpstreamClient> = if config.uses_mock() {
            if config.mock_responses {
                debug!("Using mock upstream client");
            } else {
                warn!("No upstream credential configured. Falling back to mock responses.");
            }
            Arc::new(MockUpstreamClient::new())
        } else {
            info!("Relaying to upstream at {}", config.upstream_url);
            Arc::new(HttpUpstreamClient::new(
                config.upstream_url.clone(),
                config.credential.clone(),
                config.request_timeout,
            ))
        };

        Ok(Self::with_upstream(config, store, upstream))
    }

    /// Wires an explicit store and upstream, bypassing adapter selection.
    pub fn with_upstream(
        config: ContainerConfig,
        store: Arc<dyn ConversationRepository>,
        upstream: Arc<dyn UpstreamClient>,
    ) -> Self {
        let orchestrator = Arc::new(
            ChatOrchestrator::new(store.clone(), upstream)
                .with_retry_policy(config.retry_policy)
                .with_default_model(config.default_model.clone()),
        );

        Self {
            store,
            orchestrator,
            config,
        }
    }

    pub fn orchestrator(&self) -> Arc<ChatOrchestrator> {
        self.orchestrator.clone()
    }

    pub fn list_use_case(&self) -> ListConversationsUseCase {
        ListConversationsUseCase::new(self.store.clone())
    }

    pub fn upstream_name(&self) -> &str {
        self.orchestrator.upstream_name()
    }

    pub fn upstream_url(&self) -> &str {
        &self.config.upstream_url
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_forces_mock() {
        let container = Container::new(ContainerConfig::default()).unwrap();
        assert_eq!(container.upstream_name(), "mock");
    }

    #[test]
    fn mock_flag_overrides_credential() {
        let config = ContainerConfig {
            credential: Some(Credential::new("x-api-key", "secret")),
            mock_responses: true,
            ..ContainerConfig::default()
        };
        assert!(config.uses_mock());
        assert_eq!(Container::new(config).unwrap().upstream_name(), "mock");
    }

    #[test]
    fn credential_enables_live_client() {
        let config = ContainerConfig {
            credential: Some(Credential::new("x-api-key", "secret")),
            ..ContainerConfig::default()
        };
        assert!(!config.uses_mock());
        assert_eq!(Container::new(config).unwrap().upstream_name(), "http");
    }
}
