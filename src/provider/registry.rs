//! Registry mapping each mode to its provider

use super::{canned_providers, LoggingProvider, ProviderError, RemoteProvider, TransformProvider};
use crate::config::AssistantConfig;
use crate::model::{Mode, TransformationRequest};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Default per-dispatch deadline
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry of transformation providers, one per mode
pub struct ProviderRegistry {
    providers: HashMap<Mode, Arc<dyn TransformProvider>>,
    timeout: Duration,
}

impl ProviderRegistry {
    /// Create an empty registry. Every dispatch fails as unavailable until a
    /// provider is registered.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: HashMap::new(),
            timeout,
        }
    }

    /// Registry serving every mode from the built-in canned tables
    pub fn canned(timeout: Duration) -> Self {
        let mut registry = Self::new(timeout);
        for (mode, provider) in canned_providers() {
            registry.register(mode, provider);
        }
        registry
    }

    /// Build the registry described by the configuration: a remote endpoint
    /// for every mode when one is configured, canned tables otherwise.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, reqwest::Error> {
        let Some(url) = &config.provider_url else {
            return Ok(Self::canned(config.dispatch_timeout));
        };

        let mut registry = Self::new(config.dispatch_timeout);
        let remote: Arc<dyn TransformProvider> =
            Arc::new(RemoteProvider::new(url.clone(), config.dispatch_timeout)?);
        for mode in Mode::ALL {
            registry.register(mode, remote.clone());
        }
        Ok(registry)
    }

    /// Register (or replace) the provider for `mode`
    pub fn register(&mut self, mode: Mode, provider: Arc<dyn TransformProvider>) {
        self.providers
            .insert(mode, Arc::new(LoggingProvider::new(provider)));
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with_provider(mut self, mode: Mode, provider: Arc<dyn TransformProvider>) -> Self {
        self.register(mode, provider);
        self
    }

    pub fn get(&self, mode: Mode) -> Option<Arc<dyn TransformProvider>> {
        self.providers.get(&mode).cloned()
    }

    /// Modes with a registered provider, in declaration order
    pub fn modes(&self) -> Vec<Mode> {
        Mode::ALL
            .into_iter()
            .filter(|m| self.providers.contains_key(m))
            .collect()
    }

    /// Run the request's input through the provider for its mode, bounded by
    /// the registry timeout.
    pub async fn dispatch(&self, request: &TransformationRequest) -> Result<String, ProviderError> {
        let mode = request.mode();
        let span = tracing::info_span!("dispatch", request_id = %request.id, mode = %mode);

        async {
            let provider = self
                .get(mode)
                .ok_or_else(|| ProviderError::unavailable(format!("no provider for {mode}")))?;

            let output = tokio::time::timeout(self.timeout, provider.transform(&request.input))
                .await
                .map_err(|_| ProviderError::Timeout)??;

            if output.trim().is_empty() {
                return Err(ProviderError::unavailable("provider returned empty output"));
            }
            Ok::<_, ProviderError>(output)
        }
        .instrument(span)
        .await
    }
}
