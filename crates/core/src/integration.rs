//! Integration plumbing between the host client and device-mode destinations.
//!
//! The host owns an [`IntegrationRegistry`] mapping destination keys to
//! [`IntegrationFactory`] constructors. When a destination is enabled, the
//! host asks the registry to build an [`Integration`] from the destination's
//! raw configuration and then feeds it events serially.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::HostConfig;
use crate::error::{IntegrationError, IntegrationResult};
use crate::types::GenericEvent;

/// A device-mode destination. Entry points never fail: errors are logged
/// inside the integration so analytics cannot break the host application.
pub trait Integration: Send {
    /// Translate and forward a single host event.
    fn dump(&mut self, event: &GenericEvent);

    /// Forget the current user.
    fn reset(&mut self);

    /// Push anything the vendor SDK has queued.
    fn flush(&mut self);
}

/// The pieces of host client state an integration may read.
pub trait HostClient: Send + Sync {
    /// User id the host has already persisted, if any.
    fn user_id(&self) -> Option<String>;
}

/// Host client with no persisted identity.
pub struct AnonymousClient;

impl HostClient for AnonymousClient {
    fn user_id(&self) -> Option<String> {
        None
    }
}

/// Constructor for one kind of integration.
pub trait IntegrationFactory: Send + Sync {
    /// Destination key as it appears in the host's server-side config.
    fn key(&self) -> &str;

    fn create(
        &self,
        config: &serde_json::Value,
        client: Arc<dyn HostClient>,
        host_config: &HostConfig,
    ) -> IntegrationResult<Box<dyn Integration>>;
}

/// Destination key → factory lookup held by the host.
#[derive(Default)]
pub struct IntegrationRegistry {
    factories: HashMap<String, Arc<dyn IntegrationFactory>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its key. A later registration replaces an
    /// earlier one with the same key.
    pub fn register(&mut self, factory: Arc<dyn IntegrationFactory>) {
        let key = factory.key().to_string();
        if self.factories.insert(key.clone(), factory).is_some() {
            warn!(key = %key, "integration factory replaced");
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn IntegrationFactory>) -> Self {
        self.register(factory);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Build the integration registered under `key`.
    pub fn create(
        &self,
        key: &str,
        config: &serde_json::Value,
        client: Arc<dyn HostClient>,
        host_config: &HostConfig,
    ) -> IntegrationResult<Box<dyn Integration>> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| IntegrationError::UnknownIntegration(key.to_string()))?;

        let integration = factory.create(config, client, host_config)?;
        info!(key = %key, "integration created");
        Ok(integration)
    }
}
