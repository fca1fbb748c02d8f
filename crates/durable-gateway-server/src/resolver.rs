//! Task hub → orchestration client resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use durable_gateway_core::{ClientResolver, OrchestrationClient, ResolutionError, TaskHubName};

use crate::config::ConfigError;
use crate::engine::HttpOrchestrationClient;

/// Resolver over a fixed set of task hubs known at startup.
///
/// Every call to [`ClientResolver::resolve`] hands out a fresh client; only
/// the pooled `reqwest::Client` is shared between them.
pub struct StaticClientResolver {
    http: reqwest::Client,
    hubs: HashMap<TaskHubName, Arc<str>>,
}

impl StaticClientResolver {
    /// Build a resolver with its own HTTP client using `engine_timeout`.
    pub fn new(
        hubs: impl IntoIterator<Item = (TaskHubName, String)>,
        engine_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .connect_timeout(engine_timeout)
            .timeout(engine_timeout)
            .build()?;
        Ok(Self::with_client(http, hubs))
    }

    /// Build a resolver around an existing HTTP client.
    pub fn with_client(
        http: reqwest::Client,
        hubs: impl IntoIterator<Item = (TaskHubName, String)>,
    ) -> Self {
        Self {
            http,
            hubs: hubs
                .into_iter()
                .map(|(name, template)| (name, Arc::from(template)))
                .collect(),
        }
    }

    /// Configured task hub names.
    pub fn task_hubs(&self) -> impl Iterator<Item = &TaskHubName> {
        self.hubs.keys()
    }
}

impl ClientResolver for StaticClientResolver {
    fn resolve(
        &self,
        task_hub: &TaskHubName,
    ) -> Result<Box<dyn OrchestrationClient>, ResolutionError> {
        let template = self
            .hubs
            .get(task_hub)
            .ok_or_else(|| ResolutionError::UnknownTaskHub(task_hub.clone()))?;

        Ok(Box::new(HttpOrchestrationClient::new(
            self.http.clone(),
            task_hub.clone(),
            template.clone(),
        )))
    }
}
