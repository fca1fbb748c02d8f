//! HTTP client for the orchestration engine's instance creation endpoint.
//!
//! The engine exposes a creation URL template such as
//! `http://host/runtime/webhooks/durabletask/orchestrators/{functionName}[/{instanceId}]`.
//! Starting an instance is a POST to the expanded template; the engine
//! answers with the management payload of the new instance, of which only
//! the `id` is consumed here.
//!
//! Every substituted value is percent-encoded, so a function name can only
//! ever occupy its own path segment and never alter the task hub query.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use durable_gateway_core::{EngineError, InstanceId, OrchestrationClient, TaskHubName};

/// Replaced with the orchestrator function name.
pub const FUNCTION_NAME_PLACEHOLDER: &str = "{functionName}";

/// Replaced with `/<id>` when an instance id is supplied, removed otherwise.
pub const INSTANCE_ID_PLACEHOLDER: &str = "[/{instanceId}]";

/// Replaced with the task hub name.
pub const TASK_HUB_PLACEHOLDER: &str = "{taskHub}";

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Body returned by the engine for a created instance.
#[derive(Debug, Deserialize)]
struct CreatedInstance {
    #[serde(default)]
    id: String,
}

/// Orchestration client that talks to the engine over HTTP.
pub struct HttpOrchestrationClient {
    http: reqwest::Client,
    task_hub: TaskHubName,
    creation_url_template: Arc<str>,
}

impl HttpOrchestrationClient {
    /// Create a client bound to `task_hub`.
    pub fn new(
        http: reqwest::Client,
        task_hub: TaskHubName,
        creation_url_template: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            http,
            task_hub,
            creation_url_template: creation_url_template.into(),
        }
    }

    /// Task hub this client is bound to.
    pub fn task_hub(&self) -> &TaskHubName {
        &self.task_hub
    }

    /// Expand the creation URL template.
    ///
    /// Encoded values contain no braces or brackets, so a substituted value
    /// is never matched by a later placeholder.
    pub fn creation_url(&self, function_name: &str, instance_id: Option<&InstanceId>) -> String {
        let instance_segment = match instance_id {
            Some(id) => format!("/{}", encode(id.as_str())),
            None => String::new(),
        };

        self.creation_url_template
            .replace(FUNCTION_NAME_PLACEHOLDER, &encode(function_name))
            .replace(INSTANCE_ID_PLACEHOLDER, &instance_segment)
            .replace(TASK_HUB_PLACEHOLDER, &encode(self.task_hub.as_str()))
    }
}

#[async_trait]
impl OrchestrationClient for HttpOrchestrationClient {
    async fn start_new(
        &self,
        function_name: &str,
        instance_id: Option<&InstanceId>,
        input: Option<&str>,
    ) -> Result<InstanceId, EngineError> {
        let url = self.creation_url(function_name, instance_id);
        debug!(url = %url, task_hub = %self.task_hub, "POST start request");

        let mut request = self.http.post(&url);
        if let Some(input) = input {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(input.to_owned());
        }

        let response = request
            .send()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::FunctionNotFound(function_name.to_string()));
        }
        if is_unavailable(status) {
            return Err(EngineError::Unavailable(format!("engine returned HTTP {status}")));
        }
        if !status.is_success() {
            return Err(EngineError::UnexpectedResponse(format!(
                "engine returned HTTP {status}"
            )));
        }

        let created: CreatedInstance = response
            .json()
            .await
            .map_err(|e| EngineError::UnexpectedResponse(e.to_string()))?;

        if created.id.is_empty() {
            return Err(EngineError::UnexpectedResponse(
                "engine returned an empty instance id".to_string(),
            ));
        }

        Ok(InstanceId::new(created.id))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn is_unavailable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 502..=504)
}
