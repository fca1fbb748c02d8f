//! Gateway configuration.
//!
//! Read once at startup and immutable for the lifetime of the process.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use durable_gateway_core::{BaseUriSet, TaskHubName};
use thiserror::Error;

use crate::engine::{FUNCTION_NAME_PLACEHOLDER, INSTANCE_ID_PLACEHOLDER, TASK_HUB_PLACEHOLDER};
use crate::host::{HostConfig, TransportSecurity};

/// Creation endpoint of a locally running durable task extension.
pub const DEFAULT_CREATION_URL_TEMPLATE: &str = "http://localhost:7071/runtime/webhooks/durabletask/orchestrators/{functionName}[/{instanceId}]?taskHub={taskHub}";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The default task hub name is empty.
    #[error("task hub name cannot be empty")]
    EmptyTaskHub,

    /// The default task hub has no engine endpoint configured.
    #[error("task hub '{0}' has no engine endpoint configured")]
    UnknownDefaultHub(TaskHubName),

    /// A `NAME=TEMPLATE` hub specification could not be parsed.
    #[error("invalid hub specification '{0}', expected NAME=TEMPLATE")]
    InvalidHubSpec(String),

    /// A creation URL template is unusable.
    #[error("creation URL for task hub '{hub}' is invalid: {reason}")]
    InvalidCreationUrl { hub: TaskHubName, reason: String },

    /// A management base URI is not an absolute http(s) URL.
    #[error("{endpoint} base URI '{uri}' is invalid: {reason}")]
    InvalidBaseUri {
        endpoint: &'static str,
        uri: String,
        reason: String,
    },

    /// The engine HTTP client could not be built.
    #[error("failed to build engine HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// gRPC listen address.
    pub listen_addr: SocketAddr,

    /// Optional listen address for the health/metrics HTTP endpoint.
    pub http_addr: Option<SocketAddr>,

    /// Transport security of the gRPC listener.
    pub transport: TransportSecurity,

    /// Task hub every StartNew request is resolved against.
    pub task_hub: TaskHubName,

    /// Engine creation URL template per task hub.
    pub hubs: HashMap<TaskHubName, String>,

    /// Bases the management URIs are built from.
    pub base_uris: BaseUriSet,

    /// Server-side deadline for a single request (seconds).
    pub request_timeout_secs: u64,

    /// Timeout for calls into the orchestration engine (seconds).
    pub engine_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let task_hub = TaskHubName::new("DurableTask01");
        let hubs = HashMap::from([(task_hub.clone(), DEFAULT_CREATION_URL_TEMPLATE.to_string())]);

        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 1], 50051)),
            http_addr: None,
            transport: TransportSecurity::Tls {
                cert_path: PathBuf::from("certs/server.crt"),
                key_path: PathBuf::from("certs/server.key"),
            },
            task_hub,
            hubs,
            base_uris: BaseUriSet::uniform("https://localhost:7071/runtime/webhooks/durabletask"),
            request_timeout_secs: 30,
            engine_timeout_secs: 10,
        }
    }
}

impl GatewayConfig {
    /// Check the configuration for values that would only fail at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_hub.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyTaskHub);
        }

        if !self.hubs.contains_key(&self.task_hub) {
            return Err(ConfigError::UnknownDefaultHub(self.task_hub.clone()));
        }

        for (hub, template) in &self.hubs {
            validate_creation_url(hub, template)?;
        }

        for (endpoint, uri) in self.base_uris.iter() {
            validate_base_uri(endpoint, uri)?;
        }

        Ok(())
    }

    /// Listener settings for the service host.
    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            listen_addr: self.listen_addr,
            transport: self.transport.clone(),
            request_timeout: match self.request_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    /// Timeout applied to engine calls.
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }
}

/// Parse a `NAME=TEMPLATE` task hub specification.
pub fn parse_hub_spec(spec: &str) -> Result<(TaskHubName, String), ConfigError> {
    let (name, template) = spec
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidHubSpec(spec.to_string()))?;

    let name = name.trim();
    let template = template.trim();
    if name.is_empty() || template.is_empty() {
        return Err(ConfigError::InvalidHubSpec(spec.to_string()));
    }

    Ok((TaskHubName::new(name), template.to_string()))
}

fn validate_creation_url(hub: &TaskHubName, template: &str) -> Result<(), ConfigError> {
    if !template.contains(FUNCTION_NAME_PLACEHOLDER) {
        return Err(ConfigError::InvalidCreationUrl {
            hub: hub.clone(),
            reason: format!("missing {FUNCTION_NAME_PLACEHOLDER} placeholder"),
        });
    }

    // Placeholders are not valid URL syntax; check the shape with sample values
    let sample = template
        .replace(FUNCTION_NAME_PLACEHOLDER, "function")
        .replace(TASK_HUB_PLACEHOLDER, hub.as_str())
        .replace(INSTANCE_ID_PLACEHOLDER, "");
    check_http_url(&sample).map_err(|reason| ConfigError::InvalidCreationUrl {
        hub: hub.clone(),
        reason,
    })
}

fn validate_base_uri(endpoint: &'static str, uri: &str) -> Result<(), ConfigError> {
    check_http_url(uri).map_err(|reason| ConfigError::InvalidBaseUri {
        endpoint,
        uri: uri.to_string(),
        reason,
    })
}

fn check_http_url(candidate: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(candidate).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(config.transport, TransportSecurity::Tls { .. }));
    }

    #[test]
    fn test_parse_hub_spec() {
        let (name, template) =
            parse_hub_spec("Orders=http://engine:7071/orchestrators/{functionName}").unwrap();
        assert_eq!(name.as_str(), "Orders");
        assert_eq!(template, "http://engine:7071/orchestrators/{functionName}");

        // Only the first '=' separates name and template
        let (_, template) =
            parse_hub_spec("Orders=http://engine/orchestrators/{functionName}?taskHub=Orders").unwrap();
        assert!(template.ends_with("?taskHub=Orders"));
    }

    #[test]
    fn test_parse_hub_spec_rejects_malformed() {
        assert!(parse_hub_spec("no-separator").is_err());
        assert!(parse_hub_spec("=http://engine/{functionName}").is_err());
        assert!(parse_hub_spec("Orders=").is_err());
    }

    #[test]
    fn test_default_hub_must_be_configured() {
        let config = GatewayConfig {
            task_hub: TaskHubName::new("Elsewhere"),
            ..GatewayConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownDefaultHub(hub)) if hub.as_str() == "Elsewhere"
        ));
    }

    #[test]
    fn test_empty_task_hub_rejected() {
        let config = GatewayConfig {
            task_hub: TaskHubName::new(""),
            ..GatewayConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTaskHub)));
    }

    #[test]
    fn test_creation_url_requires_function_placeholder() {
        let mut config = GatewayConfig::default();
        config.hubs.insert(
            config.task_hub.clone(),
            "http://engine/orchestrators/fixed".to_string(),
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCreationUrl { .. })
        ));
    }

    #[test]
    fn test_base_uri_must_be_http() {
        let mut config = GatewayConfig::default();
        config.base_uris.rewind = "ftp://host/rewind".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUri { endpoint: "rewind", .. })
        ));

        config.base_uris.rewind = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_request_timeout_disables_deadline() {
        let config = GatewayConfig {
            request_timeout_secs: 0,
            ..GatewayConfig::default()
        };
        assert!(config.host_config().request_timeout.is_none());
    }
}
