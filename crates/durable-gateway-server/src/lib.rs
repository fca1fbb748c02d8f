//! Durable Gateway Server Library
//!
//! This crate provides the gRPC-facing gateway that starts durable
//! orchestration instances: the trigger service, task hub resolution, the
//! HTTP client for the orchestration engine, and the service host that owns
//! the listener lifecycle.

pub mod config;
pub mod engine;
pub mod host;
pub mod http;
pub mod metrics;
pub mod resolver;
pub mod service;
pub mod testing;

pub use config::{ConfigError, GatewayConfig};
pub use engine::HttpOrchestrationClient;
pub use host::{HostConfig, HostError, ServiceHost, TransportSecurity};
pub use metrics::GatewayMetrics;
pub use resolver::StaticClientResolver;
pub use service::TriggerService;
