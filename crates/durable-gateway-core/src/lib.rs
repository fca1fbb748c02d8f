//! Durable Gateway Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/gRPC
//! - HTTP clients
//! - Runtime specifics
//!
//! The orchestration engine and task-hub resolution are expressed as traits
//! so the gateway can be exercised against test doubles.

pub mod client;
pub mod descriptor;
pub mod error;
pub mod ids;

// Re-export commonly used types
pub use client::{ClientResolver, OrchestrationClient};
pub use descriptor::{BaseUriSet, InstanceDescriptor};
pub use error::{EngineError, GatewayError, ResolutionError};
pub use ids::{InstanceId, TaskHubName};
