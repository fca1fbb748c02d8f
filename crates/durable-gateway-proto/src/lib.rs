//! Generated gRPC code and converters for the durable gateway.
//!
//! This crate contains:
//! - Generated protobuf message types
//! - Generated gRPC service stubs (client and server)
//! - Converters between proto types and domain types

pub mod convert;

/// Generated protobuf types and services.
pub mod pb {
    // The proto package is `gRPCChannel` for compatibility with existing callers
    tonic::include_proto!("g_rpc_channel");
}

// Re-export commonly used types
pub use pb::durable_task_service_client::DurableTaskServiceClient;
pub use pb::durable_task_service_server::{DurableTaskService, DurableTaskServiceServer};
