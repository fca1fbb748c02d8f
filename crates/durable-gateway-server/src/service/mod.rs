//! gRPC service implementations.

pub mod status;
pub mod trigger_service;

pub use status::to_status;
pub use trigger_service::TriggerService;
