//! Gateway error taxonomy.

use thiserror::Error;

use crate::ids::TaskHubName;

/// Errors surfaced to callers of the gateway.
///
/// Every variant maps onto exactly one RPC status code; the gateway never
/// retries on any of them.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed input, rejected before any external call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The task hub could not be resolved to a client.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The orchestration engine could not be reached.
    #[error("Orchestration engine unavailable: {0}")]
    Unavailable(String),

    /// The engine does not know the requested orchestrator function.
    #[error("Orchestrator function not found: {0}")]
    NotFound(String),

    /// The engine answered with something the gateway cannot interpret.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Task hub resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The named task hub is not configured on this host.
    #[error("Task hub not configured: {0}")]
    UnknownTaskHub(TaskHubName),
}

/// Outcome of a failed engine-side start call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Transport failure, timeout or the engine reported itself unavailable.
    #[error("engine unreachable: {0}")]
    Unavailable(String),

    /// The engine has no orchestrator registered under this name.
    #[error("function '{0}' not found")]
    FunctionNotFound(String),

    /// Response status or body did not match the expected shape.
    #[error("unexpected engine response: {0}")]
    UnexpectedResponse(String),
}

impl From<EngineError> for GatewayError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(msg) => GatewayError::Unavailable(msg),
            EngineError::FunctionNotFound(name) => GatewayError::NotFound(name),
            EngineError::UnexpectedResponse(msg) => GatewayError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        assert!(matches!(
            GatewayError::from(EngineError::Unavailable("refused".into())),
            GatewayError::Unavailable(_)
        ));
        assert!(matches!(
            GatewayError::from(EngineError::FunctionNotFound("Hello".into())),
            GatewayError::NotFound(name) if name == "Hello"
        ));
        assert!(matches!(
            GatewayError::from(EngineError::UnexpectedResponse("no id".into())),
            GatewayError::Internal(_)
        ));
    }

    #[test]
    fn test_resolution_error_display() {
        let err: GatewayError =
            ResolutionError::UnknownTaskHub(TaskHubName::new("Missing")).into();
        assert_eq!(err.to_string(), "Task hub not configured: Missing");
    }
}
