//! Capabilities the gateway consumes from the orchestration runtime.

use async_trait::async_trait;

use crate::error::{EngineError, ResolutionError};
use crate::ids::{InstanceId, TaskHubName};

/// A handle bound to one task hub that can issue orchestration commands.
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Start a new instance of `function_name`.
    ///
    /// When `instance_id` is `None` the engine allocates one. `input` is a
    /// JSON document passed to the orchestrator. Returns the id the engine
    /// actually assigned.
    async fn start_new(
        &self,
        function_name: &str,
        instance_id: Option<&InstanceId>,
        input: Option<&str>,
    ) -> Result<InstanceId, EngineError>;
}

/// Produces an [`OrchestrationClient`] for a task hub.
///
/// Resolution is pure lookup: implementations must not perform network I/O
/// here. The returned handle does that when used.
pub trait ClientResolver: Send + Sync {
    fn resolve(&self, task_hub: &TaskHubName)
        -> Result<Box<dyn OrchestrationClient>, ResolutionError>;
}
