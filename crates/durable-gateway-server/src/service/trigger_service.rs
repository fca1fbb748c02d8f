//! DurableTaskService implementation: starts orchestration instances.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{info, warn};

use durable_gateway_core::{
    BaseUriSet, ClientResolver, GatewayError, InstanceDescriptor, TaskHubName,
};
use durable_gateway_proto::pb::{NewDurableTaskRequest, NewDurableTaskResponse};
use durable_gateway_proto::{DurableTaskService, DurableTaskServiceServer};

use crate::metrics::GatewayMetrics;
use crate::service::status::to_status;

/// Trigger service: validates a start request, resolves a client for the
/// configured task hub, starts the instance and describes it.
///
/// Holds no per-request state; clones share the resolver, base URIs and
/// metrics.
#[derive(Clone)]
pub struct TriggerService {
    resolver: Arc<dyn ClientResolver>,
    task_hub: TaskHubName,
    base_uris: Arc<BaseUriSet>,
    metrics: Arc<GatewayMetrics>,
}

impl TriggerService {
    /// Create a new TriggerService.
    pub fn new(
        resolver: Arc<dyn ClientResolver>,
        task_hub: TaskHubName,
        base_uris: BaseUriSet,
    ) -> Self {
        Self {
            resolver,
            task_hub,
            base_uris: Arc::new(base_uris),
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    /// Report into an externally owned metrics registry.
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.metrics
    }

    /// Convert into a tonic server.
    pub fn into_server(self) -> DurableTaskServiceServer<Self> {
        DurableTaskServiceServer::new(self)
    }

    /// Start an instance of `function_name` and build its descriptor.
    ///
    /// The engine call is made at most once; failures are returned as-is.
    pub async fn start_instance(
        &self,
        function_name: &str,
    ) -> Result<InstanceDescriptor, GatewayError> {
        if function_name.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "function_name is required".to_string(),
            ));
        }
        // Dot segments are collapsed by URL normalization
        if matches!(function_name, "." | "..") {
            return Err(GatewayError::InvalidArgument(format!(
                "invalid function_name '{function_name}'"
            )));
        }

        let client = self.resolver.resolve(&self.task_hub)?;

        let instance_id = client.start_new(function_name, None, None).await?;
        if instance_id.is_empty() {
            return Err(GatewayError::Internal(
                "engine returned an empty instance id".to_string(),
            ));
        }

        InstanceDescriptor::build(&instance_id, &self.base_uris)
    }
}

#[tonic::async_trait]
impl DurableTaskService for TriggerService {
    async fn start_new(
        &self,
        request: Request<NewDurableTaskRequest>,
    ) -> Result<Response<NewDurableTaskResponse>, Status> {
        let req = request.into_inner();

        info!(
            function_name = %req.function_name,
            task_hub = %self.task_hub,
            "StartNew received"
        );

        let mut guard = CancellationGuard {
            metrics: &self.metrics,
            function_name: &req.function_name,
            task_hub: &self.task_hub,
            armed: true,
        };
        let result = self.start_instance(&req.function_name).await;
        guard.armed = false;

        match result {
            Ok(descriptor) => {
                self.metrics.record_started();
                info!(
                    function_name = %req.function_name,
                    task_hub = %self.task_hub,
                    instance_id = %descriptor.id,
                    "StartNew completed"
                );
                Ok(Response::new(descriptor.into()))
            }
            Err(e) => {
                self.metrics.record_failure(&e);
                warn!(
                    function_name = %req.function_name,
                    task_hub = %self.task_hub,
                    error = %e,
                    "StartNew failed"
                );
                Err(to_status(&e))
            }
        }
    }
}

/// Counts and logs a StartNew whose handler future is dropped before it
/// finishes (deadline expiry or caller disconnect).
struct CancellationGuard<'a> {
    metrics: &'a GatewayMetrics,
    function_name: &'a str,
    task_hub: &'a TaskHubName,
    armed: bool,
}

impl Drop for CancellationGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.metrics.record_cancelled();
        warn!(
            function_name = %self.function_name,
            task_hub = %self.task_hub,
            "StartNew cancelled before completion"
        );
    }
}
