//! In-memory test doubles for the orchestration engine seams.
//!
//! [`FakeEngine`] records every start call it receives and answers with a
//! configurable outcome; [`FakeEngine::resolver`] exposes it behind a
//! [`ClientResolver`] limited to a given set of task hubs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use durable_gateway_core::{
    ClientResolver, EngineError, InstanceId, OrchestrationClient, ResolutionError, TaskHubName,
};

/// What the fake engine answers to a start call.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// Allocate a fresh random instance id.
    Allocate,
    /// Return this id verbatim.
    ReturnId(String),
    /// Fail with this error.
    Fail(EngineError),
}

/// A start call observed by the fake engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCall {
    pub task_hub: TaskHubName,
    pub function_name: String,
    pub instance_id: Option<InstanceId>,
    pub input: Option<String>,
    /// Id handed back to the caller, if the call succeeded.
    pub assigned: Option<InstanceId>,
}

struct FakeEngineInner {
    outcome: FakeOutcome,
    delay: Option<Duration>,
    calls: Mutex<Vec<StartCall>>,
}

/// Shared, cloneable fake orchestration engine.
#[derive(Clone)]
pub struct FakeEngine {
    inner: Arc<FakeEngineInner>,
}

impl FakeEngine {
    pub fn new(outcome: FakeOutcome) -> Self {
        Self::with_delay(outcome, None)
    }

    /// Engine that allocates a new id per call.
    pub fn allocating() -> Self {
        Self::new(FakeOutcome::Allocate)
    }

    /// Engine that fails every call with `err`.
    pub fn failing(err: EngineError) -> Self {
        Self::new(FakeOutcome::Fail(err))
    }

    /// Engine that sleeps for `delay` before answering.
    pub fn with_delay(outcome: FakeOutcome, delay: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(FakeEngineInner {
                outcome,
                delay,
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Resolver that knows only `task_hubs`.
    pub fn resolver<I, T>(&self, task_hubs: I) -> FakeResolver
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskHubName>,
    {
        FakeResolver {
            engine: self.clone(),
            task_hubs: task_hubs.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of start calls received.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Snapshot of all start calls received.
    pub fn calls(&self) -> Vec<StartCall> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<StartCall>> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// [`ClientResolver`] backed by a [`FakeEngine`].
pub struct FakeResolver {
    engine: FakeEngine,
    task_hubs: HashSet<TaskHubName>,
}

impl ClientResolver for FakeResolver {
    fn resolve(
        &self,
        task_hub: &TaskHubName,
    ) -> Result<Box<dyn OrchestrationClient>, ResolutionError> {
        if !self.task_hubs.contains(task_hub) {
            return Err(ResolutionError::UnknownTaskHub(task_hub.clone()));
        }

        Ok(Box::new(FakeClient {
            engine: self.engine.clone(),
            task_hub: task_hub.clone(),
        }))
    }
}

struct FakeClient {
    engine: FakeEngine,
    task_hub: TaskHubName,
}

#[async_trait]
impl OrchestrationClient for FakeClient {
    async fn start_new(
        &self,
        function_name: &str,
        instance_id: Option<&InstanceId>,
        input: Option<&str>,
    ) -> Result<InstanceId, EngineError> {
        let result = match &self.engine.inner.outcome {
            FakeOutcome::Allocate => Ok(InstanceId::new(Uuid::new_v4().simple().to_string())),
            FakeOutcome::ReturnId(id) => Ok(InstanceId::new(id.clone())),
            FakeOutcome::Fail(err) => Err(err.clone()),
        };

        self.engine.lock_calls().push(StartCall {
            task_hub: self.task_hub.clone(),
            function_name: function_name.to_string(),
            instance_id: instance_id.cloned(),
            input: input.map(str::to_owned),
            assigned: result.as_ref().ok().cloned(),
        });

        if let Some(delay) = self.engine.inner.delay {
            tokio::time::sleep(delay).await;
        }

        result
    }
}
