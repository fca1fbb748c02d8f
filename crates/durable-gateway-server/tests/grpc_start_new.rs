//! End-to-end StartNew over a loopback gRPC channel.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tonic::transport::Channel;
use tonic::Code;

use durable_gateway_core::{BaseUriSet, EngineError, TaskHubName};
use durable_gateway_proto::pb::NewDurableTaskRequest;
use durable_gateway_proto::DurableTaskServiceClient;
use durable_gateway_server::testing::{FakeEngine, FakeOutcome};
use durable_gateway_server::{HostConfig, ServiceHost, TransportSecurity, TriggerService};

const HUB: &str = "DurableTask01";

fn host_for(engine: &FakeEngine, hubs: &[&str]) -> ServiceHost {
    host_with_timeout(engine, hubs, Some(Duration::from_secs(5)))
}

fn host_with_timeout(
    engine: &FakeEngine,
    hubs: &[&str],
    request_timeout: Option<Duration>,
) -> ServiceHost {
    let service = TriggerService::new(
        Arc::new(engine.resolver(hubs.iter().copied())),
        TaskHubName::new(HUB),
        BaseUriSet::uniform("https://gateway.test/runtime/webhooks/durabletask"),
    );

    ServiceHost::new(
        HostConfig {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            transport: TransportSecurity::Insecure,
            request_timeout,
        },
        service,
    )
}

async fn client(addr: SocketAddr) -> DurableTaskServiceClient<Channel> {
    DurableTaskServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("connect to gateway")
}

fn request(function_name: &str) -> NewDurableTaskRequest {
    NewDurableTaskRequest {
        function_name: function_name.to_string(),
    }
}

#[tokio::test]
async fn start_new_returns_engine_assigned_descriptor() {
    let engine = FakeEngine::new(FakeOutcome::ReturnId("abc123".to_string()));
    let host = host_for(&engine, &[HUB]);
    let addr = host.start().await.unwrap();

    let response = client(addr)
        .await
        .start_new(request("DurableFunctionsOrchestratorJS"))
        .await
        .unwrap()
        .into_inner();

    let base = "https://gateway.test/runtime/webhooks/durabletask";
    assert_eq!(response.id, "abc123");
    assert_eq!(response.status_query_get_uri, format!("{base}/Status/abc123"));
    assert_eq!(response.send_event_post_uri, format!("{base}/Event/abc123"));
    assert_eq!(response.terminate_post_uri, format!("{base}/terminate/abc123"));
    assert_eq!(response.rewind_post_uri, format!("{base}/Rewind/abc123"));
    assert_eq!(response.purge_history_delete_uri, format!("{base}/Delete/abc123"));

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "DurableFunctionsOrchestratorJS");

    host.stop().await.unwrap();
}

#[tokio::test]
async fn error_statuses_reach_the_caller() {
    let engine = FakeEngine::failing(EngineError::Unavailable("connection refused".into()));
    let host = host_for(&engine, &[HUB]);
    let addr = host.start().await.unwrap();
    let mut client = client(addr).await;

    let status = client.start_new(request("")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(engine.call_count(), 0);

    let status = client.start_new(request("Hello")).await.unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    assert_eq!(engine.call_count(), 1);

    drop(client);
    host.stop().await.unwrap();
}

#[tokio::test]
async fn request_timeout_cancels_slow_engine_call() {
    let engine = FakeEngine::with_delay(FakeOutcome::Allocate, Some(Duration::from_secs(3)));
    let host = host_with_timeout(&engine, &[HUB], Some(Duration::from_millis(100)));
    let addr = host.start().await.unwrap();
    let mut client = client(addr).await;

    let started = Instant::now();
    let status = client.start_new(request("Slow")).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(status.code(), Code::Cancelled | Code::DeadlineExceeded),
        "unexpected status {status:?}"
    );
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
    assert_eq!(engine.call_count(), 1);

    drop(client);
    tokio::time::timeout(Duration::from_secs(1), host.stop())
        .await
        .expect("stop does not wait for the abandoned engine call")
        .unwrap();
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn unconfigured_hub_is_failed_precondition() {
    let engine = FakeEngine::allocating();
    let host = host_for(&engine, &["SomeOtherHub"]);
    let addr = host.start().await.unwrap();

    let status = client(addr)
        .await
        .start_new(request("Hello"))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::FailedPrecondition);
    assert_eq!(engine.call_count(), 0);

    host.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_get_their_own_instances() {
    let engine = FakeEngine::with_delay(FakeOutcome::Allocate, Some(Duration::from_millis(10)));
    let host = host_for(&engine, &[HUB]);
    let addr = host.start().await.unwrap();
    let client = client(addr).await;

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let mut client = client.clone();
            tokio::spawn(async move {
                let name = format!("Orchestrator{i}");
                let response = client.start_new(request(&name)).await.unwrap().into_inner();
                (name, response)
            })
        })
        .collect();

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap());
    }

    let calls = engine.calls();
    assert_eq!(calls.len(), 50);

    for (name, response) in responses {
        let call = calls
            .iter()
            .find(|c| c.assigned.as_ref().map(|id| id.as_str()) == Some(response.id.as_str()))
            .expect("response id was assigned by the engine");
        assert_eq!(call.function_name, name);
        assert!(response.status_query_get_uri.ends_with(&format!("/Status/{}", response.id)));
    }

    drop(client);
    host.stop().await.unwrap();
}
