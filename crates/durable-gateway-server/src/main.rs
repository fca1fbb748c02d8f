//! Durable Gateway Server

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use durable_gateway_core::{BaseUriSet, TaskHubName};
use durable_gateway_server::config::{parse_hub_spec, DEFAULT_CREATION_URL_TEMPLATE};
use durable_gateway_server::http::{self, OpsState};
use durable_gateway_server::{
    GatewayConfig, GatewayMetrics, ServiceHost, StaticClientResolver, TransportSecurity,
    TriggerService,
};

/// gRPC gateway that starts durable orchestrations.
#[derive(Parser, Debug)]
#[command(
    name = "durable-gateway",
    about = "gRPC gateway that starts durable orchestrations and returns their management endpoints"
)]
struct Args {
    /// gRPC listen address
    #[arg(long, default_value = "[::1]:50051")]
    listen_addr: SocketAddr,

    /// Health/metrics HTTP listen address (disabled when omitted)
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Task hub StartNew requests are resolved against
    #[arg(long, default_value = "DurableTask01")]
    task_hub: String,

    /// Engine creation URL per task hub, as NAME=TEMPLATE (repeatable)
    #[arg(long = "hub", value_parser = parse_hub_spec)]
    hubs: Vec<(TaskHubName, String)>,

    /// Base URI for every management endpoint
    #[arg(
        long,
        default_value = "https://localhost:7071/runtime/webhooks/durabletask"
    )]
    management_base_uri: String,

    /// Override the base of the status query URI
    #[arg(long)]
    status_base_uri: Option<String>,

    /// Override the base of the send event URI
    #[arg(long)]
    event_base_uri: Option<String>,

    /// Override the base of the terminate URI
    #[arg(long)]
    terminate_base_uri: Option<String>,

    /// Override the base of the rewind URI
    #[arg(long)]
    rewind_base_uri: Option<String>,

    /// Override the base of the purge history URI
    #[arg(long)]
    purge_base_uri: Option<String>,

    /// Path to server TLS certificate
    #[arg(long, default_value = "certs/server.crt")]
    tls_cert: PathBuf,

    /// Path to server TLS key
    #[arg(long, default_value = "certs/server.key")]
    tls_key: PathBuf,

    /// Serve plaintext gRPC (local development only)
    #[arg(long)]
    insecure: bool,

    /// Server-side request deadline in seconds (0 disables)
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Timeout for orchestration engine calls in seconds
    #[arg(long, default_value = "10")]
    engine_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> GatewayConfig {
        let task_hub = TaskHubName::new(self.task_hub);

        let mut hubs: HashMap<TaskHubName, String> = self.hubs.into_iter().collect();
        if hubs.is_empty() {
            hubs.insert(task_hub.clone(), DEFAULT_CREATION_URL_TEMPLATE.to_string());
        }

        let mut base_uris = BaseUriSet::uniform(self.management_base_uri);
        if let Some(uri) = self.status_base_uri {
            base_uris.status_query = uri;
        }
        if let Some(uri) = self.event_base_uri {
            base_uris.send_event = uri;
        }
        if let Some(uri) = self.terminate_base_uri {
            base_uris.terminate = uri;
        }
        if let Some(uri) = self.rewind_base_uri {
            base_uris.rewind = uri;
        }
        if let Some(uri) = self.purge_base_uri {
            base_uris.purge_history = uri;
        }

        let transport = if self.insecure {
            TransportSecurity::Insecure
        } else {
            TransportSecurity::Tls {
                cert_path: self.tls_cert,
                key_path: self.tls_key,
            }
        };

        GatewayConfig {
            listen_addr: self.listen_addr,
            http_addr: self.http_addr,
            transport,
            task_hub,
            hubs,
            base_uris,
            request_timeout_secs: self.request_timeout_secs,
            engine_timeout_secs: self.engine_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("durable_gateway=info")),
        )
        .with_target(true)
        .init();

    let config = args.into_config();
    config.validate()?;

    let metrics = Arc::new(GatewayMetrics::default());
    let resolver = StaticClientResolver::new(config.hubs.clone(), config.engine_timeout())?;
    let hub_names: Vec<&str> = resolver.task_hubs().map(|h| h.as_str()).collect();
    info!(task_hub = %config.task_hub, hubs = ?hub_names, "Task hubs configured");

    let service = TriggerService::new(
        Arc::new(resolver),
        config.task_hub.clone(),
        config.base_uris.clone(),
    )
    .with_metrics(metrics.clone());

    let host = Arc::new(ServiceHost::new(config.host_config(), service));
    let grpc_addr = host.start().await?;

    info!(grpc_addr = %grpc_addr, "Durable gateway started");

    // Optional health/metrics endpoint
    let (ops_shutdown_tx, ops_shutdown_rx) = oneshot::channel::<()>();
    let ops_server = match config.http_addr {
        Some(http_addr) => {
            let router = http::create_router(Arc::new(OpsState {
                host: host.clone(),
                metrics,
            }));
            let listener = TcpListener::bind(http_addr).await?;
            info!("HTTP server listening on {} (health, metrics)", http_addr);

            Some(tokio::spawn(async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = ops_shutdown_rx.await;
                    })
                    .await;
                if let Err(e) = result {
                    error!(error = %e, "HTTP server error");
                }
            }))
        }
        None => None,
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let _ = ops_shutdown_tx.send(());
    host.stop().await?;
    if let Some(handle) = ops_server {
        let _ = handle.await;
    }

    info!("Durable gateway stopped");

    Ok(())
}
