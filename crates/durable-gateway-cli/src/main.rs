//! Durable Gateway CLI - start orchestrations through the gateway.

use clap::{Parser, Subcommand};
use tonic::transport::{Certificate, Channel, ClientTlsConfig};

use durable_gateway_core::InstanceDescriptor;
use durable_gateway_proto::pb::NewDurableTaskRequest;
use durable_gateway_proto::DurableTaskServiceClient;

/// Durable Gateway CLI
#[derive(Parser)]
#[command(name = "durable-gateway-cli")]
#[command(about = "CLI for the durable gateway", long_about = None)]
struct Cli {
    /// Gateway address (use an http:// address for plaintext gateways)
    #[arg(short, long, default_value = "https://[::1]:50051")]
    addr: String,

    /// CA certificate used to verify the gateway (PEM, required for https)
    #[arg(long)]
    ca_cert: Option<String>,

    /// Server name to verify when it differs from the address host
    #[arg(long)]
    domain: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new orchestration instance
    #[command(name = "start-new")]
    StartNew {
        /// Orchestrator function to instantiate
        #[arg(short, long)]
        function_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let channel = connect(&cli).await?;

    match cli.command {
        Commands::StartNew { function_name } => {
            start_new(channel, function_name).await?;
        }
    }

    Ok(())
}

async fn connect(cli: &Cli) -> Result<Channel, Box<dyn std::error::Error>> {
    let mut endpoint = Channel::from_shared(cli.addr.clone())?;

    if let Some(tls) = client_tls_config(cli)? {
        endpoint = endpoint.tls_config(tls)?;
    }

    Ok(endpoint.connect().await?)
}

/// TLS settings for `https://` addresses, `None` for plaintext.
fn client_tls_config(cli: &Cli) -> Result<Option<ClientTlsConfig>, Box<dyn std::error::Error>> {
    if !cli.addr.starts_with("https://") {
        return Ok(None);
    }

    // No built-in trust roots are compiled in
    let Some(path) = &cli.ca_cert else {
        return Err(format!(
            "--ca-cert is required to connect to {} (use an http:// address for a plaintext gateway)",
            cli.addr
        )
        .into());
    };

    let pem = std::fs::read(path)
        .map_err(|e| format!("Failed to read CA certificate from '{}': {}", path, e))?;
    let mut tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));
    if let Some(domain) = &cli.domain {
        tls = tls.domain_name(domain.clone());
    }

    Ok(Some(tls))
}

async fn start_new(
    channel: Channel,
    function_name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = DurableTaskServiceClient::new(channel);

    let response = client
        .start_new(NewDurableTaskRequest { function_name })
        .await?;
    let descriptor: InstanceDescriptor = response.into_inner().into();

    println!("{}", serde_json::to_string_pretty(&descriptor)?);

    Ok(())
}
