//! Service host: owns the gRPC listener lifecycle.
//!
//! The host moves between two states, `Stopped` and `Listening`. Transitions
//! go through one async mutex so only one start or stop runs at a time; the
//! state itself sits behind a separate lock held only to read or swap it.
//! Stopping marks the host stopped, signals the tonic server to stop
//! accepting connections and waits for in-flight requests to drain.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{error, info, warn};

use crate::service::TriggerService;

/// Transport security of the gRPC listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSecurity {
    /// TLS with a PEM certificate chain and private key.
    Tls { cert_path: PathBuf, key_path: PathBuf },
    /// Plaintext HTTP/2. Local development only.
    Insecure,
}

/// Listener settings.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub listen_addr: SocketAddr,
    pub transport: TransportSecurity,
    /// Server-side deadline applied to every request.
    pub request_timeout: Option<Duration>,
}

/// Service host errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("already listening on {0}")]
    AlreadyListening(SocketAddr),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read TLS material from '{path}': {source}")]
    TlsMaterial {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("server task failed: {0}")]
    Task(String),
}

struct Listening {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), tonic::transport::Error>>,
}

enum HostState {
    Stopped,
    Listening(Listening),
}

/// Binds the trigger service to a listening endpoint.
pub struct ServiceHost {
    config: HostConfig,
    service: TriggerService,
    transition: Mutex<()>,
    state: Mutex<HostState>,
}

impl ServiceHost {
    /// Create a stopped host.
    pub fn new(config: HostConfig, service: TriggerService) -> Self {
        Self {
            config,
            service,
            transition: Mutex::new(()),
            state: Mutex::new(HostState::Stopped),
        }
    }

    /// Start listening. Returns the bound address (useful with port 0).
    ///
    /// On any error the host stays stopped.
    pub async fn start(&self) -> Result<SocketAddr, HostError> {
        let _transition = self.transition.lock().await;
        if let HostState::Listening(listening) = &*self.state.lock().await {
            return Err(HostError::AlreadyListening(listening.local_addr));
        }

        let mut builder = Server::builder();
        if let Some(timeout) = self.config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let secure = match &self.config.transport {
            TransportSecurity::Tls {
                cert_path,
                key_path,
            } => {
                let cert = read_pem(cert_path).await?;
                let key = read_pem(key_path).await?;
                builder = builder.tls_config(
                    ServerTlsConfig::new().identity(Identity::from_pem(cert, key)),
                )?;
                true
            }
            TransportSecurity::Insecure => {
                warn!("Transport security disabled - plaintext gRPC listener");
                false
            }
        };

        let router = builder.add_service(self.service.clone().into_server());

        let addr = self.config.listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HostError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| HostError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(router.serve_with_incoming_shutdown(
            TcpListenerStream::new(listener),
            async move {
                let _ = shutdown_rx.await;
            },
        ));

        info!(addr = %local_addr, tls = secure, "gRPC server listening");

        *self.state.lock().await = HostState::Listening(Listening {
            local_addr,
            shutdown: shutdown_tx,
            task,
        });

        Ok(local_addr)
    }

    /// Stop accepting requests and drain in-flight ones.
    ///
    /// Stopping a stopped host is a no-op. The host reports itself stopped
    /// as soon as the drain begins.
    pub async fn stop(&self) -> Result<(), HostError> {
        let _transition = self.transition.lock().await;
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, HostState::Stopped)
        };
        let HostState::Listening(listening) = previous else {
            return Ok(());
        };

        info!(addr = %listening.local_addr, "Stopping gRPC server");
        let _ = listening.shutdown.send(());

        match listening.task.await {
            Ok(Ok(())) => {
                info!(addr = %listening.local_addr, "gRPC server stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "gRPC server error");
                Err(HostError::Transport(e))
            }
            Err(e) => Err(HostError::Task(e.to_string())),
        }
    }

    /// Whether the host is currently listening.
    pub async fn is_listening(&self) -> bool {
        matches!(&*self.state.lock().await, HostState::Listening(_))
    }

    /// Bound address while listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.state.lock().await {
            HostState::Listening(listening) => Some(listening.local_addr),
            HostState::Stopped => None,
        }
    }
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, HostError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| HostError::TlsMaterial {
            path: path.to_path_buf(),
            source,
        })
}
