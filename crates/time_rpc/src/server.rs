use std::net::SocketAddr;
use std::time::Duration;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::core::{
    error::{McpResult, TimeRpcError, TimeRpcResult},
    models::TimeRequest,
    provider::TimeProvider,
};

/// RPC handler for `RequestTime`
///
/// One clone serves each connection. Clones share the shutdown token and the
/// in-flight call tracker of the server that created them.
#[derive(Clone)]
pub struct TimeService {
    provider: TimeProvider,
    shutdown: CancellationToken,
    calls: TaskTracker,
    tool_router: ToolRouter<TimeService>,
}

impl TimeService {
    pub fn new(provider: TimeProvider) -> Self {
        Self::with_lifecycle(provider, CancellationToken::new(), TaskTracker::new())
    }

    fn with_lifecycle(
        provider: TimeProvider,
        shutdown: CancellationToken,
        calls: TaskTracker,
    ) -> Self {
        Self {
            provider,
            shutdown,
            calls,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl TimeService {
    #[tool(
        name = "RequestTime",
        description = "Get the current date-time in a timezone"
    )]
    pub(crate) async fn request_time(
        &self,
        Parameters(request): Parameters<TimeRequest>,
    ) -> McpResult<CallToolResult> {
        // Register before looking at the token so a drain never misses this call
        let _call = self.calls.token();
        if self.shutdown.is_cancelled() {
            tracing::debug!(zone = %request.time_zone, "Rejecting call during shutdown");
            return Err(TimeRpcError::ShuttingDown.into());
        }

        let response = self.provider.request_time(&request).inspect_err(|e| {
            tracing::debug!(zone = %request.time_zone, "RequestTime failed: {}", e);
        })?;
        tracing::debug!(zone = %request.time_zone, time = %response.time, "RequestTime served");

        let body = serde_json::to_string(&response).map_err(|e| {
            TimeRpcError::MalformedResponse {
                reason: e.to_string(),
            }
        })?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

#[tool_handler]
impl ServerHandler for TimeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Time RPC server. Call RequestTime with {\"timeZone\": \"<zone>\"} to get the current date-time in that zone."
                    .to_string(),
            ),
        }
    }
}

/// Owns the listening socket until [`TimeServer::run`] returns
pub struct TimeServer {
    listener: TcpListener,
    provider: TimeProvider,
    config: ServerConfig,
}

impl TimeServer {
    pub async fn bind(config: ServerConfig) -> TimeRpcResult<Self> {
        Self::bind_with_provider(config, TimeProvider::new()).await
    }

    pub async fn bind_with_provider(
        config: ServerConfig,
        provider: TimeProvider,
    ) -> TimeRpcResult<Self> {
        let listener = TcpListener::bind(config.addr)
            .await
            .map_err(|source| TimeRpcError::Bind {
                addr: config.addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            provider,
            config,
        })
    }

    pub fn local_addr(&self) -> TimeRpcResult<SocketAddr> {
        self.listener.local_addr().map_err(TimeRpcError::transport)
    }

    /// Serve until `shutdown` is cancelled, then drain.
    ///
    /// Draining stops accepting connections, rejects new calls, waits up to
    /// the grace period for in-flight calls, gives connections the linger
    /// period to hang up, and closes whatever is left.
    pub async fn run(self, shutdown: CancellationToken) -> TimeRpcResult<()> {
        let Self {
            listener,
            provider,
            config,
        } = self;

        let calls = TaskTracker::new();
        let service = TimeService::with_lifecycle(provider, shutdown.clone(), calls.clone());
        let close_connections = CancellationToken::new();
        let mut connections = JoinSet::new();

        let addr = listener.local_addr().map_err(TimeRpcError::transport)?;
        tracing::info!("Server started, listening on {}", addr);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(peer = %peer, "Accepted connection");
                        connections.spawn(serve_connection(
                            service.clone(),
                            stream,
                            peer,
                            close_connections.child_token(),
                        ));
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
            }
            while connections.try_join_next().is_some() {}
        }

        drop(listener);
        tracing::info!(
            connections = connections.len(),
            grace_secs = config.grace_period.as_secs(),
            "Shutting down, draining in-flight calls"
        );

        let deadline = Instant::now() + config.grace_period;
        calls.close();
        if tokio::time::timeout_at(deadline, calls.wait()).await.is_err() {
            tracing::warn!(
                in_flight = calls.len(),
                "Grace period elapsed with calls still in flight"
            );
        }

        let linger_until = std::cmp::min(deadline, Instant::now() + config.linger);
        let _ = tokio::time::timeout_at(linger_until, wait_all(&mut connections)).await;

        close_connections.cancel();
        let forced = connections.len();
        if tokio::time::timeout(Duration::from_secs(1), wait_all(&mut connections))
            .await
            .is_err()
        {
            connections.abort_all();
        }
        tracing::info!(closed = forced, "Server shut down");

        Ok(())
    }
}

async fn wait_all(connections: &mut JoinSet<()>) {
    while connections.join_next().await.is_some() {}
}

async fn serve_connection(
    service: TimeService,
    stream: TcpStream,
    peer: SocketAddr,
    close: CancellationToken,
) {
    let running = match service.serve_with_ct(stream, close).await {
        Ok(running) => running,
        Err(e) => {
            tracing::warn!(peer = %peer, "Connection handshake failed: {}", e);
            return;
        }
    };

    match running.waiting().await {
        Ok(reason) => tracing::debug!(peer = %peer, ?reason, "Connection closed"),
        Err(e) => tracing::warn!(peer = %peer, "Connection task failed: {}", e),
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn run(config: ServerConfig) -> TimeRpcResult<()> {
    let server = TimeServer::bind(config).await?;
    let shutdown = CancellationToken::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Termination signal received");
        trigger.cancel();
    });

    server.run(shutdown).await
}
