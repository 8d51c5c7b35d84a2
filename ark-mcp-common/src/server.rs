//! Host loop that serves an `rmcp` handler on the selected transport.
//!
//! Both transports stop when the shutdown receiver fires or, when none was
//! given, on SIGINT/SIGTERM (Ctrl+C off Unix).

use crate::transport::Transport;
use rmcp::{ServerHandler, ServiceExt};
use std::future::Future;
use thiserror::Error;
use tokio::sync::oneshot;

/// Path the streamable HTTP service is mounted under.
pub const HTTP_MOUNT_PATH: &str = "/mcp";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to port {port}: {message}")]
    BindFailed { port: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Serves one handler on one transport until shutdown.
pub struct McpServerBuilder<H> {
    handler: H,
    transport: Transport,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl<H> McpServerBuilder<H>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            transport: Transport::Stdio,
            shutdown_rx: None,
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Stop on this receiver instead of OS signals. A dropped sender also stops the server.
    pub fn with_shutdown(mut self, shutdown_rx: oneshot::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Serve until the peer disconnects (stdio) or shutdown is requested.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(transport = %self.transport, "Starting MCP server");

        let stop = shutdown_requested(self.shutdown_rx);
        match self.transport {
            Transport::Stdio => serve_stdio(self.handler, stop).await,
            Transport::Http { port } => serve_http(self.handler, port, stop).await,
        }
    }
}

async fn serve_stdio<H>(handler: H, stop: impl Future<Output = ()>) -> Result<(), ServerError>
where
    H: ServerHandler + Send + Sync + 'static,
{
    let running = handler
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    tokio::select! {
        outcome = running.waiting() => {
            outcome.map_err(|e| ServerError::Transport(e.to_string()))?;
            tracing::info!("Client disconnected");
        }
        () = stop => tracing::info!("Shutdown requested, leaving stdio loop"),
    }
    Ok(())
}

async fn serve_http<H>(handler: H, port: u16, stop: impl Future<Output = ()> + Send + 'static) -> Result<(), ServerError>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(HTTP_MOUNT_PATH, service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| ServerError::BindFailed {
            port,
            message: e.to_string(),
        })?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, path = HTTP_MOUNT_PATH, "Listening for MCP over HTTP");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(stop)
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    tracing::info!("HTTP listener closed");
    Ok(())
}

/// Resolves when the receiver fires (or its sender is dropped), or on an OS
/// signal when there is no receiver.
pub(crate) async fn shutdown_requested(rx: Option<oneshot::Receiver<()>>) {
    match rx {
        Some(rx) => {
            let _ = rx.await;
        }
        None => os_signal().await,
    }
}

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut term), Ok(mut int)) => {
            let name = tokio::select! {
                _ = term.recv() => "SIGTERM",
                _ = int.recv() => "SIGINT",
            };
            tracing::info!(signal = name, "Received signal");
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Signal handlers unavailable, waiting for Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => tracing::warn!(error = %e, "Ctrl+C handler unavailable"),
    }
}
