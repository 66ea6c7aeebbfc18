use super::engine::CorrelationEngine;
use super::routes::ROUTES;
use super::state::ExporterState;
use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn get_router(engine: Arc<CorrelationEngine>) -> Router {
    let mut router = Router::new();
    for (path, method_router) in ROUTES.iter() {
        router = router.route(path, method_router.clone());
    }
    router.with_state(ExporterState::new(engine))
}

/// Serves the metrics endpoint until the process is asked to stop.
pub struct ExporterServer {
    engine: Arc<CorrelationEngine>,
    listener: TcpListener,
}

impl ExporterServer {
    pub async fn bind(engine: Arc<CorrelationEngine>, port: u16) -> anyhow::Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to address {}", addr))?;
        Ok(Self { engine, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);
        axum::serve(self.listener, get_router(self.engine))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Metrics server failed")?;
        info!("shutting down exporter");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
