//! HTTP server lifecycle: bind, serve, graceful shutdown.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::api::types::AppContext;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Handle to a running server. Dropping it without calling [`shutdown`]
/// leaves the server running until the process exits.
///
/// [`shutdown`]: ServerHandle::shutdown
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// The address the server actually bound, with the resolved port.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the server to stop accepting connections. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Bind `0.0.0.0:port` and serve the application in a background task.
///
/// Port 0 picks an ephemeral port; read it back from the handle.
pub async fn start_server(ctx: AppContext, port: u16) -> Result<ServerHandle, ServerError> {
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr,
            source,
        })?;

    let addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: "local addr".to_string(),
        source,
    })?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let app = app_router(ctx);

    tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!(error = %e, "server exited with error");
        }
    });

    tracing::info!(%addr, "listening");

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::classifier::{Classifier, MockModel};
    use crate::config::tests::test_config;
    use crate::db::open_memory_database;
    use crate::disease::DiseaseLabel;
    use crate::geo::GeoClient;

    fn test_context(dir: &std::path::Path) -> AppContext {
        AppContext {
            config: Arc::new(test_config(dir)),
            classifier: Arc::new(Classifier::with_loader(
                "unused.onnx".into(),
                Box::new(|_| Ok(Arc::new(MockModel::predicting(DiseaseLabel::Eczema)) as _)),
            )),
            db: Arc::new(Mutex::new(open_memory_database().unwrap())),
            geo: GeoClient::with_endpoints("http://127.0.0.1:9", "http://127.0.0.1:9"),
            twilio: None,
        }
    }

    #[tokio::test]
    async fn server_starts_and_answers_health() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = start_server(test_context(tmp.path()), 0).await.unwrap();
        assert_ne!(handle.addr().port(), 0);

        let url = format!("http://127.0.0.1:{}/api/health", handle.addr().port());
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        handle.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handle = start_server(test_context(tmp.path()), 0).await.unwrap();
        handle.shutdown();
        handle.shutdown();
    }
}
