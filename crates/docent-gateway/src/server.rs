use std::net::SocketAddr;
use std::sync::Arc;

use docent_core::RagService;
use docent_llm::LlmProvider;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;

pub struct AppState<P> {
    pub service: Arc<RagService<P>>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

pub struct GatewayServer<P> {
    addr: SocketAddr,
    auth_token: Option<String>,
    max_body_size: usize,
    service: Arc<RagService<P>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<P: LlmProvider + 'static> GatewayServer<P> {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        service: Arc<RagService<P>>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0, reachable from other hosts");
        }

        Self {
            addr,
            auth_token: None,
            max_body_size: 50 * 1024 * 1024,
            service,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the HTTP server and run until the shutdown channel flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        if self.auth_token.is_none() {
            tracing::warn!("gateway auth disabled; set DOCENT_GATEWAY_AUTH_TOKEN to require a token");
        }

        let state = AppState {
            service: self.service,
        };
        let router = build_router(state, self.auth_token, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
