//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::{AppState, TOTAL_COUNT_HEADER};
use super::router::build_api_routes;
use crate::config::ServerConfig;
use crate::core::store::RecordStore;
use crate::storage::JsonFileStore;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, header};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Builder for the storefront HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(JsonFileStore::open("db.json")?)
///     .with_static_dir("public")
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    static_dir: Option<PathBuf>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            static_dir: None,
        }
    }

    /// Open the configured database file and static directory
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store = JsonFileStore::open(&config.store.path).with_context(|| {
            format!("failed to open database '{}'", config.store.path.display())
        })?;

        let mut builder = Self::new().with_store(store);
        if let Some(dir) = &config.static_dir {
            builder = builder.with_static_dir(dir);
        }
        Ok(builder)
    }

    /// Set the record store (required)
    pub fn with_store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Serve files from `dir` ahead of the API routes
    ///
    /// Ignored when the directory does not exist.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Build the final router with the default middleware stack
    ///
    /// Layers, outermost first: request tracing, permissive CORS exposing
    /// `X-Total-Count`, `Cache-Control: no-cache` unless a handler set one.
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("RecordStore is required. Call .with_store()"))?;

        let api = build_api_routes(AppState::new(store));

        // Files win over `/{collection}`; anything not on disk reaches the API
        let app = match self.static_dir.filter(|dir| dir.is_dir()) {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "serving static files");
                Router::new().fallback_service(
                    ServeDir::new(dir)
                        .call_fallback_on_method_not_allowed(true)
                        .fallback(api),
                )
            }
            None => api,
        };

        Ok(app
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .expose_headers([TOTAL_COUNT_HEADER]),
            )
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Rewrite the store once more after the last request
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let store = self.store.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(store) = store {
            store.persist().await?;
        }
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    #[test]
    fn test_build_without_store_fails() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("with_store"));
    }

    #[test]
    fn test_build_with_store() {
        assert!(ServerBuilder::new().with_store(InMemoryStore::new()).build().is_ok());
    }

    #[test]
    fn test_missing_static_dir_is_ignored() {
        let builder = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_static_dir("/definitely/not/here");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_from_config_creates_database() {
        let dir = tempdir().unwrap();
        let mut config = ServerConfig::default_config();
        config.store.path = dir.path().join("db.json");
        config.static_dir = None;

        let builder = ServerBuilder::from_config(&config).unwrap();
        assert!(config.store.path.exists());
        assert!(builder.build().is_ok());
    }

    #[tokio::test]
    async fn test_middleware_headers() {
        let app = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .build()
            .unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/products")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(preflight).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>shop</h1>").unwrap();

        let app = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_static_dir(dir.path())
            .build()
            .unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Misses fall through to the API
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
