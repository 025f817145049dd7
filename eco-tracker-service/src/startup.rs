use crate::config::{CorsConfig, EcoConfig, StoreBackend};
use crate::handlers;
use crate::services::{EcoStore, MemoryStore, MongoStore};
use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EcoStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EcoStore>) -> Self {
        Self { store }
    }
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if cors.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/challenges",
            get(handlers::list_challenges).post(handlers::create_challenge),
        )
        .route("/challenges-six", get(handlers::recent_challenges))
        .route(
            "/challenges/:id",
            get(handlers::get_challenge)
                .patch(handlers::update_challenge)
                .delete(handlers::delete_challenge),
        )
        .route("/challenges/join/:id", post(handlers::join_challenge))
        .route(
            "/created-challenges/:email",
            get(handlers::created_challenges),
        )
        // GET takes a user id, PATCH and DELETE an enrollment id
        .route(
            "/user-challenges/:id",
            get(handlers::list_user_challenges)
                .patch(handlers::update_user_challenge)
                .delete(handlers::delete_user_challenge),
        )
        .route("/users", post(handlers::create_user))
        .route("/all-events", get(handlers::all_events))
        .route("/upcoming-events", get(handlers::upcoming_events))
        .route("/all-tips", get(handlers::all_tips))
        .route("/recent-tips", get(handlers::recent_tips))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(cors))
}

/// Opens the configured backend. MongoDB gets its indexes created before
/// the server accepts traffic.
pub async fn connect_store(config: &EcoConfig) -> Result<Arc<dyn EcoStore>, AppError> {
    match config.store {
        StoreBackend::Mongo => {
            let store = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub struct Application {
    port: u16,
    server: Box<dyn Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: EcoConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        Self::with_store(&config, store).await
    }

    /// Binds the listener around an already opened store. Port 0 picks a
    /// free port.
    pub async fn with_store(
        config: &EcoConfig,
        store: Arc<dyn EcoStore>,
    ) -> Result<Self, AppError> {
        let app = build_router(AppState::new(store), &config.cors);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();

        Ok(Self {
            port,
            server: Box::new(server),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
