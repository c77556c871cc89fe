//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, request ids, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::doc::{ApiDoc, OPENAPI_PATH, SWAGGER_PATH};
use crate::middleware::{bearer_auth, log_requests, request_id};
use crate::routes::{docs_redirect, records, token};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the Axum router with all routes and middleware
///
/// Every API route sits behind [`bearer_auth`], which lets through the routes
/// the policy table marks public. Unmatched paths go through the same check
/// and then redirect to the docs. Swagger UI itself stays public.
///
/// Middleware stack (outermost first):
/// 1. HTTP tracing
/// 2. Request logging
/// 3. Request ID tracking
/// 4. CORS
/// 5. Body size limit
/// 6. Bearer authentication (API routes and fallback)
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let api_routes = Router::new()
        .route("/token", get(token::issue_token))
        .route("/data1", get(records::list_records))
        .route(
            "/data",
            post(records::create_record)
                .delete(records::delete_record)
                .put(records::update_record),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_auth));

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .fallback(docs_redirect.layer(from_fn_with_state(state.clone(), bearer_auth)))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
///
/// Sets up JSON logging, connects the record store, binds the configured
/// address and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    if config.uses_default_secret() {
        tracing::warn!("Using the built-in token secret; set ROLODEX_SERVER__AUTH__SECRET");
    }

    let addr: SocketAddr = config.socket_addr()?;

    // Create server state; the store connection is opened exactly once here
    let state = Arc::new(ServerState::connect(config.clone()).await?);

    let app = build_router(state);

    tracing::info!("Starting rolodex server on {}", addr);
    tracing::info!(
        "Store: {:?} {}/{}",
        config.store.backend,
        config.store.database,
        config.store.collection
    );
    tracing::info!(
        "Token issuer: {}, lifetime: {}h",
        config.auth.issuer,
        config.auth.lifetime_hours
    );
    tracing::info!("CORS: {}, Max body: {}MB", config.enable_cors, config.max_body_size_mb);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
