use crate::config::ServerConfig;
use crate::error::ServerResult;
use rolodex::{RecordStore, TokenService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Record gateway, opened once at startup and shared by every request
    pub store: Arc<dyn RecordStore>,

    /// Token issuer/validator
    pub tokens: Arc<TokenService>,
}

impl ServerState {
    /// Create server state, connecting to the configured store.
    pub async fn connect(config: ServerConfig) -> ServerResult<Self> {
        let store = config.store.connect().await?;
        tracing::info!(backend = store.backend_name(), "record store ready");
        Ok(Self::with_store(config, store))
    }

    /// Create server state around an already-built store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn RecordStore>) -> Self {
        let tokens = Arc::new(TokenService::new(config.auth.clone()));
        Self {
            config: Arc::new(config),
            store,
            tokens,
        }
    }
}
