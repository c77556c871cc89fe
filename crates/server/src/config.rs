use crate::error::{ServerError, ServerResult};
use rolodex::{StoreConfig, TokenConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identity embedded in tokens handed out by `GET /token`
    #[serde(default = "default_demo_email")]
    pub demo_email: String,

    /// Record store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Token signing
    #[serde(default)]
    pub auth: TokenConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            demo_email: default_demo_email(),
            store: StoreConfig::default(),
            auth: TokenConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file and
    /// `ROLODEX_SERVER__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        // Missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("ROLODEX_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.auth.secret.is_empty() {
            return Err(ServerError::Config("auth.secret must not be empty".into()));
        }
        if self.auth.lifetime_hours == 0 {
            return Err(ServerError::Config(
                "auth.lifetime_hours must be at least 1".into(),
            ));
        }
        if self.store.database.is_empty() || self.store.collection.is_empty() {
            return Err(ServerError::Config(
                "store.database and store.collection must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether tokens are signed with the built-in demo secret.
    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret == TokenConfig::default().secret
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_demo_email() -> String {
    "goguru@gmail.com".to_string()
}
