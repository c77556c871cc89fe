//! Rolodex Server - HTTP REST API over name/email records
//!
//! This binary loads configuration, connects the record store and serves the
//! API until shut down.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
