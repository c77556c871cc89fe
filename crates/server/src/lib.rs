//! Rolodex Server - HTTP REST API over name/email records
//!
//! Exposes the [`rolodex`] record gateway and token service over HTTP:
//!
//! - **Records**: create, list, update and delete records in one collection
//! - **Authentication**: HMAC-signed bearer tokens, checked per an explicit
//!   route access table ([`policy::ROUTE_ACCESS`])
//! - **Documentation**: generated OpenAPI document and Swagger UI
//! - **Configuration**: file and environment based, see [`ServerConfig`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /token` - issue a token for the demo identity
//! - `GET /data1` - list all records
//! - `GET /swagger/` - API documentation
//!
//! ## Bearer token required
//!
//! - `POST /data` - create a record
//! - `DELETE /data?id=<hex>` - delete a record
//! - `PUT /data` - replace a record's name and email
//!
//! Any other path needs a bearer token too, then redirects to the
//! documentation.

pub mod config;
pub mod doc;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{AuthError, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
