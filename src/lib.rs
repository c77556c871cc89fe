//! Rolodex core: records, the persistence gateway and bearer tokens.
//!
//! This crate holds everything the HTTP layer (`crates/server`) delegates to:
//!
//! - **Records** - [`Record`], [`NewRecord`] and the store-native [`RecordId`]
//! - **Gateway** - the [`RecordStore`] trait with a MongoDB backend
//!   ([`MongoStore`], feature `backend-mongo`) and an [`InMemoryStore`]
//! - **Tokens** - [`TokenService`] issues and validates HMAC-signed tokens
//!   carrying the caller's email
//!
//! ## Example
//!
//! ```
//! use rolodex::{InMemoryStore, NewRecord, RecordStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! let id = store.insert(NewRecord::new("Ana", "ana@x.com")).await.unwrap();
//! let all = store.list_all().await.unwrap();
//! assert_eq!(all[0].id, id);
//! # });
//! ```

mod error;
mod record;
pub mod store;
mod token;

pub use crate::error::{StoreError, TokenError};
pub use crate::record::{NewRecord, Record, RecordId, RecordIdError};
pub use crate::store::{InMemoryStore, RecordStore, StoreBackend, StoreConfig};
pub use crate::token::{Claims, TokenConfig, TokenService};

#[cfg(feature = "backend-mongo")]
pub use crate::store::MongoStore;
