use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::{NewRecord, Record, RecordId};

/// The persistence gateway: every read and write of records goes through it.
///
/// Implementations must be shareable across request tasks. Delete and update
/// of an id that matches nothing succeed without error; callers cannot tell
/// "not found" apart from "done".
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record and return the id the store assigned to it.
    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError>;
    /// Every stored record. Order is unspecified.
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;
    /// Remove at most one record.
    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError>;
    /// Replace `name` and `email` of the record with `record.id`.
    async fn update_by_id(&self, record: &Record) -> Result<(), StoreError>;
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Which backend [`StoreConfig::connect`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// MongoDB. Requires the `backend-mongo` feature (enabled by default).
    #[default]
    Mongo,
    /// Process-local store; contents vanish on exit.
    InMemory,
}

/// Configuration for the persistence gateway.
///
/// # Example
/// ```
/// use rolodex::{StoreBackend, StoreConfig};
///
/// let config = StoreConfig::in_memory();
/// assert_eq!(config.backend, StoreBackend::InMemory);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Connection string, e.g. `mongodb://localhost:27017`
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            ..Self::default()
        }
    }

    pub fn mongo(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            backend: StoreBackend::Mongo,
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Build the configured backend. For Mongo this opens the connection and
    /// pings the server, bounded by the connect timeout.
    pub async fn connect(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        match self.backend {
            StoreBackend::InMemory => {
                info!("using in-memory record store");
                Ok(Arc::new(InMemoryStore::new()))
            }
            StoreBackend::Mongo => {
                #[cfg(feature = "backend-mongo")]
                {
                    let store =
                        mongo::MongoStore::connect(&self.uri, &self.database, &self.collection)
                            .await?;
                    Ok(Arc::new(store))
                }
                #[cfg(not(feature = "backend-mongo"))]
                {
                    Err(StoreError::Unavailable(
                        "mongo backend disabled at compile time".to_string(),
                    ))
                }
            }
        }
    }
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "goguru".to_string()
}

fn default_collection() -> String {
    "collectiongoguru".to_string()
}

/// An in-memory store using a `RwLock` around a `Vec`, kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        self.records
            .write()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?
            .push(record.with_id(id));
        debug!(%id, "inserted record");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;
        Ok(guard.clone())
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;
        if let Some(pos) = guard.iter().position(|r| r.id == *id) {
            guard.remove(pos);
        }
        Ok(())
    }

    async fn update_by_id(&self, record: &Record) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;
        if let Some(stored) = guard.iter_mut().find(|r| r.id == record.id) {
            stored.name.clone_from(&record.name);
            stored.email.clone_from(&record.email);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

/// The MongoDB backend.
#[cfg(feature = "backend-mongo")]
pub mod mongo;

#[cfg(feature = "backend-mongo")]
pub use mongo::MongoStore;
