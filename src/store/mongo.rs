use std::time::Duration;

use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::{NewRecord, Record, RecordId};
use crate::store::RecordStore;

/// Upper bound on connection establishment. Operations after that run
/// without a deadline.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stored document shape: `{ _id, name, email }`.
#[derive(Debug, Serialize, Deserialize)]
struct RecordDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
}

impl From<RecordDocument> for Record {
    fn from(doc: RecordDocument) -> Self {
        Record::new(RecordId::from_object_id(doc.id), doc.name, doc.email)
    }
}

/// Record store backed by one MongoDB collection.
///
/// The driver's `Client` is internally pooled and thread-safe, so one store
/// is shared by every request.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<RecordDocument>,
}

impl MongoStore {
    /// Connect and ping the server. Fails with [`StoreError::Connect`] when the
    /// server does not answer within [`CONNECT_TIMEOUT`].
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = tokio::time::timeout(CONNECT_TIMEOUT, open_client(uri, database))
            .await
            .map_err(|_| {
                StoreError::Connect(format!(
                    "no answer from {uri} within {}s",
                    CONNECT_TIMEOUT.as_secs()
                ))
            })??;

        info!(database, collection, "connected to mongodb");

        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }
}

async fn open_client(uri: &str, database: &str) -> Result<Client, StoreError> {
    let mut options = ClientOptions::parse(uri)
        .await
        .map_err(|e| StoreError::Connect(e.to_string()))?;
    options.connect_timeout = Some(CONNECT_TIMEOUT);
    options.server_selection_timeout = Some(CONNECT_TIMEOUT);

    let client = Client::with_options(options).map_err(|e| StoreError::Connect(e.to_string()))?;
    client
        .database(database)
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| StoreError::Connect(e.to_string()))?;
    Ok(client)
}

fn map_read_error(err: MongoError) -> StoreError {
    if let ErrorKind::BsonDeserialization(e) = err.kind.as_ref() {
        return StoreError::Decode(e.to_string());
    }
    StoreError::backend(err)
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        let document = RecordDocument {
            id: id.object_id(),
            name: record.name,
            email: record.email,
        };
        self.collection
            .insert_one(document, None)
            .await
            .map_err(StoreError::backend)?;
        debug!(%id, "inserted record");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {}, None)
            .await
            .map_err(map_read_error)?;
        // A single undecodable document fails the whole listing.
        let documents: Vec<RecordDocument> = cursor.try_collect().await.map_err(map_read_error)?;
        Ok(documents.into_iter().map(Record::from).collect())
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await
            .map_err(StoreError::backend)?;
        debug!(%id, deleted = result.deleted_count, "delete by id");
        Ok(())
    }

    async fn update_by_id(&self, record: &Record) -> Result<(), StoreError> {
        let update = doc! {
            "$set": {
                "name": record.name.as_str(),
                "email": record.email.as_str(),
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": record.id.object_id() }, update, None)
            .await
            .map_err(StoreError::backend)?;
        debug!(id = %record.id, matched = result.matched_count, "update by id");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }
}
