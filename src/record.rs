//! The record entity and its identifier.
//!
//! A [`Record`] is the only thing the service stores: a name and an email
//! under a store-assigned [`RecordId`]. Records that have not reached the
//! store yet are [`NewRecord`]s and carry no id at all, so a caller can never
//! choose the id a record is persisted under.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use thiserror::Error;

/// Returned when text cannot be parsed into a [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record id {input:?}: expected 24 hex characters")]
pub struct RecordIdError {
    pub input: String,
}

/// Store-native record identifier (a 12-byte object id).
///
/// Renders as 24 lowercase hex characters and parses back from the same form,
/// which is what travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(ObjectId);

impl RecordId {
    /// Generate a fresh, process-unique id.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn from_object_id(oid: ObjectId) -> Self {
        Self(oid)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Hex form used on the wire.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| RecordIdError {
                input: s.to_string(),
            })
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

/// A persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
}

impl Record {
    pub fn new(id: RecordId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub email: String,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Attach the id the store assigned.
    pub fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            email: self.email,
        }
    }
}
