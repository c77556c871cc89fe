//! Error types produced by the rolodex crate.
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`StoreError::Connect`] | [`StoreConfig::connect`](crate::StoreConfig::connect) | the store could not be reached at startup |
//! | [`StoreError::Backend`] | any [`RecordStore`](crate::RecordStore) call | the driver failed mid-operation |
//! | [`StoreError::Decode`] | [`RecordStore::list_all`](crate::RecordStore::list_all) | a stored document did not match the record shape |
//! | [`StoreError::Unavailable`] | backend construction / locking | backend missing or unusable |
//! | [`TokenError::Malformed`] | [`TokenService::validate`](crate::TokenService::validate) | bad structure, algorithm or signature |
//! | [`TokenError::ClaimDecode`] | [`TokenService::validate`](crate::TokenService::validate) | signature fine, claims of the wrong shape |
//! | [`TokenError::Expired`] | [`TokenService::validate`](crate::TokenService::validate) | `exp` lies in the past |
//! | [`TokenError::Signing`] | [`TokenService::issue`](crate::TokenService::issue) | claims could not be encoded or signed |

use thiserror::Error;

/// Failures of the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to store: {0}")]
    Connect(String),

    #[error("store operation failed: {0}")]
    Backend(String),

    #[error("failed to decode stored record: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }

    /// True when the store itself cannot be reached, as opposed to a single
    /// operation going wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Connect(_) | StoreError::Unavailable(_))
    }
}

/// Failures of token issuance and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("couldn't parse claims: {0}")]
    ClaimDecode(String),

    #[error("token is expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}
