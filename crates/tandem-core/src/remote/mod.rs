//! Remote record store
//!
//! A queryable, multi-writer record service holding the shared copy of every
//! published list. Four record kinds are used: shared-list, shared-task
//! (referencing its list), invitation (code -> list reference), and
//! user-profile.
//!
//! There are no multi-record transactions; each write is independently
//! durable once acknowledged, and callers tolerate partial completion across
//! the several writes a single logical operation issues.
//!
//! Implementations:
//! - [`MemoryRemote`]: in-process store with a simulated-outage switch
//! - [`HttpRemote`]: JSON over HTTP against a generic record service

mod http;
mod memory;
pub mod records;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identity of a remote record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a raw record identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The record kinds the store understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A published list
    SharedList,
    /// A task belonging to a published list
    SharedTask,
    /// A user profile
    UserProfile,
    /// An invite code mapped to a list reference
    Invitation,
}

impl RecordType {
    /// Wire name of the record kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::SharedList => "shared-list",
            RecordType::SharedTask => "shared-task",
            RecordType::UserProfile => "user-profile",
            RecordType::Invitation => "invitation",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field map of a record
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A fetched record: identity plus fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

/// Errors from the remote record store
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Network, account, or service failure
    #[error("Remote record store unavailable: {0}")]
    Unavailable(String),

    /// The record no longer exists
    #[error("Record not found: {0}")]
    NotFound(RecordId),
}

/// Typed record CRUD plus predicate query
///
/// `update` merges the provided fields into the record, leaving other
/// fields untouched.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a record, returning its identity
    async fn create(&self, record_type: RecordType, fields: Fields)
        -> Result<RecordId, RemoteError>;

    /// Merge fields into an existing record
    async fn update(&self, id: &RecordId, fields: Fields) -> Result<(), RemoteError>;

    /// Delete a record
    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError>;

    /// Fetch all records of a kind whose field equals the given value
    async fn query(
        &self,
        record_type: RecordType,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Record>, RemoteError>;
}
