//! Named content stores keyed by request identity.
//!
//! A content store holds `(request identity -> stored response)` pairs for
//! one named cache. Two backends share the [`ContentStore`] contract:
//!
//! - [`SqliteStore`]: persistent, one named cache inside a [`CacheDb`]
//! - [`MemoryStore`]: in-process, used as a test double

pub mod connection;
pub mod identity;
pub mod memory;
pub mod migrations;
pub mod response;
pub mod sqlite;

pub use connection::CacheDb;
pub use identity::{DEFAULT_METHOD, RequestIdentity};
pub use memory::MemoryStore;
pub use response::{Body, Headers, StoredResponse};
pub use sqlite::SqliteStore;

use crate::Error;

/// Comparison options for [`ContentStore::delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Compare URLs without their query string.
    pub ignore_search: bool,
    /// Match entries stored under any HTTP method.
    pub ignore_method: bool,
}

impl DeleteOptions {
    /// Options that match every entry stored under the same path.
    pub fn normalized() -> Self {
        Self { ignore_search: true, ignore_method: true }
    }

    /// Whether `candidate` is selected by a delete targeting `target`.
    pub fn matches(&self, target: &RequestIdentity, candidate: &RequestIdentity) -> bool {
        let method_ok = self.ignore_method || target.method == candidate.method;
        let url_ok = if self.ignore_search {
            target.normalized_url() == candidate.normalized_url()
        } else {
            target.url == candidate.url
        };
        method_ok && url_ok
    }
}

/// A persistent key-value store of responses for one named cache.
///
/// Put has insert-or-replace semantics: at most one entry exists per
/// request identity. Deletes that match nothing succeed with a count of 0.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Name of the cache this store was opened with.
    fn name(&self) -> &str;

    /// Exact lookup by request identity.
    async fn match_request(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error>;

    /// Insert or replace the entry for `identity`.
    async fn put(&self, identity: &RequestIdentity, response: &StoredResponse) -> Result<(), Error>;

    /// Delete entries matching `identity` under `options`. Returns the number removed.
    async fn delete(&self, identity: &RequestIdentity, options: DeleteOptions) -> Result<u64, Error>;

    /// Delete every entry in this cache. The cache itself stays open.
    async fn clear(&self) -> Result<u64, Error>;

    /// Every request identity currently stored, in insertion order.
    async fn keys(&self) -> Result<Vec<RequestIdentity>, Error>;
}
