//! In-memory content store.
//!
//! Mirrors [`SqliteStore`](super::SqliteStore) semantics without a database,
//! for tests and for embedding the manager where persistence is not needed.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContentStore, DeleteOptions, RequestIdentity, StoredResponse};
use crate::Error;

/// A named cache held in process memory.
///
/// Clones share the same entries.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    name: String,
    entries: Arc<RwLock<Vec<(RequestIdentity, StoredResponse)>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Arc::new(RwLock::new(Vec::new())) }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|(key, _)| key == identity)
            .map(|(_, response)| response.clone()))
    }

    async fn put(&self, identity: &RequestIdentity, response: &StoredResponse) -> Result<(), Error> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|(key, _)| key == identity) {
            Some((_, existing)) => *existing = response.clone(),
            None => entries.push((identity.clone(), response.clone())),
        }
        Ok(())
    }

    async fn delete(&self, identity: &RequestIdentity, options: DeleteOptions) -> Result<u64, Error> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(key, _)| !options.matches(identity, key));
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<u64, Error> {
        let mut entries = self.entries.write().await;
        let count = entries.len() as u64;
        entries.clear();
        Ok(count)
    }

    async fn keys(&self) -> Result<Vec<RequestIdentity>, Error> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(key, _)| key.clone()).collect())
    }
}
