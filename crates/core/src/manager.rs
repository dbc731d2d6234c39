//! Cache manager over one named content store.
//!
//! Lookups are exact matches on request identity. Removal is normalized:
//! it ignores the query string and the HTTP method, so one `remove` clears
//! every variant stored under a path. The two rules are deliberately left
//! asymmetric; whether lookup should also normalize is an open product
//! question, and changing either side alters what callers observe.

use crate::Error;
use crate::store::{Body, ContentStore, DeleteOptions, Headers, RequestIdentity, StoredResponse};

/// Content type written by [`RenderCache::add_html`].
pub const TEXT_HTML: &str = "text/html";

/// Content type written by [`RenderCache::add_png`].
pub const IMAGE_PNG: &str = "image/png";

/// CRUD access to one named response cache.
#[derive(Clone, Debug)]
pub struct RenderCache<S> {
    store: S,
}

impl<S: ContentStore> RenderCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache_name(&self) -> &str {
        self.store.name()
    }

    /// Find the response stored under exactly `identity`.
    ///
    /// A miss is `Ok(None)`; store failures are returned as errors and never
    /// as a response.
    pub async fn lookup(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error> {
        let found = self.store.match_request(identity).await?;
        tracing::debug!(cache = self.cache_name(), %identity, hit = found.is_some(), "cache lookup");
        Ok(found)
    }

    /// Every request identity currently in the cache.
    pub async fn list_content(&self) -> Result<Vec<RequestIdentity>, Error> {
        self.store.keys().await
    }

    /// Delete all entries. Returns how many were removed.
    pub async fn evict(&self) -> Result<u64, Error> {
        let deleted = self.store.clear().await?;
        tracing::debug!(cache = self.cache_name(), deleted, "cache evicted");
        Ok(deleted)
    }

    /// Delete every entry stored under the path of `url`, whatever its
    /// query string or method. Returns how many were removed.
    pub async fn remove(&self, url: &str) -> Result<u64, Error> {
        let deleted = self
            .store
            .delete(&RequestIdentity::get(url), DeleteOptions::normalized())
            .await?;
        tracing::debug!(cache = self.cache_name(), url, deleted, "cache entry removed");
        Ok(deleted)
    }

    /// Store `content` with `headers` for a `GET` of `url`, replacing any
    /// previous entry for that identity.
    pub async fn add(&self, url: &str, headers: Headers, content: Body) -> Result<(), Error> {
        let identity = RequestIdentity::get(url);
        let bytes = content.len();
        let response = StoredResponse::new(headers, content)?;
        self.store.put(&identity, &response).await?;
        tracing::debug!(cache = self.cache_name(), %identity, bytes, "cache entry stored");
        Ok(())
    }

    pub async fn add_html(&self, url: &str, content: impl Into<String>) -> Result<(), Error> {
        self.add(url, Headers::content_type(TEXT_HTML), Body::Text(content.into()))
            .await
    }

    pub async fn add_png(&self, url: &str, content: impl Into<Vec<u8>>) -> Result<(), Error> {
        self.add(url, Headers::content_type(IMAGE_PNG), Body::Binary(content.into()))
            .await
    }
}
