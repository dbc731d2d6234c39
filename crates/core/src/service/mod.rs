//! Remotely callable contract over the cache manager.
//!
//! [`RenderCacheService`] lists the six exported operations with concrete
//! types. [`CONTRACT`] advertises them as a method table of positional
//! argument kinds, [`Invocation`] decodes positional calls against that
//! table, and [`Exporter`] routes decoded calls to a bound implementation.

pub mod contract;
pub mod exporter;
pub mod invocation;

use std::sync::Arc;

use async_trait::async_trait;

pub use contract::{ArgKind, CONTRACT, MethodSpec, method_spec};
pub use exporter::{Exporter, Reply};
pub use invocation::{ContentArg, Invocation};

use crate::Error;
use crate::manager::RenderCache;
use crate::store::{Body, ContentStore, Headers, RequestIdentity};

/// Stable name the service is advertised under.
pub const SERVICE_NAME: &str = "RenderCacheService";

/// Version of the exported contract.
pub const VERSION: &str = "0.0.1";

/// The operations a remote caller may invoke.
#[async_trait]
pub trait RenderCacheService: Send + Sync {
    async fn list_content(&self) -> Result<Vec<RequestIdentity>, Error>;

    async fn evict(&self) -> Result<u64, Error>;

    async fn remove(&self, url: &str) -> Result<u64, Error>;

    async fn add(&self, url: &str, headers: Headers, content: Body) -> Result<(), Error>;

    async fn add_html(&self, url: &str, content: String) -> Result<(), Error>;

    async fn add_png(&self, url: &str, content: Vec<u8>) -> Result<(), Error>;
}

#[async_trait]
impl<S: ContentStore> RenderCacheService for RenderCache<S> {
    async fn list_content(&self) -> Result<Vec<RequestIdentity>, Error> {
        RenderCache::list_content(self).await
    }

    async fn evict(&self) -> Result<u64, Error> {
        RenderCache::evict(self).await
    }

    async fn remove(&self, url: &str) -> Result<u64, Error> {
        RenderCache::remove(self, url).await
    }

    async fn add(&self, url: &str, headers: Headers, content: Body) -> Result<(), Error> {
        RenderCache::add(self, url, headers, content).await
    }

    async fn add_html(&self, url: &str, content: String) -> Result<(), Error> {
        RenderCache::add_html(self, url, content).await
    }

    async fn add_png(&self, url: &str, content: Vec<u8>) -> Result<(), Error> {
        RenderCache::add_png(self, url, content).await
    }
}

#[async_trait]
impl<T: RenderCacheService + ?Sized> RenderCacheService for Arc<T> {
    async fn list_content(&self) -> Result<Vec<RequestIdentity>, Error> {
        (**self).list_content().await
    }

    async fn evict(&self) -> Result<u64, Error> {
        (**self).evict().await
    }

    async fn remove(&self, url: &str) -> Result<u64, Error> {
        (**self).remove(url).await
    }

    async fn add(&self, url: &str, headers: Headers, content: Body) -> Result<(), Error> {
        (**self).add(url, headers, content).await
    }

    async fn add_html(&self, url: &str, content: String) -> Result<(), Error> {
        (**self).add_html(url, content).await
    }

    async fn add_png(&self, url: &str, content: Vec<u8>) -> Result<(), Error> {
        (**self).add_png(url, content).await
    }
}
