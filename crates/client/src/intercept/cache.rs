//! Cache-first pipeline stage.

use async_trait::async_trait;
use render_cache_core::{ContentStore, Error, RenderCache};

use super::{Middleware, Outcome, Request, Response};

/// Answers requests from a [`RenderCache`] when it holds an exact match.
///
/// A store failure is logged and treated as a miss so later stages still
/// get a chance to answer; it is never turned into a response.
pub struct CacheMiddleware<S> {
    cache: RenderCache<S>,
}

impl<S: ContentStore> CacheMiddleware<S> {
    pub fn new(cache: RenderCache<S>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &RenderCache<S> {
        &self.cache
    }
}

#[async_trait]
impl<S: ContentStore + 'static> Middleware for CacheMiddleware<S> {
    async fn handle(&self, request: &Request, previous: Outcome) -> Result<Outcome, Error> {
        if let Outcome::Matched(response) = previous {
            return Ok(Outcome::Matched(response));
        }

        match self.cache.lookup(&request.identity()).await {
            Ok(Some(stored)) => Ok(Outcome::Matched(Response::from_cache(stored))),
            Ok(None) => Ok(Outcome::NoMatch),
            Err(e) => {
                tracing::warn!(cache = self.cache.cache_name(), url = %request.url, error = %e, "cache lookup failed");
                Ok(Outcome::NoMatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::{Pipeline, Source};
    use bytes::Bytes;
    use render_cache_core::{CacheDb, DeleteOptions, MemoryStore, RequestIdentity, StoredResponse};

    struct BrokenStore;

    #[async_trait]
    impl ContentStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn match_request(&self, _identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error> {
            Err(Error::StoreUnavailable("storage disabled".into()))
        }

        async fn put(&self, _identity: &RequestIdentity, _response: &StoredResponse) -> Result<(), Error> {
            Err(Error::StoreUnavailable("storage disabled".into()))
        }

        async fn delete(&self, _identity: &RequestIdentity, _options: DeleteOptions) -> Result<u64, Error> {
            Err(Error::StoreUnavailable("storage disabled".into()))
        }

        async fn clear(&self) -> Result<u64, Error> {
            Err(Error::StoreUnavailable("storage disabled".into()))
        }

        async fn keys(&self) -> Result<Vec<RequestIdentity>, Error> {
            Err(Error::StoreUnavailable("storage disabled".into()))
        }
    }

    #[tokio::test]
    async fn test_hit_short_circuits() {
        let cache = RenderCache::new(MemoryStore::new("renderCache"));
        cache.add_html("/a.html", "<p>hi</p>").await.unwrap();
        let middleware = CacheMiddleware::new(cache);

        let outcome = middleware.handle(&Request::get("/a.html"), Outcome::NoMatch).await.unwrap();
        let response = outcome.into_response().unwrap();
        assert_eq!(response.source, Source::Cache);
        assert_eq!(response.body, Bytes::from_static(b"<p>hi</p>"));
        assert_eq!(response.headers.get("Content-Type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_miss_is_no_match() {
        let middleware = CacheMiddleware::new(RenderCache::new(MemoryStore::new("renderCache")));
        let outcome = middleware.handle(&Request::get("/nope"), Outcome::NoMatch).await.unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
    }

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let cache = RenderCache::new(MemoryStore::new("renderCache"));
        cache.add_html("/page", "x").await.unwrap();
        let middleware = CacheMiddleware::new(cache);

        let with_query = middleware.handle(&Request::get("/page?x=1"), Outcome::NoMatch).await.unwrap();
        assert_eq!(with_query, Outcome::NoMatch);
        let post = middleware.handle(&Request::new("POST", "/page"), Outcome::NoMatch).await.unwrap();
        assert_eq!(post, Outcome::NoMatch);
    }

    #[tokio::test]
    async fn test_store_failure_falls_through() {
        let middleware = CacheMiddleware::new(RenderCache::new(BrokenStore));
        let outcome = middleware.handle(&Request::get("/a.html"), Outcome::NoMatch).await.unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
    }

    #[tokio::test]
    async fn test_previous_match_wins() {
        let cache = RenderCache::new(MemoryStore::new("renderCache"));
        cache.add_html("/a.html", "cached").await.unwrap();
        let middleware = CacheMiddleware::new(cache);

        let earlier = Response {
            status: 204,
            headers: Default::default(),
            body: Bytes::new(),
            source: Source::Network,
        };
        let outcome = middleware
            .handle(&Request::get("/a.html"), Outcome::Matched(earlier.clone()))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Matched(earlier));
    }

    #[tokio::test]
    async fn test_pipeline_with_sqlite_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = RenderCache::new(db.open_store("renderCache"));
        cache.add_png("/img.png", vec![0x89, b'P', b'N', b'G']).await.unwrap();

        let pipeline = Pipeline::new().with(CacheMiddleware::new(cache.clone()));
        let response = pipeline
            .run(&Request::get("/img.png"))
            .await
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.body, Bytes::from_static(&[0x89, b'P', b'N', b'G']));

        cache.remove("/img.png").await.unwrap();
        assert_eq!(pipeline.run(&Request::get("/img.png")).await.unwrap(), Outcome::NoMatch);
    }
}
