//! Fetch interception for render-cache.
//!
//! This crate provides the request pipeline that sits in front of network
//! fetch: a chain of middlewares where the render cache answers first and
//! the network answers whatever the cache could not.

pub mod fetch;
pub mod intercept;

pub use fetch::{FetchConfig, NetworkFallback, UrlError, resolve};
pub use intercept::{CacheMiddleware, Middleware, Outcome, Pipeline, Request, Response, Source};

use render_cache_core::{ContentStore, Error, RenderCache};

/// The standard pipeline: answer from `cache` first, then from the network.
pub fn cache_then_network<S: ContentStore + 'static>(
    cache: RenderCache<S>, config: FetchConfig,
) -> Result<Pipeline, Error> {
    Ok(Pipeline::new()
        .with(CacheMiddleware::new(cache))
        .with(NetworkFallback::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_cache_core::MemoryStore;

    #[tokio::test]
    async fn test_cache_then_network_serves_cached() {
        let cache = RenderCache::new(MemoryStore::new("renderCache"));
        cache.add_html("https://app.example.com/a.html", "<p>hi</p>").await.unwrap();

        let pipeline = cache_then_network(cache, FetchConfig::default()).unwrap();
        assert_eq!(pipeline.len(), 2);

        let response = pipeline
            .run(&Request::get("https://app.example.com/a.html"))
            .await
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.source, Source::Cache);
        assert_eq!(response.body, bytes::Bytes::from_static(b"<p>hi</p>"));
    }
}
