//! Request interception pipeline.
//!
//! Each middleware receives the request and the outcome produced by the
//! stages before it, and returns a new outcome. "Nothing matched" is its own
//! variant so it can never be mistaken for an empty response.

pub mod cache;

pub use cache::CacheMiddleware;

use async_trait::async_trait;
use bytes::Bytes;
use render_cache_core::{Body, Error, Headers, RequestIdentity, StoredResponse};

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: url.into() }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Cache key for this request.
    pub fn identity(&self) -> RequestIdentity {
        RequestIdentity::new(&self.method, &self.url)
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

/// A response produced by some pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
    pub source: Source,
}

impl Response {
    /// A `200` response served from the cache.
    pub fn from_cache(stored: StoredResponse) -> Self {
        let body = match stored.body {
            Body::Text(text) => Bytes::from(text),
            Body::Binary(bytes) => Bytes::from(bytes),
        };
        Self { status: 200, headers: stored.headers, body, source: Source::Cache }
    }
}

/// Result of running a request through pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched(Response),
    NoMatch,
}

impl Outcome {
    pub fn into_response(self) -> Option<Response> {
        match self {
            Outcome::Matched(response) => Some(response),
            Outcome::NoMatch => None,
        }
    }
}

/// One pipeline stage.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Produce the outcome for `request` given what earlier stages produced.
    async fn handle(&self, request: &Request, previous: Outcome) -> Result<Outcome, Error>;
}

/// Ordered chain of middlewares.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in the order they were added.
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run `request` through every stage, starting from [`Outcome::NoMatch`].
    pub async fn run(&self, request: &Request) -> Result<Outcome, Error> {
        let mut outcome = Outcome::NoMatch;
        for stage in &self.stages {
            outcome = stage.handle(request, outcome).await?;
        }
        Ok(outcome)
    }
}
