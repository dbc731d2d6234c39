//! Routing decoded calls to a bound service implementation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{CONTRACT, MethodSpec};
use super::invocation::Invocation;
use super::{RenderCacheService, SERVICE_NAME};
use crate::Error;
use crate::store::RequestIdentity;

/// Result of a dispatched call, as returned to remote callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Keys returned by `listContent`.
    Keys { keys: Vec<RequestIdentity> },
    /// Entries deleted by `evict` or `remove`.
    Deleted { deleted: u64 },
    /// URL written by one of the add methods.
    Stored { url: String },
}

/// Binds a [`RenderCacheService`] to the exported contract.
///
/// An exporter holds no registration state of its own, so any number of
/// exporters may wrap the same service.
#[derive(Debug, Clone)]
pub struct Exporter<T> {
    service: T,
}

impl<T: RenderCacheService> Exporter<T> {
    pub fn new(service: T) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &'static str {
        SERVICE_NAME
    }

    pub fn contract(&self) -> &'static [MethodSpec] {
        CONTRACT
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    /// Route `invocation` to the bound method.
    pub async fn dispatch(&self, invocation: Invocation) -> Result<Reply, Error> {
        let method = invocation.method();
        let reply = match invocation {
            Invocation::ListContent => Reply::Keys { keys: self.service.list_content().await? },
            Invocation::Evict => Reply::Deleted { deleted: self.service.evict().await? },
            Invocation::Remove { url } => Reply::Deleted { deleted: self.service.remove(&url).await? },
            Invocation::Add { url, headers, content } => {
                self.service.add(&url, headers, content).await?;
                Reply::Stored { url }
            }
            Invocation::AddHtml { url, content } => {
                self.service.add_html(&url, content).await?;
                Reply::Stored { url }
            }
            Invocation::AddPng { url, content } => {
                self.service.add_png(&url, content).await?;
                Reply::Stored { url }
            }
        };
        tracing::debug!(service = SERVICE_NAME, method, "dispatched call");
        Ok(reply)
    }

    /// Decode a positional call and dispatch it.
    ///
    /// Calls that do not match the contract are rejected before the
    /// service is touched.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Reply, Error> {
        let invocation = Invocation::from_positional(method, args).inspect_err(|e| {
            tracing::warn!(service = SERVICE_NAME, method, error = %e, "rejected call");
        })?;
        self.dispatch(invocation).await
    }
}
