//! evict and remove tool implementations.

use render_cache_core::{Exporter, Invocation, RenderCacheService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reply_result;

/// Parameters for the remove tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemoveParams {
    /// URL whose entries are removed. Query string and method are ignored.
    pub url: String,
}

/// Implementation of the evict tool.
pub async fn evict_impl<T: RenderCacheService>(exporter: &Exporter<T>) -> Result<CallToolResult, McpError> {
    let reply = exporter.dispatch(Invocation::Evict).await?;
    reply_result(&reply)
}

/// Implementation of the remove tool.
pub async fn remove_impl<T: RenderCacheService>(
    exporter: &Exporter<T>, params: RemoveParams,
) -> Result<CallToolResult, McpError> {
    let reply = exporter.dispatch(Invocation::Remove { url: params.url }).await?;
    reply_result(&reply)
}
