//! listContent tool implementation.

use render_cache_core::{Exporter, Invocation, RenderCacheService};
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::reply_result;

/// Implementation of the listContent tool.
pub async fn list_impl<T: RenderCacheService>(exporter: &Exporter<T>) -> Result<CallToolResult, McpError> {
    let reply = exporter.dispatch(Invocation::ListContent).await?;
    reply_result(&reply)
}
