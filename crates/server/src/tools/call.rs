//! call tool implementation.
//!
//! Accepts the positional envelope `{ method, args }` used by callers that
//! drive the service by method name rather than through per-method tools.

use render_cache_core::{Exporter, RenderCacheService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reply_result;

/// Parameters for the call tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CallParams {
    /// Contract method name, e.g. `addHtml`.
    pub method: String,

    /// Positional arguments in declaration order.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

/// Implementation of the call tool.
pub async fn call_impl<T: RenderCacheService>(
    exporter: &Exporter<T>, params: CallParams,
) -> Result<CallToolResult, McpError> {
    let reply = exporter.call(&params.method, params.args).await?;
    reply_result(&reply)
}
