//! MCP tool implementations.
//!
//! One tool per exported cache method, plus `call` for positional envelopes.

pub mod call;
pub mod delete;
pub mod list;
pub mod write;

pub use call::{CallParams, call_impl};
pub use delete::{RemoveParams, evict_impl, remove_impl};
pub use list::list_impl;
pub use write::{AddHtmlParams, AddParams, AddPngParams, add_html_impl, add_impl, add_png_impl};

use render_cache_core::{Error, Reply};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

/// Render a dispatch reply as pretty JSON text content.
pub(crate) fn reply_result(reply: &Reply) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(reply)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize reply: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
