//! MCP server handler implementation.
//!
//! Exposes the render cache service contract as MCP tools. Tool names match
//! the contract method names so remote callers see one stable surface.

use std::sync::Arc;

use crate::tools::{
    AddHtmlParams, AddParams, AddPngParams, CallParams, RemoveParams, add_html_impl, add_impl, add_png_impl,
    call_impl, evict_impl, list_impl, remove_impl,
};

use render_cache_core::{
    Exporter, RenderCache, SqliteStore,
    service::{MethodSpec, VERSION},
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The cache manager type served over MCP.
pub type SharedCache = RenderCache<SqliteStore>;

/// The main MCP server handler for render-cache.
#[derive(Clone)]
pub struct RenderCacheServer {
    exporter: Arc<Exporter<SharedCache>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl RenderCacheServer {
    /// Create a new server handler bound to `cache`.
    pub fn new(cache: SharedCache) -> Self {
        Self { exporter: Arc::new(Exporter::new(cache)), tool_router: Self::tool_router() }
    }

    #[tool(name = "listContent", description = "List the request identities (method and URL) stored in the cache.")]
    async fn list_content(&self) -> Result<CallToolResult, McpError> {
        list_impl(self.exporter.as_ref()).await
    }

    #[tool(name = "evict", description = "Delete every entry in the cache. Succeeds on an empty cache.")]
    async fn evict(&self) -> Result<CallToolResult, McpError> {
        evict_impl(self.exporter.as_ref()).await
    }

    #[tool(
        name = "remove",
        description = "Delete the entries stored under a URL, ignoring query string and HTTP method."
    )]
    async fn remove(&self, params: Parameters<RemoveParams>) -> Result<CallToolResult, McpError> {
        remove_impl(self.exporter.as_ref(), params.0).await
    }

    #[tool(name = "add", description = "Store content with the given headers under a URL, replacing any previous entry.")]
    async fn add(&self, params: Parameters<AddParams>) -> Result<CallToolResult, McpError> {
        add_impl(self.exporter.as_ref(), params.0).await
    }

    #[tool(name = "addHtml", description = "Store an HTML document under a URL with Content-Type text/html.")]
    async fn add_html(&self, params: Parameters<AddHtmlParams>) -> Result<CallToolResult, McpError> {
        add_html_impl(self.exporter.as_ref(), params.0).await
    }

    #[tool(name = "addPng", description = "Store base64-encoded PNG bytes under a URL with Content-Type image/png.")]
    async fn add_png(&self, params: Parameters<AddPngParams>) -> Result<CallToolResult, McpError> {
        add_png_impl(self.exporter.as_ref(), params.0).await
    }

    #[tool(
        name = "call",
        description = "Invoke a contract method by name with positional arguments, e.g. {\"method\": \"addHtml\", \"args\": [url, html]}."
    )]
    async fn call(&self, params: Parameters<CallParams>) -> Result<CallToolResult, McpError> {
        call_impl(self.exporter.as_ref(), params.0).await
    }
}

/// One line per contract method, e.g. `addPng(string, blob)`.
fn describe_contract(contract: &[MethodSpec]) -> String {
    contract
        .iter()
        .map(|spec| {
            let kinds: Vec<&str> = spec.args.iter().map(|kind| kind.as_str()).collect();
            format!("{}({})", spec.name, kinds.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl ServerHandler for RenderCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.exporter.service_name().into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Render cache `{}`, contract v{VERSION}:\n{}",
                self.exporter.service().cache_name(),
                describe_contract(self.exporter.contract())
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
