//! add, addHtml and addPng tool implementations.

use base64::{Engine, engine::general_purpose::STANDARD};
use render_cache_core::{ContentArg, Error, Exporter, Headers, Invocation, RenderCacheService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::reply_result;

/// Parameters for the add tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddParams {
    /// URL the content is stored under.
    pub url: String,

    /// Headers returned with the cached response. Required; pass `{}` for none.
    pub headers: Option<Headers>,

    /// Body as a plain string, `{"type": "text", "data": ...}` or `{"type": "binary", "data": <base64>}`.
    pub content: ContentArg,
}

/// Parameters for the addHtml tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddHtmlParams {
    /// URL the document is stored under.
    pub url: String,

    /// The rendered HTML document.
    pub content: String,
}

/// Parameters for the addPng tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddPngParams {
    /// URL the image is stored under.
    pub url: String,

    /// Base64-encoded PNG bytes.
    pub content: String,
}

/// Implementation of the add tool.
pub async fn add_impl<T: RenderCacheService>(
    exporter: &Exporter<T>, params: AddParams,
) -> Result<CallToolResult, McpError> {
    let headers = params
        .headers
        .ok_or_else(|| Error::ContractViolation("add: argument 1 (headers) is required".into()))?;

    let invocation = Invocation::Add { url: params.url, headers, content: params.content.into() };
    let reply = exporter.dispatch(invocation).await?;
    reply_result(&reply)
}

/// Implementation of the addHtml tool.
pub async fn add_html_impl<T: RenderCacheService>(
    exporter: &Exporter<T>, params: AddHtmlParams,
) -> Result<CallToolResult, McpError> {
    let reply = exporter
        .dispatch(Invocation::AddHtml { url: params.url, content: params.content })
        .await?;
    reply_result(&reply)
}

/// Implementation of the addPng tool.
pub async fn add_png_impl<T: RenderCacheService>(
    exporter: &Exporter<T>, params: AddPngParams,
) -> Result<CallToolResult, McpError> {
    let content = STANDARD
        .decode(params.content.as_bytes())
        .map_err(|e| Error::ContractViolation(format!("content must be base64-encoded bytes: {e}")))?;

    let reply = exporter
        .dispatch(Invocation::AddPng { url: params.url, content })
        .await?;
    reply_result(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{exporter, parse_reply};
    use render_cache_core::{Body, Reply, RequestIdentity};

    #[tokio::test]
    async fn test_add_with_headers() {
        let exporter = exporter();
        let params: AddParams = serde_json::from_value(serde_json::json!({
            "url": "/a.html",
            "headers": {"Content-Type": "text/html", "Cache-Control": "no-store"},
            "content": {"type": "text", "data": "<p>hi</p>"}
        }))
        .unwrap();

        let result = add_impl(&exporter, params).await.unwrap();
        assert_eq!(parse_reply(&result), Reply::Stored { url: "/a.html".into() });

        let found = exporter
            .service()
            .lookup(&RequestIdentity::get("/a.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, Body::from("<p>hi</p>"));
        assert_eq!(found.headers.len(), 2);
        assert_eq!(found.headers.get("cache-control"), Some("no-store"));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_header() {
        let exporter = exporter();
        let params = AddParams {
            url: "/a.html".into(),
            headers: Some([("Bad Name", "x")].into_iter().collect()),
            content: ContentArg::Text("x".into()),
        };

        let err = add_impl(&exporter, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_add_without_headers_is_rejected() {
        let exporter = exporter();
        let params: AddParams = serde_json::from_value(serde_json::json!({
            "url": "/a.html",
            "content": "<p>hi</p>"
        }))
        .unwrap();

        let err = add_impl(&exporter, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("headers"));
        assert!(exporter.service().list_content().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_accepts_plain_string_content() {
        let exporter = exporter();
        let params: AddParams = serde_json::from_value(serde_json::json!({
            "url": "/a.html",
            "headers": {},
            "content": "<p>plain</p>"
        }))
        .unwrap();

        add_impl(&exporter, params).await.unwrap();

        let found = exporter
            .service()
            .lookup(&RequestIdentity::get("/a.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, Body::Text("<p>plain</p>".into()));
        assert!(found.headers.is_empty());
    }

    #[tokio::test]
    async fn test_add_html() {
        let exporter = exporter();
        let params = AddHtmlParams { url: "/a.html".into(), content: "<p>hi</p>".into() };

        add_html_impl(&exporter, params).await.unwrap();

        let found = exporter
            .service()
            .lookup(&RequestIdentity::get("/a.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.headers, Headers::content_type("text/html"));
    }

    #[tokio::test]
    async fn test_add_png_base64() {
        let exporter = exporter();
        let params = AddPngParams { url: "/img.png".into(), content: STANDARD.encode([0x89, b'P', b'N', b'G']) };

        add_png_impl(&exporter, params).await.unwrap();

        let found = exporter
            .service()
            .lookup(&RequestIdentity::get("/img.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, Body::Binary(vec![0x89, b'P', b'N', b'G']));
        assert_eq!(found.headers.get("Content-Type"), Some("image/png"));
    }

    #[tokio::test]
    async fn test_add_png_invalid_base64() {
        let exporter = exporter();
        let params = AddPngParams { url: "/img.png".into(), content: "%%%".into() };

        let err = add_png_impl(&exporter, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(exporter.service().list_content().await.unwrap().is_empty());
    }
}
