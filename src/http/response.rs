//! Response builders
//!
//! Shared by the viewer and the manager listeners. A builder that fails logs
//! the error and falls back to a bare response with the same body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

const JSON: &str = "application/json";
const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

/// Attach `body`, degrading to an unadorned response if a header was invalid
fn finish(builder: Builder, body: Bytes, label: &str) -> Response<Full<Bytes>> {
    builder
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            crate::logger::log_error(&format!("Failed to build {label} response: {e}"));
            Response::new(Full::new(body))
        })
}

/// Pretty-printed JSON body, never cached
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string_pretty(body) {
        Ok(json) => finish(
            Response::builder()
                .status(status)
                .header("Content-Type", JSON)
                .header("Cache-Control", "no-store"),
            Bytes::from(json),
            status.as_str(),
        ),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            finish(
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header("Content-Type", JSON),
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
                "500",
            )
        }
    }
}

pub fn build_text_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(status)
            .header("Content-Type", TEXT),
        Bytes::from(message.to_string()),
        status.as_str(),
    )
}

/// Empty 304 carrying the validator the client already holds
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header("ETag", etag)
            .header("Cache-Control", "no-cache"),
        Bytes::new(),
        "304",
    )
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// 405 with the `Allow` list for the path
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("Content-Type", TEXT)
            .header("Allow", allow),
        Bytes::from_static(b"405 Method Not Allowed"),
        "405",
    )
}

pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// 204 answer to `OPTIONS`, with preflight headers when CORS is on
pub fn build_options_response(enable_cors: bool, allow: &str) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow);
    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", allow)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }
    finish(builder, Bytes::new(), "OPTIONS")
}

pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::OK, status)
}

/// HTML page; `etag` enables revalidation, `is_head` drops the body but keeps its length
pub fn build_html_response(
    content: String,
    etag: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", HTML)
        .header("Content-Length", content.len())
        .header("Cache-Control", "no-cache");
    if let Some(etag) = etag {
        builder = builder.header("ETag", etag);
    }

    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };
    finish(builder, body, "HTML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let resp = json_response(StatusCode::BAD_REQUEST, &serde_json::json!({"status": "error"}));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["Content-Type"], JSON);
        assert_eq!(resp.headers()["Cache-Control"], "no-store");
    }

    #[test]
    fn test_head_html_keeps_length() {
        let resp = build_html_response("<p>bom</p>".to_string(), Some("\"1\""), true);
        assert_eq!(resp.headers()["Content-Length"], "10");
        assert_eq!(resp.headers()["ETag"], "\"1\"");
    }

    #[test]
    fn test_invalid_header_degrades_to_bare_response() {
        let resp = build_405_response("GET\nHEAD");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("Allow").is_none());
    }

    #[test]
    fn test_options_with_cors() {
        let resp = build_options_response(true, "GET, HEAD, OPTIONS");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let resp = build_options_response(false, "GET");
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
    }
}
