//! Viewer request routing
//!
//! Entry point for the BOM viewer listener: method validation, body size
//! check, health probes, then dispatch to the BOM page or the resolve
//! endpoint.

use crate::bom::{self, BomLoadError};
use crate::config::{AppState, LIGHTUP_PATH};
use crate::handler::lightup;
use crate::http::{self, cache, QueryParams};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

const ALLOW: &str = "GET, HEAD, OPTIONS";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Main entry point for viewer requests
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return Ok(resp);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(resp);
    }

    let ctx = RequestContext {
        path: req.uri().path(),
        query: req.uri().query(),
        is_head: *method == Method::HEAD,
        if_none_match: req
            .headers()
            .get(hyper::header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok()),
    };

    Ok(route_request(&ctx, &state).await)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors, ALLOW)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response(ALLOW))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
pub fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(hyper::header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    // Health check endpoints first
    let health = &state.config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    match ctx.path {
        "/" | "/index.html" => serve_bom_page(ctx, state).await,
        LIGHTUP_PATH => serve_lightup(ctx, state).await,
        _ => http::build_404_response(),
    }
}

/// Resolve a clicked component against the viewer's table
async fn serve_lightup(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let params = QueryParams::parse(ctx.query);
    let table = state.table.read().await;
    let (status, body) = lightup::lookup(&params, &table);
    http::json_response(status, &body)
}

/// Serve the BOM page with the patch and serial bridge applied
async fn serve_bom_page(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let path = Path::new(&state.config.bom.file);
    let html = match bom::read_bom(path).await {
        Ok(html) => html,
        Err(BomLoadError::NotFound) => {
            logger::log_error(&format!("BOM page not found: {}", path.display()));
            return http::build_text_response(
                StatusCode::NOT_FOUND,
                &format!(
                    "Error: {} not found. Export the interactive BOM next to the server or set bom.file.",
                    path.display()
                ),
            );
        }
        Err(BomLoadError::Io(e)) => {
            logger::log_error(&format!("Failed to read BOM page {}: {e}", path.display()));
            return http::build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
            );
        }
    };

    let (page, outcome) = bom::render_page(&html, state.config.bom.patch_console_log, &state.bridge);
    state.report_patch_outcome(outcome);

    let etag = cache::generate_etag(page.as_bytes());
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag);
    }
    http::build_html_response(page, Some(&etag), ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ComponentRecord, LookupTable};
    use crate::config::Config;
    use crate::store::ComponentStore;
    use http_body_util::BodyExt;

    fn state_with_bom(bom_file: &Path) -> Arc<AppState> {
        let mut config = Config::load_from("definitely-missing-bom-locator-config").unwrap();
        config.bom.file = bom_file.to_string_lossy().into_owned();
        let mut table = LookupTable::new();
        table.insert("R1", ComponentRecord::new("10K", "0402", 1, 2));
        Arc::new(AppState::with_table(&config, ComponentStore::new("unused.json"), table))
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_bom_page_injects_bridge_and_revalidates() {
        let dir = tempfile::tempdir().unwrap();
        let bom_file = dir.path().join("InteractiveBOM.html");
        std::fs::write(&bom_file, "<html><body><h1>BOM</h1></body></html>").unwrap();
        let state = state_with_bom(&bom_file);

        let resp = handle_request(get("/"), Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let etag = resp.headers()["ETag"].to_str().unwrap().to_string();
        let body = body_string(resp).await;
        assert!(body.contains("bom-locator-serial"));
        assert!(body.ends_with("</body></html>"));

        let req = Request::builder()
            .uri("/")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let resp = handle_request(req, state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_missing_bom_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_bom(&dir.path().join("missing.html"));
        let resp = handle_request(get("/"), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_string(resp).await.contains("missing.html"));
    }

    #[tokio::test]
    async fn test_lightup_route() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_bom(&dir.path().join("bom.html"));

        assert!(state
            .bridge
            .contains(&format!("const LIGHTUP_PATH = '{LIGHTUP_PATH}';")));
        let uri = format!("{LIGHTUP_PATH}?part_number=R1");
        let resp = handle_request(get(&uri), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["command"], "box_id:1,led_id:2\n");

        let resp = handle_request(get(LIGHTUP_PATH), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_methods_health_and_unknown_routes() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_bom(&dir.path().join("bom.html"));

        let post = Request::builder().method(Method::POST).uri("/lightup").body(()).unwrap();
        let resp = handle_request(post, Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = handle_request(get("/healthz"), Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = handle_request(get("/favicon.ico"), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
