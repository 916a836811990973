// Manager API entry
// Component management page and CRUD endpoints over the component file

mod handlers;
mod response;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::handler::check_body_size;
use crate::http;
use crate::logger;

pub use response::{ApiReply, NOT_FOUND};

const MANAGER_PAGE: &str = include_str!("../../assets/manager.html");

/// API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_api_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if method == Method::OPTIONS {
        return Ok(http::build_options_response(
            state.config.http.enable_cors,
            allowed_methods(&path),
        ));
    }

    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        logger::log_api_request(method.as_str(), &path, resp.status().as_u16());
        return Ok(resp);
    }

    let health = &state.config.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return Ok(http::build_health_response("ok"));
    }

    let response = match (&method, path.as_str()) {
        (&Method::GET | &Method::HEAD, "/" | "/index.html") => http::build_html_response(
            MANAGER_PAGE.to_string(),
            None,
            method == Method::HEAD,
        ),
        (&Method::GET, "/api/components") => {
            let table = handlers::list_components(&state.store).await;
            http::json_response(StatusCode::OK, &table)
        }
        (&Method::POST, "/api/add" | "/api/delete") => {
            let body = match read_body(req, state.config.http.max_body_size).await {
                Ok(body) => body,
                Err(resp) => {
                    logger::log_api_request(method.as_str(), &path, resp.status().as_u16());
                    return Ok(resp);
                }
            };
            let (status, reply) = if path == "/api/add" {
                handlers::add_component(&body, &state.store).await
            } else {
                handlers::delete_component(&body, &state.store).await
            };
            http::json_response(status, &reply)
        }
        (_, "/" | "/index.html" | "/api/components" | "/api/add" | "/api/delete") => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(allowed_methods(&path))
        }
        _ => http::json_response(StatusCode::NOT_FOUND, &NOT_FOUND),
    };

    logger::log_api_request(method.as_str(), &path, response.status().as_u16());
    Ok(response)
}

fn allowed_methods(path: &str) -> &'static str {
    match path {
        "/api/add" | "/api/delete" => "POST, OPTIONS",
        "/api/components" => "GET, OPTIONS",
        _ => "GET, HEAD, OPTIONS",
    }
}

/// Collect the request body, capped at `max_body_size` bytes
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!("Request body exceeds {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_api_error(&format!("Failed to read request body: {e}"));
            Err(http::json_response(
                StatusCode::BAD_REQUEST,
                &ApiReply::failed("Failed to read request body"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LookupTable;
    use crate::config::Config;
    use crate::store::ComponentStore;
    use tempfile::TempDir;

    fn state() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from("definitely-missing-bom-locator-config").unwrap();
        let store = ComponentStore::new(dir.path().join("components.json"));
        (dir, Arc::new(AppState::with_table(&config, store, LookupTable::new())))
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn json_body(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_list_delete_flow() {
        let (_dir, state) = state();

        let add = r#"{"component_name": "U1", "details": {"parameter": "SPX3819", "footprint": "SOT-23-5", "box_id": 1, "led_id": 0}}"#;
        let resp = handle_api_request(request(Method::POST, "/api/add", add), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["component_name"], "U1");

        let resp = handle_api_request(request(Method::GET, "/api/components", ""), Arc::clone(&state))
            .await
            .unwrap();
        let list = json_body(resp).await;
        assert_eq!(list["U1"]["footprint"], "SOT-23-5");

        let del = r#"{"component_name": "U1"}"#;
        let resp = handle_api_request(request(Method::POST, "/api/delete", del), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = handle_api_request(request(Method::POST, "/api/delete", del), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["success"], false);
    }

    #[tokio::test]
    async fn test_page_methods_and_unknown_routes() {
        let (_dir, state) = state();

        let resp = handle_api_request(request(Method::GET, "/", ""), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");

        let resp = handle_api_request(request(Method::GET, "/api/add", ""), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "POST, OPTIONS");

        let resp = handle_api_request(request(Method::GET, "/v1/discovery", ""), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversize_body_is_rejected() {
        let (_dir, state) = state();
        let big = format!(
            r#"{{"component_name": "X", "details": {{"parameter": "{}"}}}}"#,
            "A".repeat(2 * 1_048_576)
        );
        let resp = handle_api_request(request(Method::POST, "/api/add", &big), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
