// Component management handlers
//
// Each call re-reads the component file, so edits made by hand or by the
// other listener are always visible.

use hyper::StatusCode;
use serde_json::Value;

use super::response::ApiReply;
use crate::catalog::{ComponentRecord, LookupTable};
use crate::logger;
use crate::store::{ComponentStore, StoreError};

const INCOMPLETE: &str = "Incomplete data: component_name and details are required";

/// Every record in file order
pub async fn list_components(store: &ComponentStore) -> LookupTable {
    store.load().await
}

/// `POST /api/add` with `{component_name, details}`
pub async fn add_component(body: &[u8], store: &ComponentStore) -> (StatusCode, ApiReply) {
    let request = match parse_body(body) {
        Ok(v) => v,
        Err(reply) => return (StatusCode::BAD_REQUEST, reply),
    };

    let Some(name) = component_name(&request) else {
        return (StatusCode::BAD_REQUEST, ApiReply::failed(INCOMPLETE));
    };
    let details = match request.get("details") {
        Some(Value::Object(map)) if !map.is_empty() => Value::Object(map.clone()),
        Some(Value::Object(_) | Value::Null) | None => {
            return (StatusCode::BAD_REQUEST, ApiReply::failed(INCOMPLETE));
        }
        Some(_) => {
            return (
                StatusCode::BAD_REQUEST,
                ApiReply::failed("details must be a JSON object"),
            );
        }
    };
    let record: ComponentRecord = match serde_json::from_value(details) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                ApiReply::failed(format!("Invalid details: {e}")),
            );
        }
    };

    match store.add(name, record).await {
        Ok(()) => (StatusCode::OK, ApiReply::ok(name)),
        Err(StoreError::DuplicateKey(_)) => (
            StatusCode::BAD_REQUEST,
            ApiReply::failed("Component name already exists"),
        ),
        Err(e) => store_failure(&e),
    }
}

/// `POST /api/delete` with `{component_name}`
pub async fn delete_component(body: &[u8], store: &ComponentStore) -> (StatusCode, ApiReply) {
    let request = match parse_body(body) {
        Ok(v) => v,
        Err(reply) => return (StatusCode::BAD_REQUEST, reply),
    };

    let Some(name) = component_name(&request) else {
        return (
            StatusCode::BAD_REQUEST,
            ApiReply::failed("component_name is required"),
        );
    };

    match store.delete(name).await {
        Ok(()) => (StatusCode::OK, ApiReply::ok(name)),
        Err(StoreError::MissingKey(_)) => {
            (StatusCode::NOT_FOUND, ApiReply::failed("Component not found"))
        }
        Err(e) => store_failure(&e),
    }
}

fn parse_body(body: &[u8]) -> Result<Value, ApiReply> {
    serde_json::from_slice(body).map_err(|e| ApiReply::failed(format!("Request body must be JSON: {e}")))
}

fn component_name(request: &Value) -> Option<&str> {
    request
        .get("component_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

fn store_failure(err: &StoreError) -> (StatusCode, ApiReply) {
    logger::log_api_error(&err.to_string());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiReply::failed(format!("Component file error: {err}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ComponentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ComponentStore::new(dir.path().join("components.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let (_dir, store) = store();
        let body = br#"{"component_name": "C1", "details": {"parameter": "100N", "footprint": "0402", "box_id": 1, "led_id": 3}}"#;
        let (status, reply) = add_component(body, &store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, ApiReply::ok("C1"));

        let table = list_components(&store).await;
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_key_value("C1").unwrap().1.parameter, "100N");
    }

    #[tokio::test]
    async fn test_add_rejects_incomplete_and_duplicates() {
        let (_dir, store) = store();
        let bodies: [&[u8]; 6] = [
            br#"{"details": {"parameter": "10K"}}"#,
            br#"{"component_name": "", "details": {"parameter": "10K"}}"#,
            br#"{"component_name": "R1"}"#,
            br#"{"component_name": "R1", "details": {}}"#,
            br#"{"component_name": "R1", "details": "10K"}"#,
            b"not json",
        ];
        for body in bodies {
            let (status, reply) = add_component(body, &store).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!reply.success);
        }
        assert!(!store.path().exists());

        let body = br#"{"component_name": "R1", "details": {"parameter": "10K", "box_id": 1, "led_id": 1}}"#;
        assert_eq!(add_component(body, &store).await.0, StatusCode::OK);
        let before = std::fs::read_to_string(store.path()).unwrap();
        let (status, reply) = add_component(body, &store).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.error.as_deref(), Some("Component name already exists"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = store();
        store
            .add("R1", ComponentRecord::new("10K", "0402", 1, 1))
            .await
            .unwrap();

        let (status, _) = delete_component(br#"{}"#, &store).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, reply) = delete_component(br#"{"component_name": "R2"}"#, &store).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(reply.error.as_deref(), Some("Component not found"));

        let (status, reply) = delete_component(br#"{"component_name": "R1"}"#, &store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, ApiReply::ok("R1"));
        assert!(list_components(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_a_server_error() {
        let (_dir, store) = store();
        let broken = r#"{"R1": {"parameter": "10K""#;
        std::fs::write(store.path(), broken).unwrap();

        let body = br#"{"component_name": "C1", "details": {"parameter": "100N", "box_id": 1, "led_id": 3}}"#;
        let (status, reply) = add_component(body, &store).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.error.unwrap().starts_with("Component file error"));

        let (status, _) = delete_component(br#"{"component_name": "R1"}"#, &store).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), broken);
    }
}
