//! JSON REST surface for the task board.
//!
//! Every response carries a `success` flag; failures add an `error` string,
//! including unknown paths and unsupported methods.
//! `GET /api/tasks/stats` is registered ahead of `/api/tasks/{id}`; other
//! methods on `stats` are treated as a non-numeric id.

pub mod handlers;
pub mod types;

pub use handlers::{ApiError, SharedService};
pub use types::{DataResponse, ErrorResponse, ListQuery, ListResponse, MessageResponse};

use axum::{
    routing::{any, get, patch},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use handlers::{
    advance_status, create_task, delete_task, get_task, list_tasks, method_not_allowed,
    route_not_found, stats_as_id, task_stats, update_task,
};

/// API routes without middleware.
pub fn routes() -> Router<SharedService> {
    Router::new()
        .route(
            "/api/tasks/stats",
            get(task_stats).put(stats_as_id).delete(stats_as_id).fallback(method_not_allowed),
        )
        .route("/api/tasks", get(list_tasks).post(create_task).fallback(method_not_allowed))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task).fallback(method_not_allowed),
        )
        .route(
            "/api/tasks/{id}/next-status",
            patch(advance_status).fallback(method_not_allowed),
        )
        .route("/api/{*rest}", any(route_not_found))
}

/// Full application: routes, CORS, request tracing and an optional static
/// asset fallback for the browser UI.
pub fn router(service: SharedService, static_dir: Option<&Path>) -> Router {
    let app = routes().with_state(service);
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(route_not_found),
    };

    app.layer(CorsLayer::very_permissive()).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{SqliteTaskStore, TaskService};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let service = Arc::new(TaskService::new(SqliteTaskStore::open_in_memory().unwrap()));
        router(service, None)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn create(app: &Router, title: &str, status: &str) -> i64 {
        let (code, body) =
            send(app, Method::POST, "/api/tasks", Some(json!({"title": title, "status": status}))).await;
        assert_eq!(code, StatusCode::CREATED);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_created_envelope() {
        let app = app();
        let (code, body) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"title": "Fix login bug", "priority": " HIGH "})),
        )
        .await;

        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["title"], "Fix login bug");
        assert_eq!(body["data"]["status"], "todo");
        assert_eq!(body["data"]["priority"], "high");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_invalid_input_is_bad_request() {
        let app = app();
        let (code, body) = send(&app, Method::POST, "/api/tasks", Some(json!({"title": ""}))).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("title"));

        let (code, body) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"title": "Valid Title", "status": "bogus"})),
        )
        .await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("status"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert!(!body.error.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let app = app();
        let first = create(&app, "First todo", "todo").await;
        create(&app, "Doing task", "doing").await;
        let second = create(&app, "Second todo", "todo").await;

        let (code, body) = send(&app, Method::GET, "/api/tasks?status=TODO", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["count"], 2);
        let ids: Vec<i64> = body["data"].as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![second, first]);

        let (_, body) = send(&app, Method::GET, "/api/tasks?status=&priority=", None).await;
        assert_eq!(body["count"], 3);

        let (code, body) = send(&app, Method::GET, "/api/tasks?priority=urgent", None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_stats_route_is_not_an_id() {
        let app = app();
        let (code, body) = send(&app, Method::GET, "/api/tasks/stats", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"], json!({}));

        create(&app, "Todo one", "todo").await;
        create(&app, "Todo two", "todo").await;
        create(&app, "Done one", "done").await;

        let (_, body) = send(&app, Method::GET, "/api/tasks/stats", None).await;
        assert_eq!(body["data"], json!({"todo": 2, "done": 1}));
    }

    #[tokio::test]
    async fn test_get_update_delete_lifecycle() {
        let app = app();
        let id = create(&app, "Lifecycle task", "todo").await;
        let uri = format!("/api/tasks/{id}");

        let (code, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);

        let (code, body) =
            send(&app, Method::PUT, &uri, Some(json!({"title": "Renamed task", "priority": "low"}))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Renamed task");
        assert_eq!(body["data"]["priority"], "low");
        assert_eq!(body["data"]["status"], "todo");

        let (code, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("nothing to update"));

        let (code, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("data").is_none());

        let (code, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (code, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let app = app();
        for (method, uri) in [
            (Method::GET, "/api/tasks/abc"),
            (Method::PUT, "/api/tasks/abc"),
            (Method::DELETE, "/api/tasks/abc"),
            (Method::PATCH, "/api/tasks/abc/next-status"),
        ] {
            let (code, body) = send(&app, method, uri, None).await;
            assert_eq!(code, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("invalid task id"));
        }
    }

    #[tokio::test]
    async fn test_stats_path_rejected_as_id_for_writes() {
        let app = app();
        for method in [Method::PUT, Method::DELETE] {
            let (code, body) = send(&app, method, "/api/tasks/stats", Some(json!({}))).await;
            assert_eq!(code, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().contains("invalid task id"));
        }
    }

    #[tokio::test]
    async fn test_unknown_routes_use_error_envelope() {
        let app = app();
        for uri in ["/api/nope", "/api/tasks/1/archive", "/elsewhere"] {
            let (code, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(code, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().contains(uri));
        }

        let (code, body) = send(&app, Method::POST, "/api/tasks/1", Some(json!({}))).await;
        assert_eq!(code, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_next_status_walks_board() {
        let app = app();
        let id = create(&app, "Walk the board", "todo").await;
        let uri = format!("/api/tasks/{id}/next-status");

        let (_, body) = send(&app, Method::PATCH, &uri, None).await;
        assert_eq!(body["data"]["status"], "doing");
        let (_, body) = send(&app, Method::PATCH, &uri, None).await;
        assert_eq!(body["data"]["status"], "done");

        let (code, body) = send(&app, Method::PATCH, &uri, None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("already complete"));

        let (code, _) = send(&app, Method::PATCH, "/api/tasks/999/next-status", None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_mirrors_origin() {
        let app = app();
        let request = Request::builder()
            .uri("/api/tasks")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_static_dir_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>board</h1>").unwrap();
        let service = Arc::new(TaskService::new(SqliteTaskStore::open_in_memory().unwrap()));
        let app = router(service, Some(dir.path()));

        let request = Request::builder().uri("/index.html").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>board</h1>");
    }
}
