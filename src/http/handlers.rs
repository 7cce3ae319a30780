//! Request handlers for the task API.
//!
//! Service calls are synchronous, so each one runs on the blocking pool.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::error;

use crate::error::{Error, ErrorKind};
use crate::http::types::{DataResponse, ErrorResponse, ListQuery, ListResponse, MessageResponse};
use crate::tasks::{
    SqliteTaskStore, Status, Task, TaskFields, TaskFilter, TaskId, TaskPatch, TaskService,
};

/// Service shared by all requests.
pub type SharedService = Arc<TaskService<SqliteTaskStore>>;

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Error from the task service.
    #[error(transparent)]
    Task(#[from] Error),

    /// The `{id}` path segment is not an integer.
    #[error("invalid task id: '{0}'")]
    InvalidId(String),

    /// The body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// No route matches the request path.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// The path exists but does not accept this method.
    #[error("method {0} not allowed on {1}")]
    MethodNotAllowed(Method, String),

    /// The blocking worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    Join(#[from] JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Task(err) => match err.kind() {
                ErrorKind::InvalidInput | ErrorKind::InvalidState => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Internal => {
                    error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
                }
            },
            Self::InvalidId(_) | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::RouteNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::MethodNotAllowed(..) => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            Self::Join(err) => {
                error!(error = %err, "blocking task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorResponse { success: false, error: message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn run_blocking<T, F>(service: &SharedService, op: F) -> ApiResult<T>
where
    F: FnOnce(&TaskService<SqliteTaskStore>) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);
    Ok(tokio::task::spawn_blocking(move || op(&service)).await??)
}

fn parse_id(raw: &str) -> ApiResult<TaskId> {
    raw.trim().parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}

/// GET /api/tasks
pub async fn list_tasks(
    State(service): State<SharedService>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ListResponse<Task>>> {
    let Query(query) = query?;
    let filter = TaskFilter::parse(query.status.as_deref(), query.priority.as_deref())?;

    let tasks = run_blocking(&service, move |s| s.list_tasks(&filter)).await?;
    Ok(Json(ListResponse::new(tasks)))
}

/// GET /api/tasks/stats
pub async fn task_stats(
    State(service): State<SharedService>,
) -> ApiResult<Json<DataResponse<BTreeMap<Status, u64>>>> {
    let stats = run_blocking(&service, |s| s.get_statistics()).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let id = parse_id(&id)?;
    let task = run_blocking(&service, move |s| s.get_task(id)).await?;
    Ok(Json(DataResponse::new(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(service): State<SharedService>,
    body: Result<Json<TaskFields>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    let Json(fields) = body?;
    let task = run_blocking(&service, move |s| s.create_task(fields)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::with_message(task, "Task created successfully"))))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let id = parse_id(&id)?;
    let Json(patch) = body?;
    let task = run_blocking(&service, move |s| s.update_task(id, patch)).await?;
    Ok(Json(DataResponse::with_message(task, "Task updated successfully")))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    run_blocking(&service, move |s| s.delete_task(id)).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// PATCH /api/tasks/{id}/next-status
pub async fn advance_status(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Task>>> {
    let id = parse_id(&id)?;
    let task = run_blocking(&service, move |s| s.advance_status(id)).await?;
    Ok(Json(DataResponse::with_message(task, "Task status changed successfully")))
}

/// PUT and DELETE on /api/tasks/stats: `stats` is not a task id.
pub async fn stats_as_id() -> ApiError {
    ApiError::InvalidId("stats".to_string())
}

/// Any path with no matching route.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// A known path with a method it does not serve.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(method, uri.path().to_string())
}
