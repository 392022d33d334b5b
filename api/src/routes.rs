//! `/todos` handlers.
//!
//! Bodies and path ids are parsed and validated by the extractors below
//! before a handler runs, so malformed input never reaches the repository.
//! Store round trips block, and run on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request, State},
    http::request::Parts,
    Json,
};
use serde::Serialize;
use todo_core::{StoreError, Todo, TodoCreate, TodoRepository, TodoUpdate, Validate};

use crate::error::ApiError;

pub type AppState = Arc<TodoRepository>;

pub const DELETED_MESSAGE: &str = "Todo deleted successfully";

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// JSON body that deserialized and passed `Validate`. Every rejection is a
/// 422 carrying the parser's message.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Integer `{id}` path segment.
pub struct TodoId(pub i64);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(TodoId(id))
    }
}

/// Run one repository call on the blocking pool.
async fn with_store<T, F>(repo: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&TodoRepository) -> Result<T, StoreError> + Send + 'static,
{
    let repo = Arc::clone(repo);
    Ok(tokio::task::spawn_blocking(move || op(&repo)).await??)
}

pub async fn list_todos(State(repo): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = with_store(&repo, |r| r.list_all()).await?;
    Ok(Json(todos))
}

pub async fn get_todo(State(repo): State<AppState>, TodoId(id): TodoId) -> Result<Json<Todo>, ApiError> {
    with_store(&repo, move |r| r.get_by_id(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn create_todo(
    State(repo): State<AppState>,
    ValidJson(input): ValidJson<TodoCreate>,
) -> Result<Json<Todo>, ApiError> {
    let todo = with_store(&repo, move |r| r.create(&input)).await?;
    tracing::info!(id = todo.id, "todo created");
    Ok(Json(todo))
}

pub async fn update_todo(
    State(repo): State<AppState>,
    TodoId(id): TodoId,
    ValidJson(patch): ValidJson<TodoUpdate>,
) -> Result<Json<Todo>, ApiError> {
    with_store(&repo, move |r| r.update(id, &patch))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_todo(State(repo): State<AppState>, TodoId(id): TodoId) -> Result<Json<Message>, ApiError> {
    if !with_store(&repo, move |r| r.delete(id)).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id, "todo deleted");
    Ok(Json(Message {
        message: DELETED_MESSAGE,
    }))
}
