//! HTTP surface of the todo service.
//!
//! # Overview
//! An axum router over `/todos` that forwards each call to a
//! `TodoRepository`. The repository's store client is injected by the caller,
//! which keeps the router testable against any table-store endpoint.

pub mod error;
pub mod routes;
pub mod transport;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use todo_core::TodoRepository;

pub use error::ApiError;
pub use transport::UreqTransport;

pub fn app(repo: TodoRepository) -> Router {
    use routes::*;

    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).patch(update_todo).delete(delete_todo))
        .with_state(Arc::new(repo))
}

pub async fn run(listener: TcpListener, repo: TodoRepository) -> Result<(), std::io::Error> {
    axum::serve(listener, app(repo)).await
}
