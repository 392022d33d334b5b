//! Core of the todo service: schema, table-store protocol, and data access.
//!
//! # Overview
//! Builds `HttpRequest` values for the remote `todos` table and parses the
//! `HttpResponse` values it returns without touching the network itself
//! (host-does-IO pattern). `TodoRepository` combines the request builder with
//! an injected `Transport` to expose list/get/create/update/delete.
//!
//! # Design
//! - `StoreClient` is stateless; it holds only the table endpoint and API key.
//! - Each store call is split into `build_*` (produces request) and
//!   `parse_rows` (consumes response), so the I/O boundary is explicit.
//! - Rows are decoded into the typed `Todo` at the boundary.
//! - Not-found is a value (`None` / `false`), store failures are `StoreError`.

pub mod config;
pub mod error;
pub mod http;
pub mod repository;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{ConfigError, StoreError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use repository::TodoRepository;
pub use store::StoreClient;
pub use types::{Todo, TodoCreate, TodoUpdate, Validate};
