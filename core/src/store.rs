//! Stateless request builder and response parser for the remote table-store.
//!
//! # Design
//! `StoreClient` holds the REST endpoint of the `todos` table and the API key,
//! and carries no mutable state between calls. Each store operation is split
//! into a `build_*` method that produces an `HttpRequest` and a shared
//! `parse_rows` that consumes the `HttpResponse`. The endpoint speaks the
//! PostgREST dialect: filters and ordering live in the query string and every
//! successful answer is a JSON array of rows.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Todo, TodoCreate, TodoUpdate};

pub const TABLE: &str = "todos";

/// Columns requested on every call. Asking for them explicitly keeps extra
/// table columns out of the decoded rows.
pub const COLUMNS: &str = "id,title,description,completed,created_at";

#[derive(Debug, Clone)]
pub struct StoreClient {
    endpoint: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            endpoint: format!("{}/rest/v1/{TABLE}", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.url, &config.key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_select_all(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "&order=created_at.desc", None, false)
    }

    pub fn build_select_by_id(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("&id=eq.{id}"), None, false)
    }

    pub fn build_insert(&self, input: &TodoCreate) -> Result<HttpRequest, StoreError> {
        let body = serde_json::to_string(input).map_err(|e| StoreError::Encode(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, "", Some(body), true))
    }

    pub fn build_update(&self, id: i64, patch: &TodoUpdate) -> Result<HttpRequest, StoreError> {
        let body = serde_json::to_string(patch).map_err(|e| StoreError::Encode(e.to_string()))?;
        Ok(self.request(HttpMethod::Patch, &format!("&id=eq.{id}"), Some(body), true))
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("&id=eq.{id}"), None, true)
    }

    /// Decode the rows of any successful store response.
    pub fn parse_rows(&self, response: HttpResponse) -> Result<Vec<Todo>, StoreError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn request(&self, method: HttpMethod, query: &str, body: Option<String>, returning: bool) -> HttpRequest {
        let mut headers = vec![
            ("apikey".to_string(), self.api_key.clone()),
            ("authorization".to_string(), format!("Bearer {}", self.api_key)),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if returning {
            headers.push(("prefer".to_string(), "return=representation".to_string()));
        }
        HttpRequest {
            method,
            path: format!("{}?select={COLUMNS}{query}", self.endpoint),
            headers,
            body,
        }
    }
}

/// Map non-success status codes to `StoreError::Rejected`.
fn check_status(response: &HttpResponse) -> Result<(), StoreError> {
    if response.is_success() {
        return Ok(());
    }
    Err(StoreError::Rejected {
        status: response.status,
        body: response.body.clone(),
    })
}
