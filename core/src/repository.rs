//! Data-access layer: the five todo operations as store round trips.
//!
//! # Design
//! `TodoRepository` owns a `StoreClient` for building requests and an
//! injected `Transport` for executing them. It keeps no copy of any row
//! between calls. "Not found" is a normal result (`None` / `false`); only
//! store failures are errors, and they are returned as-is without retries.

use std::sync::Arc;

use tracing::debug;

use crate::error::StoreError;
use crate::http::{HttpRequest, Transport};
use crate::store::StoreClient;
use crate::types::{Todo, TodoCreate, TodoUpdate};

#[derive(Clone)]
pub struct TodoRepository {
    client: StoreClient,
    transport: Arc<dyn Transport>,
}

impl TodoRepository {
    pub fn new(client: StoreClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    /// Every todo, newest `created_at` first.
    pub fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        self.round_trip(self.client.build_select_all())
    }

    /// The row with this id. If the store returns several, the first wins.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let rows = self.round_trip(self.client.build_select_by_id(id))?;
        Ok(rows.into_iter().next())
    }

    pub fn create(&self, input: &TodoCreate) -> Result<Todo, StoreError> {
        let rows = self.round_trip(self.client.build_insert(input)?)?;
        rows.into_iter().next().ok_or(StoreError::MissingRow)
    }

    /// Apply only the fields set in `patch`. An empty patch is answered with
    /// `None` without contacting the store.
    pub fn update(&self, id: i64, patch: &TodoUpdate) -> Result<Option<Todo>, StoreError> {
        if patch.is_empty() {
            debug!(id, "empty patch, skipping store update");
            return Ok(None);
        }
        let rows = self.round_trip(self.client.build_update(id, patch)?)?;
        Ok(rows.into_iter().next())
    }

    /// Hard delete. Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let rows = self.round_trip(self.client.build_delete(id))?;
        Ok(!rows.is_empty())
    }

    fn round_trip(&self, request: HttpRequest) -> Result<Vec<Todo>, StoreError> {
        let method = request.method.as_str();
        debug!(method, path = %request.path, "store request");
        let response = self.transport.execute(request)?;
        debug!(method, status = response.status, "store response");
        self.client.parse_rows(response)
    }
}

impl std::fmt::Debug for TodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoRepository")
            .field("endpoint", &self.client.endpoint())
            .finish_non_exhaustive()
    }
}
