//! In-memory stand-in for the hosted table-store's REST endpoint.
//!
//! Serves the PostgREST subset the todo service relies on for the `todos`
//! table: `select`, `order`, `limit` and `<column>=eq.<value>` filters on
//! `GET`/`PATCH`/`DELETE`, inserts via `POST`, and `Prefer:
//! return=representation`. Every request must carry an `apikey` header.

use std::{cmp::Ordering, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const TABLE: &str = "todos";

const COLUMNS: [&str; 5] = ["id", "title", "description", "completed", "created_at"];
const WRITABLE: [&str; 3] = ["title", "description", "completed"];

#[derive(Clone, Debug)]
struct Row {
    seq: u64,
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Row {
    fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("title".into(), json!(self.title));
        map.insert("description".into(), json!(self.description));
        map.insert("completed".into(), json!(self.completed));
        map.insert(
            "created_at".into(),
            json!(self.created_at.to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        map
    }

    fn apply(&mut self, values: &Map<String, Value>) -> Result<(), Rejection> {
        for (column, value) in values {
            if !WRITABLE.contains(&column.as_str()) {
                return Err(Rejection::unknown_column(column));
            }
            match (column.as_str(), value) {
                ("title", Value::String(s)) => self.title = s.clone(),
                ("description", Value::String(s)) => self.description = Some(s.clone()),
                ("description", Value::Null) => self.description = None,
                ("completed", Value::Bool(b)) => self.completed = *b,
                (_, Value::Null) => return Err(Rejection::not_null(column)),
                _ => return Err(Rejection::bad_value(column, value)),
            }
        }
        Ok(())
    }

    fn matches(&self, filters: &[(String, String)]) -> bool {
        let json = self.to_json();
        filters.iter().all(|(column, expected)| match json.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(other) => other.to_string() == *expected,
            None => false,
        })
    }

    fn compare(&self, other: &Row, column: &str) -> Ordering {
        match column {
            "id" => self.id.cmp(&other.id),
            "title" => self.title.cmp(&other.title),
            "description" => self.description.cmp(&other.description),
            "completed" => self.completed.cmp(&other.completed),
            _ => self.created_at.cmp(&other.created_at),
        }
        .then(self.seq.cmp(&other.seq))
    }
}

/// Rows of the single `todos` table plus its identity sequence.
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Row>,
    last_id: i64,
    last_seq: u64,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn new_row(&mut self, values: &Map<String, Value>) -> Result<Row, Rejection> {
        let title = match values.get("title") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => return Err(Rejection::not_null("title")),
            Some(other) => return Err(Rejection::bad_value("title", other)),
        };
        self.last_id += 1;
        self.last_seq += 1;
        let mut row = Row {
            seq: self.last_seq,
            id: self.last_id,
            title,
            description: None,
            completed: false,
            created_at: Utc::now(),
        };
        row.apply(values)?;
        Ok(row)
    }
}

pub type Db = Arc<RwLock<Table>>;

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing table, so tests can inspect it afterwards.
pub fn router(db: Db) -> Router {
    Router::new()
        .route(
            "/rest/v1/{table}",
            get(select_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// A PostgREST-shaped error body.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rejection {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn not_null(column: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "23502",
            format!("null value in column \"{column}\" of relation \"{TABLE}\" violates not-null constraint"),
        )
    }

    fn bad_value(column: &str, value: &Value) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "22P02",
            format!("invalid input syntax for column \"{column}\": {value}"),
        )
    }

    fn unknown_column(column: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "PGRST204",
            format!("Could not find the '{column}' column of '{TABLE}' in the schema cache"),
        )
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code,
            "message": self.message,
            "details": null,
            "hint": null,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Query-string options understood by the endpoint.
#[derive(Debug, Default, PartialEq)]
struct Params {
    select: Option<Vec<String>>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
    filters: Vec<(String, String)>,
}

impl Params {
    fn parse(query: &[(String, String)]) -> Result<Self, Rejection> {
        let mut params = Params::default();
        for (key, value) in query {
            match key.as_str() {
                "select" if value == "*" => params.select = None,
                "select" => {
                    let columns: Vec<String> = value.split(',').map(|c| c.trim().to_string()).collect();
                    for column in &columns {
                        known_column(column)?;
                    }
                    params.select = Some(columns);
                }
                "order" => {
                    let (column, descending) = match value.rsplit_once('.') {
                        Some((column, "desc")) => (column, true),
                        Some((column, "asc")) => (column, false),
                        _ => (value.as_str(), false),
                    };
                    known_column(column)?;
                    params.order = Some((column.to_string(), descending));
                }
                "limit" => {
                    let limit = value
                        .parse()
                        .map_err(|_| Rejection::new(StatusCode::BAD_REQUEST, "PGRST102", "invalid limit"))?;
                    params.limit = Some(limit);
                }
                column => {
                    known_column(column)?;
                    let expected = value.strip_prefix("eq.").ok_or_else(|| {
                        Rejection::new(
                            StatusCode::BAD_REQUEST,
                            "PGRST100",
                            format!("unsupported filter \"{value}\" on \"{column}\""),
                        )
                    })?;
                    if column == "id" && expected.parse::<i64>().is_err() {
                        return Err(Rejection::new(
                            StatusCode::BAD_REQUEST,
                            "22P02",
                            format!("invalid input syntax for type bigint: \"{expected}\""),
                        ));
                    }
                    params.filters.push((column.to_string(), expected.to_string()));
                }
            }
        }
        Ok(params)
    }

    fn project(&self, row: &Row) -> Value {
        let full = row.to_json();
        match &self.select {
            None => Value::Object(full),
            Some(columns) => Value::Object(
                columns
                    .iter()
                    .filter_map(|c| full.get(c).map(|v| (c.clone(), v.clone())))
                    .collect(),
            ),
        }
    }
}

fn known_column(column: &str) -> Result<(), Rejection> {
    if COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(Rejection::new(
            StatusCode::BAD_REQUEST,
            "42703",
            format!("column {TABLE}.{column} does not exist"),
        ))
    }
}

fn check_request(headers: &HeaderMap, table: &str) -> Result<(), Rejection> {
    if !headers.contains_key("apikey") {
        return Err(Rejection::new(
            StatusCode::UNAUTHORIZED,
            "PGRST301",
            "No API key found in request",
        ));
    }
    if table != TABLE {
        return Err(Rejection::new(
            StatusCode::NOT_FOUND,
            "42P01",
            format!("relation \"public.{table}\" does not exist"),
        ));
    }
    Ok(())
}

fn wants_representation(headers: &HeaderMap) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("return=representation"))
}

fn rows_response(status: StatusCode, params: &Params, rows: &[Row], representation: bool) -> Response {
    if !representation {
        return match status {
            StatusCode::CREATED => status.into_response(),
            _ => StatusCode::NO_CONTENT.into_response(),
        };
    }
    let body: Vec<Value> = rows.iter().map(|row| params.project(row)).collect();
    (status, Json(body)).into_response()
}

async fn select_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, Rejection> {
    check_request(&headers, &table)?;
    let params = Params::parse(&query)?;

    let table = db.read().await;
    let mut rows: Vec<Row> = table.rows.iter().filter(|r| r.matches(&params.filters)).cloned().collect();
    if let Some((column, descending)) = &params.order {
        rows.sort_by(|a, b| {
            let ord = a.compare(b, column);
            if *descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
    if let Some(limit) = params.limit {
        rows.truncate(limit);
    }
    Ok(rows_response(StatusCode::OK, &params, &rows, true))
}

async fn insert_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    check_request(&headers, &table)?;
    let params = Params::parse(&query)?;

    let objects = match body {
        Value::Object(map) => vec![map],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(Rejection::new(
                    StatusCode::BAD_REQUEST,
                    "PGRST102",
                    format!("expected a JSON object, got {other}"),
                )),
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(Rejection::new(
                StatusCode::BAD_REQUEST,
                "PGRST102",
                format!("expected a JSON object, got {other}"),
            ))
        }
    };

    let mut table = db.write().await;
    let mut inserted = Vec::with_capacity(objects.len());
    for object in &objects {
        inserted.push(table.new_row(object)?);
    }
    table.rows.extend(inserted.iter().cloned());
    tracing::debug!(count = inserted.len(), "inserted rows");
    Ok(rows_response(StatusCode::CREATED, &params, &inserted, wants_representation(&headers)))
}

async fn update_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Response, Rejection> {
    check_request(&headers, &table)?;
    let params = Params::parse(&query)?;

    let mut table = db.write().await;
    let mut updated = Vec::new();
    for row in table.rows.iter().filter(|r| r.matches(&params.filters)) {
        let mut next = row.clone();
        next.apply(&body)?;
        updated.push(next);
    }
    for next in &updated {
        if let Some(row) = table.rows.iter_mut().find(|r| r.seq == next.seq) {
            *row = next.clone();
        }
    }
    Ok(rows_response(StatusCode::OK, &params, &updated, wants_representation(&headers)))
}

async fn delete_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, Rejection> {
    check_request(&headers, &table)?;
    let params = Params::parse(&query)?;

    let mut table = db.write().await;
    let (removed, kept): (Vec<Row>, Vec<Row>) =
        table.rows.drain(..).partition(|r| r.matches(&params.filters));
    table.rows = kept;
    Ok(rows_response(StatusCode::OK, &params, &removed, wants_representation(&headers)))
}
