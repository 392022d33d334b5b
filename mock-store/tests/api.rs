use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_store::{app, router, Db};
use serde_json::Value;
use tower::ServiceExt;

const ENDPOINT: &str = "/rest/v1/todos";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: Option<&str>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("apikey", "test-key")
        .header("prefer", "return=representation");
    if body.is_some() {
        builder = builder.header(http::header::CONTENT_TYPE, "application/json");
    }
    builder.body(body.unwrap_or_default().to_string()).unwrap()
}

// --- select ---

#[tokio::test]
async fn select_on_empty_table() {
    let resp = app()
        .oneshot(request("GET", &format!("{ENDPOINT}?select=*"), None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri(ENDPOINT).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_table_returns_404() {
    let resp = app()
        .oneshot(request("GET", "/rest/v1/notes", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "42P01");
}

// --- insert ---

#[tokio::test]
async fn insert_returns_stored_row() {
    let resp = app()
        .oneshot(request("POST", ENDPOINT, Some(r#"{"title":"Buy milk"}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["title"], "Buy milk");
    assert_eq!(rows[0]["completed"], false);
    assert!(rows[0]["description"].is_null());
    assert!(rows[0]["created_at"].is_string());
}

#[tokio::test]
async fn insert_without_title_violates_not_null() {
    let db = Db::default();
    let resp = router(db.clone())
        .oneshot(request("POST", ENDPOINT, Some(r#"{"completed":true}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "23502");
    assert!(db.read().await.is_empty());
}

#[tokio::test]
async fn insert_without_representation_has_no_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(ENDPOINT)
                .header("apikey", "test-key")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(r#"{"title":"quiet"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(body_bytes(resp).await.is_empty());
}

// --- full lifecycle ---

#[tokio::test]
async fn table_lifecycle() {
    let db = Db::default();

    for title in ["first", "second"] {
        let resp = router(db.clone())
            .oneshot(request("POST", ENDPOINT, Some(&format!(r#"{{"title":"{title}"}}"#))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // newest first
    let resp = router(db.clone())
        .oneshot(request(
            "GET",
            &format!("{ENDPOINT}?select=id,title&order=created_at.desc"),
            None,
        ))
        .await
        .unwrap();
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "second");
    assert_eq!(rows[1]["title"], "first");
    assert!(rows[0].get("completed").is_none());

    // patch only completed
    let resp = router(db.clone())
        .oneshot(request("PATCH", &format!("{ENDPOINT}?id=eq.1"), Some(r#"{"completed":true}"#)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows[0]["title"], "first");
    assert_eq!(rows[0]["completed"], true);

    // patch a missing id touches nothing
    let resp = router(db.clone())
        .oneshot(request("PATCH", &format!("{ENDPOINT}?id=eq.-1"), Some(r#"{"completed":true}"#)))
        .await
        .unwrap();
    let rows: Vec<Value> = body_json(resp).await;
    assert!(rows.is_empty());

    // delete returns the removed row, then nothing
    for expected in [1, 0] {
        let resp = router(db.clone())
            .oneshot(request("DELETE", &format!("{ENDPOINT}?id=eq.1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let rows: Vec<Value> = body_json(resp).await;
        assert_eq!(rows.len(), expected);
    }

    assert_eq!(db.read().await.len(), 1);
}
