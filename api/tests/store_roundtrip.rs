//! Repository behaviour against the live mock table-store.
//!
//! Starts the mock store on a random port, then drives `TodoRepository`
//! through the real `UreqTransport`, so request building, the HTTP round trip
//! and row parsing are exercised together.

use std::sync::Arc;

use todo_api::UreqTransport;
use todo_core::{StoreClient, StoreError, TodoCreate, TodoRepository, TodoUpdate};

fn start_store() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_store::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn repository() -> TodoRepository {
    TodoRepository::new(StoreClient::new(&start_store(), "test-key"), Arc::new(UreqTransport::new()))
}

fn create(repo: &TodoRepository, title: &str, completed: bool) -> todo_core::Todo {
    let input = TodoCreate {
        completed,
        ..TodoCreate::new(title)
    };
    repo.create(&input).unwrap()
}

#[test]
fn list_all_is_newest_first() {
    let repo = repository();
    assert!(repo.list_all().unwrap().is_empty());

    let ids: Vec<i64> = (0..4).map(|n| create(&repo, &format!("todo {n}"), false).id).collect();
    let listed = repo.list_all().unwrap();

    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    let listed_ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(listed_ids, ids.into_iter().rev().collect::<Vec<_>>());
}

#[test]
fn create_then_get_returns_equal_record() {
    let repo = repository();
    let created = repo
        .create(&TodoCreate {
            title: "Write report".to_string(),
            description: Some("quarterly".to_string()),
            completed: false,
        })
        .unwrap();

    assert_eq!(repo.get_by_id(created.id).unwrap(), Some(created));
}

#[test]
fn empty_update_leaves_record_unchanged() {
    let repo = repository();
    let created = create(&repo, "Stay put", true);

    assert_eq!(repo.update(created.id, &TodoUpdate::default()).unwrap(), None);
    assert_eq!(repo.get_by_id(created.id).unwrap(), Some(created));
}

#[test]
fn explicit_false_overwrites_completed() {
    let repo = repository();
    let created = create(&repo, "Done already", true);

    let patch = TodoUpdate {
        completed: Some(false),
        ..TodoUpdate::default()
    };
    let updated = repo.update(created.id, &patch).unwrap().unwrap();

    assert!(!updated.completed);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(repo.get_by_id(created.id).unwrap(), Some(updated));
}

#[test]
fn delete_then_get_is_absent() {
    let repo = repository();
    let created = create(&repo, "Throw away", false);

    assert!(repo.delete(created.id).unwrap());
    assert_eq!(repo.get_by_id(created.id).unwrap(), None);
    assert!(!repo.delete(created.id).unwrap());
}

#[test]
fn nonexistent_id_is_absent_not_an_error() {
    let repo = repository();
    let patch = TodoUpdate {
        title: Some("ghost".to_string()),
        ..TodoUpdate::default()
    };

    assert_eq!(repo.get_by_id(-1).unwrap(), None);
    assert_eq!(repo.update(-1, &patch).unwrap(), None);
    assert!(!repo.delete(-1).unwrap());
}

#[test]
fn unreachable_store_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = TodoRepository::new(
        StoreClient::new(&format!("http://{addr}"), "test-key"),
        Arc::new(UreqTransport::new()),
    );
    assert!(matches!(repo.list_all(), Err(StoreError::Transport(_))));
}
