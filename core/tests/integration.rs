//! Store and API lifecycle tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives the real
//! `UreqTransport`, so request building, HTTP execution and response parsing
//! are exercised end to end.

use items_core::{
    ApiError, ClientConfig, ItemDraft, ItemFields, ItemStore, ItemsApi, StoreError, UreqTransport,
};

/// Start the mock server on a background thread and return its base URL.
fn spawn_server() -> String {
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
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn store(base_url: &str) -> ItemStore<UreqTransport> {
    ItemStore::new(&ClientConfig::new(base_url), UreqTransport::new())
}

#[test]
fn api_crud_lifecycle() {
    let base = spawn_server();
    let api = ItemsApi::new(&ClientConfig::new(&base), UreqTransport::new());

    assert!(api.list().unwrap().is_empty(), "expected empty list");

    let created = api.create(&ItemDraft::new("Integration test", "via ureq")).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.description, "via ureq");
    assert!(!created.completed);

    let listed = api.list().unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let fields = ItemFields {
        title: "Updated title".to_string(),
        description: String::new(),
        completed: true,
    };
    let updated = api.update(created.id, &fields).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Updated title");
    assert!(updated.completed);

    api.delete(created.id).unwrap();
    assert!(api.list().unwrap().is_empty(), "expected empty list after delete");

    let err = api.delete(created.id).unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: 404, .. }));
}

#[test]
fn strict_delete_ack_matches_server_message() {
    let base = spawn_server();
    let config = ClientConfig::new(&base).with_delete_ack(mock_server::DELETE_ACK);
    let api = ItemsApi::new(&config, UreqTransport::new());
    let created = api.create(&ItemDraft::new("Ack", "")).unwrap();
    api.delete(created.id).unwrap();

    let strict_other = ClientConfig::new(&base).with_delete_ack("Record removed");
    let api = ItemsApi::new(&strict_other, UreqTransport::new());
    let created = api.create(&ItemDraft::new("Ack again", "")).unwrap();
    let err = api.delete(created.id).unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedResponse(_)));
}

#[test]
fn add_then_load_round_trip() {
    let base = spawn_server();
    let mut s = store(&base);
    s.load().unwrap();
    assert!(s.items().is_empty());

    s.set_draft("Buy milk", "2 litres");
    s.add().unwrap();
    let id = s.items()[0].id;

    let mut fresh = store(&base);
    fresh.load().unwrap();
    let item = fresh.get(id).expect("created item present after load");
    assert_eq!(item.title, "Buy milk");
    assert_eq!(item.description, "2 litres");
    assert!(!item.completed);
}

#[test]
fn toggle_edit_remove_against_server() {
    let base = spawn_server();
    let mut s = store(&base);
    s.set_draft("Walk dog", "park");
    s.add().unwrap();
    let id = s.items()[0].id;

    s.toggle_completed(id, true).unwrap();
    assert!(s.get(id).unwrap().completed);

    s.edit(
        id,
        ItemFields {
            title: "Walk cat".to_string(),
            description: "garden".to_string(),
            completed: false,
        },
    )
    .unwrap();
    let item = s.get(id).unwrap();
    assert_eq!(item.title, "Walk cat");
    assert!(item.completed, "edit must not change completion state");

    s.load().unwrap();
    assert!(s.get(id).unwrap().completed);

    s.remove(id).unwrap();
    assert!(s.items().is_empty());
    assert!(!s.is_busy());
    assert!(s.error().is_none());
}

#[test]
fn server_side_failures_leave_local_state_intact() {
    let base = spawn_server();
    let mut s = store(&base);
    s.set_draft("Keep me", "");
    s.add().unwrap();
    let id = s.items()[0].id;

    // Delete the item behind the store's back so later calls get 404.
    ItemsApi::new(&ClientConfig::new(&base), UreqTransport::new())
        .delete(id)
        .unwrap();

    assert!(s.toggle_completed(id, true).is_err());
    assert!(!s.get(id).unwrap().completed, "toggle must roll back");

    assert!(s.remove(id).is_err());
    assert_eq!(s.items().len(), 1, "failed delete must not remove locally");
    assert_eq!(s.error(), Some("Failed to delete item"));
}

#[test]
fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut s = store(&format!("http://{addr}"));
    let err = s.load().unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiError::Network(_))));
    assert_eq!(s.error(), Some("Failed to fetch items"));
}
