use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use shopify_sessions_seaorm_store::{Session, SessionStorage, SqlSessionStorage};
use time::OffsetDateTime;

// A single pooled connection keeps the in-memory database alive and shared
// across every statement in a test.
async fn memory_conn() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    Database::connect(opt)
        .await
        .expect("connect in-memory sqlite")
}

async fn memory_store() -> SqlSessionStorage {
    let store = SqlSessionStorage::new(memory_conn().await);
    store.migrate().await.expect("run migrations");
    store
}

fn offline_session(id: &str, shop: &str) -> Session {
    Session::new(id, shop, false)
}

fn online_session(id: &str, shop: &str) -> Session {
    let mut session = Session::new(id, shop, true);
    session.state = Some("nonce-1337".into());
    session.scope = Some("read_products,write_products".into());
    session.access_token = Some("shpat_0123456789abcdef".into());
    session.expires = Some(OffsetDateTime::from_unix_timestamp(1_767_225_600).expect("timestamp"));
    session.online_access_info = Some(json!({
        "expires_in": 86_399,
        "associated_user_scope": "read_products",
        "associated_user": { "id": 902_541_635, "email": "owner@store.example" }
    }));
    session
}

#[tokio::test]
async fn store_then_load_round_trips_every_field() {
    let store = memory_store().await;
    let session = online_session("sess-online", "store.myshopify.com");

    assert!(store.store_session(&session).await);
    let loaded = store
        .load_session("sess-online")
        .await
        .expect("session present");
    assert_eq!(loaded, session);
}

#[tokio::test]
async fn offline_session_round_trips_with_null_fields() {
    let store = memory_store().await;
    let session = offline_session("sess1", "store.myshopify.com");

    assert!(store.store_session(&session).await);
    let loaded = store.load_session("sess1").await.expect("session present");
    assert!(!loaded.is_online);
    assert_eq!(loaded.expires, None);
    assert_eq!(loaded.state, None);
    assert_eq!(loaded.scope, None);
    assert_eq!(loaded.access_token, None);
    assert_eq!(loaded.online_access_info, None);
}

#[tokio::test]
async fn store_is_an_upsert_keyed_by_id() {
    let store = memory_store().await;
    let mut session = online_session("sess-upsert", "store.myshopify.com");
    assert!(store.store_session(&session).await);

    session.access_token = Some("shpat_rotated".into());
    session.scope = Some("read_orders".into());
    assert!(store.store_session(&session).await);

    let loaded = store
        .load_session("sess-upsert")
        .await
        .expect("session present");
    assert_eq!(loaded.access_token.as_deref(), Some("shpat_rotated"));
    assert_eq!(loaded.scope.as_deref(), Some("read_orders"));

    // Replaced, not duplicated.
    let sessions = store.find_sessions_by_shop("store.myshopify.com").await;
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn load_of_unknown_id_is_none() {
    let store = memory_store().await;
    assert_eq!(store.load_session("never-stored").await, None);
}

#[tokio::test]
async fn delete_is_idempotent_and_leaves_nothing_behind() {
    let store = memory_store().await;
    let session = offline_session("sess-del", "store.myshopify.com");
    assert!(store.store_session(&session).await);

    assert!(store.delete_session("sess-del").await);
    assert_eq!(store.load_session("sess-del").await, None);

    // Deleting again, or deleting an id that never existed, is still success.
    assert!(store.delete_session("sess-del").await);
    assert!(store.delete_session("never-stored").await);
}

#[tokio::test]
async fn delete_sessions_removes_every_listed_id() {
    let store = memory_store().await;
    for id in ["bulk-a", "bulk-b", "bulk-c"] {
        assert!(store.store_session(&offline_session(id, "bulk.myshopify.com")).await);
    }

    assert!(
        store
            .delete_sessions(&["bulk-a".into(), "bulk-b".into()])
            .await
    );
    assert_eq!(store.load_session("bulk-a").await, None);
    assert_eq!(store.load_session("bulk-b").await, None);
    assert!(store.load_session("bulk-c").await.is_some());
}

#[tokio::test]
async fn find_sessions_by_shop_returns_only_matching_rows() {
    let store = memory_store().await;
    assert!(store.store_session(&online_session("a-1", "a.myshopify.com")).await);
    assert!(store.store_session(&offline_session("a-2", "a.myshopify.com")).await);
    assert!(store.store_session(&offline_session("b-1", "b.myshopify.com")).await);

    let mut found = store.find_sessions_by_shop("a.myshopify.com").await;
    found.sort_by(|left, right| left.id.cmp(&right.id));
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, "a-1");
    assert_eq!(found[1].id, "a-2");

    assert!(store.find_sessions_by_shop("unknown.myshopify.com").await.is_empty());
}

#[tokio::test]
async fn backend_failure_degrades_to_safe_defaults() {
    // No migration: the shopify_sessions table does not exist, so every
    // operation hits a backend error.
    let store = SqlSessionStorage::new(memory_conn().await);
    let session = offline_session("sess-x", "store.myshopify.com");

    assert!(!store.store_session(&session).await);
    assert_eq!(store.load_session("sess-x").await, None);
    assert!(store.find_sessions_by_shop("store.myshopify.com").await.is_empty());

    // The typed core still surfaces the error for callers that want it.
    assert!(store.try_load("sess-x").await.is_err());
}

#[tokio::test]
async fn ensure_table_creates_the_schema_without_the_migrator() {
    let store = SqlSessionStorage::new(memory_conn().await);

    store.ensure_table().await.expect("create table");
    store.ensure_table().await.expect("idempotent");

    let session = online_session("sess-plain", "plain.myshopify.com");
    assert!(store.store_session(&session).await);
    assert_eq!(
        store.load_session("sess-plain").await.expect("present"),
        session
    );
}
