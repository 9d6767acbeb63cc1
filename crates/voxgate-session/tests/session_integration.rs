#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;
use uuid::Uuid;
use voxgate_core::Role;
use voxgate_session::{CallSession, InMemorySessionStore, SessionStore};

fn seeded() -> CallSession {
    CallSession::seeded("You are a temple phone assistant.", "Hello, how can I help?")
}

#[tokio::test]
async fn test_put_and_get_session() {
    let store = InMemorySessionStore::new();
    let session = seeded();
    let id = session.id;

    store.put(&session).await.unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.transcript.len(), 2);
}

#[tokio::test]
async fn test_get_nonexistent_returns_none() {
    let store = InMemorySessionStore::new();
    let result = store.get(Uuid::new_v4()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_put_replaces_previous_state() {
    let store = InMemorySessionStore::new();
    let mut session = seeded();
    let id = session.id;
    store.put(&session).await.unwrap();

    session.add_user_turn("Is the temple open on Monday?");
    session.add_assistant_turn("Yes, from 9 AM to 8 PM.");
    session.record_escalation();
    store.put(&session).await.unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.transcript.len(), 4);
    assert_eq!(loaded.transcript[2].role, Role::User);
    assert_eq!(loaded.escalation_attempts, 1);
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn test_delete_session() {
    let store = InMemorySessionStore::new();
    let session = seeded().with_call_sid("CA123");
    let id = session.id;
    store.put(&session).await.unwrap();

    store.delete(id).await.unwrap();
    assert!(store.get(id).await.unwrap().is_none());
    assert!(store.find_by_call_sid("CA123").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_nonexistent_is_ok() {
    let store = InMemorySessionStore::new();
    store.delete(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn test_find_by_call_sid() {
    let store = InMemorySessionStore::new();
    let session = seeded().with_call_sid("CAabc");
    store.put(&session).await.unwrap();

    assert_eq!(
        store.find_by_call_sid("CAabc").await.unwrap(),
        Some(session.id)
    );
    assert!(store.find_by_call_sid("CAother").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let store = InMemorySessionStore::new();
    let mut a = seeded();
    let b = seeded();
    store.put(&a).await.unwrap();
    store.put(&b).await.unwrap();

    a.add_user_turn("only in a");
    store.put(&a).await.unwrap();

    assert_eq!(store.get(a.id).await.unwrap().unwrap().transcript.len(), 3);
    assert_eq!(store.get(b.id).await.unwrap().unwrap().transcript.len(), 2);
}

#[tokio::test]
async fn test_purge_expired_keeps_fresh_sessions() {
    let store = InMemorySessionStore::new();
    let session = seeded();
    store.put(&session).await.unwrap();

    let purged = store.purge_expired(Duration::from_secs(60)).await.unwrap();
    assert!(purged.is_empty());
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn test_purge_expired_drops_idle_sessions() {
    let store = InMemorySessionStore::new();
    let session = seeded().with_call_sid("CAidle");
    let id = session.id;
    store.put(&session).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let purged = store.purge_expired(Duration::from_millis(1)).await.unwrap();

    assert_eq!(purged, vec![id]);
    assert_eq!(store.count().await, 0);
    assert!(store.find_by_call_sid("CAidle").await.unwrap().is_none());
}
