//! Full-stack session flows against the stub backend.

use std::time::Duration;

use pasantias_core::error::ErrorKind;
use pasantias_core::events::{EntityKind, LifecycleAction};
use pasantias_core::types::{NotificationId, OfferId};
use pasantias_entity::offer::OfferStatus;
use pasantias_service::Session;

use super::helpers::{EXPIRED_TOKEN, TestServer};

#[tokio::test]
async fn test_admin_approves_offer() {
    let server = TestServer::start().await;
    let session = Session::connect(server.app_config("admin", "test-token")).unwrap();
    let mut events = session.subscribe();
    let offers = session.admin_offers().unwrap();

    offers.reload().await.unwrap();
    let snapshot = offers.snapshot().await;
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.total_pages, 2);

    let approved = offers.approve(OfferId(7)).await.unwrap();

    assert_eq!(approved.status, OfferStatus::Approved);
    assert!(approved.published_start_date.is_some());
    assert!(!offers.is_updating(OfferId(7)));
    let stored = offers.find(OfferId(7)).await.unwrap();
    assert_eq!(stored.status, OfferStatus::Approved);
    assert_eq!(stored.title, "Backend developer intern");

    let event = events.recv().await.unwrap();
    assert_eq!(event.entity, EntityKind::Offer);
    assert_eq!(event.id, 7);
    assert!(matches!(event.action, LifecycleAction::StatusChanged { .. }));
}

#[tokio::test]
async fn test_illegal_transition_sends_nothing() {
    let server = TestServer::start().await;
    let session = Session::connect(server.app_config("admin", "test-token")).unwrap();
    let offers = session.admin_offers().unwrap();
    offers.reload().await.unwrap();

    // offer 8 is already approved
    let err = offers.approve(OfferId(8)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidTransition);
    assert!(server.state.last_to("/offers/8/decision").is_none());
}

#[tokio::test]
async fn test_expired_token_ends_session() {
    let server = TestServer::start().await;
    let session = Session::connect(server.app_config("admin", EXPIRED_TOKEN)).unwrap();
    let offers = session.admin_offers().unwrap();

    let err = offers.reload().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(session.tokens().get(), None);

    let tasks = session.spawn_background();

    tokio::time::timeout(Duration::from_secs(5), session.ended())
        .await
        .unwrap();
    assert!(!session.is_active());

    for task in tasks {
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
    assert!(offers.is_shut_down());
}

#[tokio::test]
async fn test_notification_rollback_against_backend() {
    let server = TestServer::start().await;
    let session = Session::connect(server.app_config("student", "test-token")).unwrap();
    let store = session.notifications();

    store.refresh().await.unwrap();
    assert_eq!(store.unread_count().await, 1);

    let err = store.mark_as_read(NotificationId(1)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert!(err.message.ends_with("database exploded"));
    let feed = store.feed().await;
    assert_eq!(feed.unread_count, 1);
    assert!(feed.items.iter().any(|n| n.id == NotificationId(1) && !n.is_read));
    assert_eq!(feed.error.as_deref(), Some("database exploded"));
}

#[tokio::test]
async fn test_catalog_cache_fetches_once() {
    let server = TestServer::start().await;
    let session = Session::connect(server.app_config("organization", "test-token")).unwrap();
    let catalogs = session.catalogs();
    let kind = pasantias_entity::catalog::CatalogKind::Technology;

    assert_eq!(catalogs.resolve(kind, 1).await.unwrap().as_deref(), Some("Rust"));
    assert_eq!(catalogs.resolve(kind, 2).await.unwrap().as_deref(), Some("PostgreSQL"));

    let fetches = server
        .state
        .requests()
        .into_iter()
        .filter(|r| r.path.ends_with("/catalogs/technologies"))
        .count();
    assert_eq!(fetches, 1);
}
