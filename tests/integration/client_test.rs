//! REST client against the stub backend.

use pasantias_client::traits::{CatalogBackend, LifecycleBackend, NotificationBackend};
use pasantias_client::{ApplicationsApi, CatalogsApi, NotificationsApi, OffersApi};
use pasantias_core::error::ErrorKind;
use pasantias_core::types::{ApplicationId, NotificationId, OfferId, PageRequest, QueryParams};
use pasantias_entity::application::ApplicationStatus;
use pasantias_entity::catalog::CatalogKind;
use pasantias_entity::notification::NotificationKind;
use pasantias_entity::offer::OfferStatus;

use super::helpers::{EXPIRED_TOKEN, TestServer};

fn query() -> QueryParams {
    QueryParams {
        page: 1,
        limit: 10,
        ..QueryParams::default()
    }
}

#[tokio::test]
async fn test_list_unwraps_envelope_and_sends_query() {
    let server = TestServer::start().await;
    let offers = OffersApi::new(server.client("test-token"));

    let page = offers
        .list(&QueryParams {
            search: Some("backend developer".to_string()),
            status: Some("pending".to_string()),
            ..query()
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, OfferId(7));
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 2);

    let request = server.state.last_to("/offers").unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-token"));
    let query = request.query.unwrap();
    assert!(query.contains("search=backend+developer"));
    assert!(query.contains("status=pending"));
    assert!(query.contains("limit=10"));
}

#[tokio::test]
async fn test_nested_data_wrapper_is_unwrapped() {
    let server = TestServer::start().await;
    let offers = OffersApi::new(server.client("test-token"));

    let offer = offers.get(OfferId(7)).await.unwrap();

    assert_eq!(offer.id, OfferId(7));
    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.title, "Backend developer intern");
}

#[tokio::test]
async fn test_not_found_message_is_verbatim() {
    let server = TestServer::start().await;
    let offers = OffersApi::new(server.client("test-token"));

    let err = offers.get(OfferId(99)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Offer not found");
}

#[tokio::test]
async fn test_offer_decision_body() {
    let server = TestServer::start().await;
    let offers = OffersApi::new(server.client("test-token"));

    let update = offers
        .transition(
            OfferId(7),
            OfferStatus::Pending,
            OfferStatus::Rejected,
            Some("  Missing stipend information "),
        )
        .await
        .unwrap();

    assert_eq!(update.status, OfferStatus::Rejected);
    let body = server.state.body_of("/api/offers/7/decision").unwrap();
    assert_eq!(body["decision"], "rejected");
    assert_eq!(body["rejection_reason"], "Missing stipend information");
}

#[tokio::test]
async fn test_approval_sends_no_reason() {
    let server = TestServer::start().await;
    let offers = OffersApi::new(server.client("test-token"));

    offers
        .transition(OfferId(7), OfferStatus::Pending, OfferStatus::Approved, None)
        .await
        .unwrap();

    let body = server.state.body_of("/api/offers/7/decision").unwrap();
    assert_eq!(body["decision"], "approved");
    assert!(body.get("rejection_reason").is_none());
}

#[tokio::test]
async fn test_evaluate_uses_capitalized_fields() {
    let server = TestServer::start().await;
    let applications = ApplicationsApi::new(server.client("test-token"));

    let update = applications
        .transition(
            ApplicationId(2),
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
            Some("Profile does not match"),
        )
        .await
        .unwrap();

    assert_eq!(update.status, ApplicationStatus::Rejected);
    let body = server.state.body_of("/api/applications/2/evaluate").unwrap();
    assert_eq!(body["Decision"], "rejected");
    assert_eq!(body["Reason"], "Profile does not match");
    assert!(body.get("decision").is_none());
    assert!(body.get("rejection_reason").is_none());
}

#[tokio::test]
async fn test_conflict_is_prefixed() {
    let server = TestServer::start().await;
    let applications = ApplicationsApi::new(server.client("test-token"));

    let err = applications
        .transition(
            ApplicationId(1),
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.starts_with("The request was declined"));
    assert!(err.message.ends_with("Application already reviewed"));
}

#[tokio::test]
async fn test_applications_key_envelope() {
    let server = TestServer::start().await;
    let applications = ApplicationsApi::new(server.client("test-token"));

    let page = applications.list(&query()).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].status, ApplicationStatus::Approved);
    assert_eq!(page.items[0].offer_title.as_deref(), Some("Backend developer intern"));
    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn test_notifications_feed_and_count() {
    let server = TestServer::start().await;
    let notifications = NotificationsApi::new(server.client("test-token"));

    let page = notifications.list(PageRequest::new(1, 50)).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].kind, NotificationKind::ApplicationDecision);
    assert_eq!(page.items[1].kind, NotificationKind::Other);

    assert_eq!(notifications.unread_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_plain_text_server_error() {
    let server = TestServer::start().await;
    let notifications = NotificationsApi::new(server.client("test-token"));

    let err = notifications.mark_read(NotificationId(1)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "database exploded");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_catalog_fetch() {
    let server = TestServer::start().await;
    let catalogs = CatalogsApi::new(server.client("test-token"));

    let entries = catalogs.fetch(CatalogKind::Technology).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Rust");
    assert!(server.state.last_to("/catalogs/technologies").is_some());
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let server = TestServer::start().await;
    let client = server.client(EXPIRED_TOKEN);
    let tokens = client.tokens().clone();
    let offers = OffersApi::new(client);

    let err = offers.list(&query()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.message, "Token expired");
    assert!(!tokens.is_authenticated());

    // no token left to send
    let _ = offers.list(&query()).await;
    let last = server.state.requests().pop().unwrap();
    assert_eq!(last.authorization, None);
}
