//! One authenticated login and everything that lives as long as it.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pasantias_core::AppError;
use pasantias_core::config::AppConfig;
use pasantias_core::events::LifecycleEvent;
use pasantias_core::result::AppResult;
use pasantias_core::types::UserId;
use pasantias_client::{
    ApiClient, ApplicationsApi, CatalogsApi, NotificationsApi, OffersApi, TokenStore,
};
use pasantias_entity::user::UserRole;

use crate::catalog::CatalogCache;
use crate::context::SessionContext;
use crate::notification::{NotificationPoller, NotificationStore};
use crate::orchestrator::{
    AdminApplications, AdminOffers, OrchestratorDeps, OrganizationApplications,
    OrganizationOffers, StudentApplications, StudentOffers,
};

/// The root of a logged-in user's client state.
///
/// Owns the cancellation token every view and background task descends
/// from. Once the token is cleared (logout or a 401) the session is over
/// and every view built from it refuses further work.
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    ctx: SessionContext,
    tokens: Arc<TokenStore>,
    offers: Arc<OffersApi>,
    applications: Arc<ApplicationsApi>,
    notifications: Arc<NotificationStore>,
    catalogs: CatalogCache,
    events: broadcast::Sender<LifecycleEvent>,
    cancel: CancellationToken,
}

impl Session {
    /// Build a session from configuration. No request is sent.
    pub fn connect(config: AppConfig) -> AppResult<Self> {
        let tokens = Arc::new(TokenStore::new(config.session.token.clone()));
        if !tokens.is_authenticated() {
            return Err(AppError::authentication(
                "No session token configured (set session.token or PASANTIAS__SESSION__TOKEN)",
            ));
        }
        if config.session.user_id <= 0 {
            return Err(AppError::configuration("session.user_id must be a positive id"));
        }
        let role: UserRole = config.session.role.parse()?;
        let ctx = SessionContext::new(UserId(config.session.user_id), role);

        let client = ApiClient::new(&config.api, tokens.clone())?;
        let offers = Arc::new(OffersApi::new(client.clone()));
        let applications = Arc::new(ApplicationsApi::new(client.clone()));
        let notifications = Arc::new(NotificationStore::new(
            Arc::new(NotificationsApi::new(client.clone())),
            &config.notifications,
        ));
        let catalogs = CatalogCache::new(Arc::new(CatalogsApi::new(client)));
        let (events, _) = broadcast::channel(config.notifications.event_buffer_size.max(1));

        info!(user_id = %ctx.user_id, role = %ctx.role, base_url = %config.api.base_url, "Session started");

        Ok(Self {
            config,
            ctx,
            tokens,
            offers,
            applications,
            notifications,
            catalogs,
            events,
            cancel: CancellationToken::new(),
        })
    }

    /// Who is acting.
    pub fn context(&self) -> SessionContext {
        self.ctx
    }

    /// The configuration the session was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The bearer token store shared by every request.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// The session's notification store.
    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    /// The session's catalog cache.
    pub fn catalogs(&self) -> &CatalogCache {
        &self.catalogs
    }

    /// Subscribe to lifecycle events of every view built from this session.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Whether the session still has a token and was not logged out.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.tokens.is_authenticated()
    }

    fn deps(&self) -> OrchestratorDeps {
        OrchestratorDeps::new(self.ctx, self.events.clone(), self.cancel.clone())
    }

    /// Admin review of offers.
    pub fn admin_offers(&self) -> AppResult<AdminOffers> {
        AdminOffers::new(self.offers.clone(), &self.deps(), &self.config.pagination)
    }

    /// An organization's own offers.
    pub fn organization_offers(&self) -> AppResult<OrganizationOffers> {
        OrganizationOffers::new(self.offers.clone(), &self.deps(), &self.config.pagination)
    }

    /// Approved offers a student can apply to.
    pub fn student_offers(&self) -> AppResult<StudentOffers> {
        StudentOffers::new(
            self.offers.clone(),
            self.applications.clone(),
            &self.deps(),
            &self.config.pagination,
        )
    }

    /// Admin pre-screen and closure of applications.
    pub fn admin_applications(&self) -> AppResult<AdminApplications> {
        AdminApplications::new(
            self.applications.clone(),
            &self.deps(),
            &self.config.pagination,
        )
    }

    /// Organization evaluation of applications.
    pub fn organization_applications(&self) -> AppResult<OrganizationApplications> {
        OrganizationApplications::new(
            self.applications.clone(),
            &self.deps(),
            &self.config.pagination,
        )
    }

    /// A student's own applications.
    pub fn student_applications(&self) -> AppResult<StudentApplications> {
        StudentApplications::new(
            self.applications.clone(),
            &self.deps(),
            &self.config.pagination,
        )
    }

    /// Start the notification poller on a child token.
    pub fn spawn_poller(&self) -> JoinHandle<()> {
        NotificationPoller::new(
            self.notifications.clone(),
            self.config.notifications.poll_interval(),
            self.cancel.child_token(),
        )
        .with_events(self.events.subscribe())
        .spawn()
    }

    /// End the session as soon as the token store is cleared.
    pub fn spawn_token_watch(&self) -> JoinHandle<()> {
        let mut rx = self.tokens.subscribe();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = rx.wait_for(Option::is_none) => {
                    warn!("Session token was invalidated, stopping background work");
                    cancel.cancel();
                }
            }
        })
    }

    /// Start every background task of the session.
    pub fn spawn_background(&self) -> Vec<JoinHandle<()>> {
        vec![self.spawn_token_watch(), self.spawn_poller()]
    }

    /// Resolves once the session has ended, by logout or invalidation.
    pub async fn ended(&self) {
        let mut rx = self.tokens.subscribe();
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = rx.wait_for(Option::is_none) => {}
        }
    }

    /// Cancel all background work and views, then forget the token and
    /// all cached data.
    pub async fn logout(&self) {
        self.cancel.cancel();
        self.tokens.clear();
        self.catalogs.invalidate();
        self.notifications.clear().await;
        info!(user_id = %self.ctx.user_id, "Session ended");
    }
}
