//! Console facade
//!
//! [`Console`] ties the session, the route catalog and the integration store
//! together the way the pages of the console use them. Every user-facing
//! failure becomes a [`Notification`]; the returned error is for callers
//! that need to branch on it.

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::view::{Notification, Notifications, ViewState};
use async_trait::async_trait;
use fba_access::{
    actions, AccessPolicy, NavEntry, NavigationDecision, NavigationGuard, Principal, RoleDecision,
    RouteCatalog,
};
use fba_integrations::{
    ConnectionTestResult, ConnectionTester, IntegrationCatalog, IntegrationConfig,
    IntegrationState, IntegrationStore, KeyValueStorage, SimulatedConnectionTester,
};
use fba_session::{ApiClient, ApiResult, AuthGateway, SessionContext, UserRecord};
use std::sync::Arc;
use uuid::Uuid;

/// Backend calls behind the admin page
#[async_trait]
pub trait AdminDataSource: Send + Sync {
    /// Every account visible to the administrator
    async fn users(&self) -> ApiResult<Vec<UserRecord>>;

    /// Accounts with an unresolved role request
    async fn pending_requests(&self) -> ApiResult<Vec<UserRecord>>;

    /// Approve or reject a role request; returns the backend's message
    async fn resolve_request(&self, user_id: Uuid, decision: RoleDecision) -> ApiResult<String>;

    /// Enable or disable an account; returns the backend's message
    async fn set_active(&self, user_id: Uuid, is_active: bool) -> ApiResult<String>;
}

#[async_trait]
impl AdminDataSource for ApiClient {
    async fn users(&self) -> ApiResult<Vec<UserRecord>> {
        self.list_users().await
    }

    async fn pending_requests(&self) -> ApiResult<Vec<UserRecord>> {
        self.pending_role_requests().await
    }

    async fn resolve_request(&self, user_id: Uuid, decision: RoleDecision) -> ApiResult<String> {
        Ok(self.approve_role(user_id, decision).await?.message)
    }

    async fn set_active(&self, user_id: Uuid, is_active: bool) -> ApiResult<String> {
        Ok(self.set_user_status(user_id, is_active).await?.message)
    }
}

/// Data shown on the admin page
#[derive(Debug, Default)]
pub struct AdminView {
    /// All accounts
    pub users: ViewState<Vec<UserRecord>>,
    /// Accounts awaiting a role decision
    pub pending: ViewState<Vec<UserRecord>>,
}

impl AdminView {
    /// Create empty view
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if either list is loading
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.users.is_loading() || self.pending.is_loading()
    }
}

/// Route catalog with the configured landing and sign-in routes
///
/// # Errors
/// Returns [`ConsoleError::Access`] if the route table registers a target
/// twice or the configured default route is not open to every role.
pub fn build_catalog(config: &ConsoleConfig) -> ConsoleResult<RouteCatalog> {
    Ok(RouteCatalog::default_table()
        .default_route(&config.default_route)
        .login_route(&config.login_route)
        .build()?)
}

/// Session, navigation and integration settings of one console user
pub struct Console<S> {
    config: ConsoleConfig,
    catalog: RouteCatalog,
    session: SessionContext,
    integrations: IntegrationStore<S>,
    tester: Arc<dyn ConnectionTester>,
    notifications: Notifications,
    current_route: String,
}

impl<S: KeyValueStorage> Console<S> {
    /// Create signed-out console, loading integration settings from `storage`
    ///
    /// # Errors
    /// Returns error if the configured routes are invalid.
    pub fn new(config: ConsoleConfig, storage: S) -> ConsoleResult<Self> {
        config.validate()?;
        let catalog = build_catalog(&config)?;

        let mut integrations = IntegrationStore::new(IntegrationCatalog::builtin(), storage)
            .with_key(config.storage_key.clone());
        integrations.load();

        let tester = Arc::new(SimulatedConnectionTester::new(config.connection_test_delay()));
        let current_route = catalog.login_route().to_string();

        Ok(Self {
            config,
            catalog,
            session: SessionContext::new(),
            integrations,
            tester,
            notifications: Notifications::default(),
            current_route,
        })
    }

    /// With connection tester
    #[must_use]
    pub fn with_tester(mut self, tester: Arc<dyn ConnectionTester>) -> Self {
        self.tester = tester;
        self
    }

    /// Navigate to `route`, following a redirect if access is denied
    pub fn navigate(&mut self, route: &str) -> NavigationDecision {
        let decision = NavigationGuard::new(&self.catalog).check(self.session.principal(), route);
        self.current_route = decision.target().to_string();
        decision
    }

    /// Menu entries for the signed-in principal
    #[must_use]
    pub fn menu(&self) -> Vec<&NavEntry> {
        self.catalog.menu_for(self.session.principal())
    }

    /// Sign in and land on the default route
    ///
    /// # Errors
    /// Returns [`ConsoleError::Api`] if either backend step fails; the
    /// session stays signed out.
    pub async fn login<G>(
        &mut self,
        gateway: &G,
        identifier: &str,
        secret: &str,
    ) -> ConsoleResult<NavigationDecision>
    where
        G: AuthGateway + ?Sized,
    {
        let outcome = self
            .session
            .login(gateway, identifier, secret)
            .await
            .map(|_| ());
        if let Err(e) = outcome {
            return Err(self.report(e.into()));
        }
        let landing = self.catalog.default_route().to_string();
        Ok(self.navigate(&landing))
    }

    /// Rotate the session's tokens through `gateway`
    ///
    /// When the backend rejects the refresh token the session ends and the
    /// console returns to the sign-in route.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Api`] if the refresh fails.
    pub async fn refresh_session<G>(&mut self, gateway: &G) -> ConsoleResult<()>
    where
        G: AuthGateway + ?Sized,
    {
        if let Err(e) = self.session.refresh(gateway).await {
            if !self.session.is_authenticated() {
                self.current_route = self.catalog.login_route().to_string();
            }
            return Err(self.report(e.into()));
        }
        Ok(())
    }

    /// Sign out; no backend call
    pub fn logout(&mut self) {
        self.session.end();
        self.current_route = self.catalog.login_route().to_string();
    }

    /// Signed-in principal, if `action` is permitted
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] otherwise.
    pub fn authorize_action(&self, action: &str) -> ConsoleResult<&Principal> {
        match self.session.principal() {
            Some(principal) if self.catalog.permits(Some(principal), action) => Ok(principal),
            _ => {
                tracing::debug!(action, "Action not permitted");
                Err(ConsoleError::Forbidden(action.to_string()))
            }
        }
    }

    /// Flip an integration on or off
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for viewers and
    /// [`ConsoleError::Integration`] for unknown ids.
    pub fn toggle_integration(&mut self, id: &str) -> ConsoleResult<IntegrationState> {
        self.guarded(actions::INTEGRATIONS_TOGGLE)?;
        match self.integrations.toggle(id) {
            Ok(state) => {
                let verb = if state.enabled { "enabled" } else { "disabled" };
                let message = format!("{} {verb}", self.integration_name(id));
                self.notifications.push(Notification::success(message));
                Ok(state)
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Save integration settings
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for viewers and
    /// [`ConsoleError::Integration`] for unknown ids.
    pub fn configure_integration(
        &mut self,
        id: &str,
        values: IntegrationConfig,
    ) -> ConsoleResult<IntegrationState> {
        self.guarded(actions::INTEGRATIONS_CONFIGURE)?;
        match self.integrations.configure(id, values) {
            Ok(state) => {
                let message = format!("{} configured successfully!", self.integration_name(id));
                self.notifications.push(Notification::success(message));
                Ok(state)
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Run the connection test of an integration
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for viewers and
    /// [`ConsoleError::Integration`] for unknown ids.
    pub async fn test_integration(&mut self, id: &str) -> ConsoleResult<ConnectionTestResult> {
        self.guarded(actions::INTEGRATIONS_CONFIGURE)?;
        let tester = Arc::clone(&self.tester);
        match self.integrations.test_connection(id, tester.as_ref()).await {
            Ok(result) => {
                let note = if result.success {
                    Notification::success(result.message.clone())
                } else {
                    Notification::error(result.message.clone())
                };
                self.notifications.push(note);
                Ok(result)
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Load both admin lists; failures leave the previous data in place
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for non-admins; backend failures
    /// are reported through notifications only.
    pub async fn load_admin_view<D>(&mut self, source: &D, view: &mut AdminView) -> ConsoleResult<()>
    where
        D: AdminDataSource + ?Sized,
    {
        self.guarded(actions::ADMIN_USERS_LIST)?;
        view.users.load(source.users(), &mut self.notifications).await;
        view.pending
            .load(source.pending_requests(), &mut self.notifications)
            .await;
        Ok(())
    }

    /// Approve or reject a role request
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for non-admins and
    /// [`ConsoleError::Api`] if the backend refuses.
    pub async fn resolve_role_request<D>(
        &mut self,
        source: &D,
        user_id: Uuid,
        decision: RoleDecision,
    ) -> ConsoleResult<()>
    where
        D: AdminDataSource + ?Sized,
    {
        self.guarded(actions::ADMIN_ROLES_APPROVE)?;
        match source.resolve_request(user_id, decision).await {
            Ok(message) => {
                tracing::info!(%user_id, ?decision, "Role request resolved");
                self.notifications.push(Notification::success(message));
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Activate or deactivate an account
    ///
    /// # Errors
    /// Returns [`ConsoleError::Forbidden`] for non-admins and
    /// [`ConsoleError::Api`] if the backend refuses.
    pub async fn set_user_active<D>(
        &mut self,
        source: &D,
        user_id: Uuid,
        is_active: bool,
    ) -> ConsoleResult<()>
    where
        D: AdminDataSource + ?Sized,
    {
        self.guarded(actions::ADMIN_USERS_STATUS)?;
        match source.set_active(user_id, is_active).await {
            Ok(message) => {
                tracing::info!(%user_id, is_active, "Account status changed");
                self.notifications.push(Notification::success(message));
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Backend client carrying the session's token
    ///
    /// # Errors
    /// Returns [`ConsoleError::Api`] if the HTTP client cannot be built.
    pub fn api_client(&self) -> ConsoleResult<ApiClient> {
        Ok(ApiClient::new(&self.config.api_base_url)?.for_session(&self.session))
    }

    /// Route currently rendered
    #[inline]
    #[must_use]
    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    /// Session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Mutable session, for profile updates
    #[inline]
    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Route catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// Integration store
    #[inline]
    #[must_use]
    pub fn integrations(&self) -> &IntegrationStore<S> {
        &self.integrations
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Pending notifications
    #[inline]
    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Take pending notifications
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn guarded(&mut self, action: &str) -> ConsoleResult<()> {
        match self.authorize_action(action) {
            Ok(_) => Ok(()),
            Err(e) => Err(self.report(e)),
        }
    }

    fn report(&mut self, error: ConsoleError) -> ConsoleError {
        self.notifications
            .push(Notification::error(error.user_message()));
        error
    }

    fn integration_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.integrations
            .catalog()
            .get(id)
            .map_or(id, |d| d.display_name)
    }
}

impl<S> std::fmt::Debug for Console<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("current_route", &self.current_route)
            .field("authenticated", &self.session.is_authenticated())
            .field("notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}
