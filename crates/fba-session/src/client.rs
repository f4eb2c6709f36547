//! REST client for the feedback analyzer backend
//!
//! JSON over HTTP with bearer authentication. Every call maps a non-2xx
//! answer to [`ApiError::Backend`] carrying the backend's `detail`.

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AdminActionResponse, ApproveRoleRequest, ClusteringInfo, DashboardStats, FeedbackFilter,
    FeedbackItem, ProfileUpdate, RegisterRequest, RoleDecisionUser, TokenResponse, UserRecord,
    UserStatusUser,
};
use crate::session::{AccessToken, SessionContext};
use fba_access::RoleDecision;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

/// Backend API root used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Days covered by the dashboard when unspecified
pub const DEFAULT_DASHBOARD_DAYS: u32 = 30;

/// Backend API client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<AccessToken>,
}

impl ApiClient {
    /// Create client for `base_url`
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Client carrying the session's token, or none when signed out
    #[must_use]
    pub fn for_session(&self, session: &SessionContext) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: session.token().cloned(),
        }
    }

    /// API root
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if a bearer token is attached
    #[inline]
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.token.as_ref().ok_or(ApiError::Unauthenticated)?;
        Ok(builder.bearer_auth(token.as_str()))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), error = %err, "Backend call failed");
            return Err(err);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.authorized(self.http.get(self.url(path)))?;
        self.execute(builder).await
    }

    /// Exchange credentials for tokens (`POST /auth/login`, form encoded)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 401 for bad credentials.
    pub async fn exchange_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> ApiResult<TokenResponse> {
        let builder = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", identifier), ("password", secret)]);
        self.execute(builder).await
    }

    /// Rotate both tokens (`POST /auth/refresh`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 401 if the refresh token is
    /// invalid or the account is inactive.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> ApiResult<TokenResponse> {
        let builder = self
            .http
            .post(self.url("/auth/refresh"))
            .query(&[("refresh_token", refresh_token)]);
        self.execute(builder).await
    }

    /// Create an account (`POST /auth/register`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 400 if the email is taken.
    pub async fn register_user(&self, request: &RegisterRequest) -> ApiResult<UserRecord> {
        let builder = self.http.post(self.url("/auth/register")).json(request);
        self.execute(builder).await
    }

    /// Signed-in user's record (`GET /users/me`)
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] without a token.
    pub async fn current_user(&self) -> ApiResult<UserRecord> {
        self.get("/users/me").await
    }

    /// Update the signed-in user's profile (`PATCH /users/me`)
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] without a token.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserRecord> {
        let builder = self.authorized(self.http.patch(self.url("/users/me")).json(update))?;
        self.execute(builder).await
    }

    /// Users visible to the caller (`GET /admin/users`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 403 for non-admins.
    pub async fn list_users(&self) -> ApiResult<Vec<UserRecord>> {
        self.get("/admin/users").await
    }

    /// Users with an unresolved role request (`GET /admin/pending-requests`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 403 for non-admins.
    pub async fn pending_role_requests(&self) -> ApiResult<Vec<UserRecord>> {
        self.get("/admin/pending-requests").await
    }

    /// Resolve a role request (`POST /admin/approve-role`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 404 for unknown users.
    pub async fn approve_role(
        &self,
        user_id: Uuid,
        decision: RoleDecision,
    ) -> ApiResult<AdminActionResponse<RoleDecisionUser>> {
        let body = ApproveRoleRequest {
            user_id,
            approved: decision.approved(),
        };
        let builder = self.authorized(self.http.post(self.url("/admin/approve-role")).json(&body))?;
        self.execute(builder).await
    }

    /// Enable or disable an account (`PATCH /admin/users/{id}/status`)
    ///
    /// # Errors
    /// Returns [`ApiError::Backend`] with status 404 for unknown users.
    pub async fn set_user_status(
        &self,
        user_id: Uuid,
        is_active: bool,
    ) -> ApiResult<AdminActionResponse<UserStatusUser>> {
        let url = self.url(&format!("/admin/users/{user_id}/status"));
        let builder = self.authorized(
            self.http
                .patch(url)
                .query(&[("is_active", if is_active { "true" } else { "false" })]),
        )?;
        self.execute(builder).await
    }

    /// One page of feedback (`GET /feedback/`)
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] without a token.
    pub async fn list_feedback(&self, filter: &FeedbackFilter) -> ApiResult<Vec<FeedbackItem>> {
        let builder = self.authorized(
            self.http
                .get(self.url("/feedback/"))
                .query(&filter.query_pairs()),
        )?;
        self.execute(builder).await
    }

    /// Dashboard aggregates over the last `days` (`GET /analytics/dashboard`)
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] without a token.
    pub async fn dashboard_stats(&self, days: u32) -> ApiResult<DashboardStats> {
        let builder = self.authorized(
            self.http
                .get(self.url("/analytics/dashboard"))
                .query(&[("days", days)]),
        )?;
        self.execute(builder).await
    }

    /// Cluster sizes (`GET /clustering/info`)
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] without a token.
    pub async fn clustering_info(&self) -> ApiResult<ClusteringInfo> {
        self.get("/clustering/info").await
    }
}
