//! Login exchange

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::{RegisterRequest, TokenResponse};
use crate::session::{AccessToken, LoginResponse};
use async_trait::async_trait;
use fba_access::Principal;

/// Turns credentials into a session
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Verify credentials and resolve the principal they belong to
    async fn login(&self, identifier: &str, secret: &str) -> ApiResult<LoginResponse>;

    /// Trade a refresh token for a new token pair
    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenResponse>;

    /// Create an account; admin requests come back pending
    async fn register(&self, request: &RegisterRequest) -> ApiResult<Principal>;
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, identifier: &str, secret: &str) -> ApiResult<LoginResponse> {
        let tokens = self.exchange_credentials(identifier, secret).await?;
        let token = AccessToken::new(tokens.access_token);

        let authed = self.clone().with_token(token.clone());
        let principal = authed.current_user().await?.into_principal();

        tracing::info!(username = %principal.username, "Login succeeded");
        Ok(LoginResponse {
            token,
            refresh_token: tokens.refresh_token,
            principal,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenResponse> {
        self.refresh_tokens(refresh_token).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<Principal> {
        let principal = self.register_user(request).await?.into_principal();
        if principal.has_pending_request() {
            tracing::info!(username = %principal.username, "Registered with pending role request");
        }
        Ok(principal)
    }
}
