//! Session context
//!
//! Owns the authenticated principal and its bearer token. The two are set
//! and cleared together: a session is either fully authenticated or empty.
//!
//! ```text
//!   new() ──▶ Anonymous ──begin / login ok──▶ Authenticated ──end()──▶ Anonymous
//!                 ▲   login failed                 │ replace_principal
//!                 └──────────┘                     └──────▶ Authenticated
//!                                                  │ refresh ok: rotate_tokens
//!                                                  │ refresh 401: end()
//! ```

use crate::auth::AuthGateway;
use crate::error::{ApiError, ApiResult};
use fba_access::{Principal, Role};
use std::fmt;

/// Bearer token
///
/// Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token for the `Authorization` header
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Result of a successful login exchange
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Bearer token
    pub token: AccessToken,
    /// Refresh token, when issued
    pub refresh_token: Option<String>,
    /// Principal the token belongs to
    pub principal: Principal,
}

#[derive(Debug, Clone)]
struct Authenticated {
    principal: Principal,
    token: AccessToken,
    refresh_token: Option<String>,
}

/// The current user's session
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Option<Authenticated>,
}

impl SessionContext {
    /// Create unauthenticated session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a login result, replacing any previous session
    pub fn begin(&mut self, login: LoginResponse) {
        tracing::info!(
            username = %login.principal.username,
            role = %login.principal.role,
            "Session started"
        );
        self.state = Some(Authenticated {
            principal: login.principal,
            token: login.token,
            refresh_token: login.refresh_token,
        });
    }

    /// Log in through `gateway`
    ///
    /// On failure the session is left exactly as it was.
    ///
    /// # Errors
    /// Returns the gateway's error.
    pub async fn login<G>(
        &mut self,
        gateway: &G,
        identifier: &str,
        secret: &str,
    ) -> ApiResult<&Principal>
    where
        G: AuthGateway + ?Sized,
    {
        match gateway.login(identifier, secret).await {
            Ok(response) => {
                self.begin(response);
                self.principal().ok_or(ApiError::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(identifier, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Exchange the held refresh token for a new token pair
    ///
    /// The principal is kept. A 401 means the backend no longer honors the
    /// session, so it is ended; any other failure leaves it unchanged.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthenticated`] when signed out or no refresh
    /// token was issued, otherwise the gateway's error.
    pub async fn refresh<G>(&mut self, gateway: &G) -> ApiResult<()>
    where
        G: AuthGateway + ?Sized,
    {
        let refresh_token = self
            .refresh_token()
            .ok_or(ApiError::Unauthenticated)?
            .to_string();
        match gateway.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.rotate_tokens(AccessToken::new(tokens.access_token), tokens.refresh_token);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                if e.is_unauthorized() {
                    self.end();
                }
                Err(e)
            }
        }
    }

    /// Swap in a rotated token pair, keeping the principal
    ///
    /// A missing refresh token keeps the one already held. Returns `false`
    /// and does nothing when no session is active.
    pub fn rotate_tokens(&mut self, token: AccessToken, refresh_token: Option<String>) -> bool {
        match &mut self.state {
            Some(state) => {
                tracing::debug!(username = %state.principal.username, "Tokens rotated");
                state.token = token;
                if refresh_token.is_some() {
                    state.refresh_token = refresh_token;
                }
                true
            }
            None => false,
        }
    }

    /// Clear the session locally
    pub fn end(&mut self) {
        if let Some(previous) = self.state.take() {
            tracing::info!(username = %previous.principal.username, "Session ended");
        }
    }

    /// Swap in an updated principal, keeping the token
    ///
    /// Returns `false` and does nothing when no session is active.
    pub fn replace_principal(&mut self, principal: Principal) -> bool {
        match &mut self.state {
            Some(state) => {
                tracing::debug!(username = %principal.username, "Principal replaced");
                state.principal = principal;
                true
            }
            None => false,
        }
    }

    /// Authenticated principal
    #[inline]
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.state.as_ref().map(|s| &s.principal)
    }

    /// Bearer token
    #[inline]
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        self.state.as_ref().map(|s| &s.token)
    }

    /// Refresh token
    #[inline]
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.refresh_token.as_deref())
    }

    /// Check if a principal is signed in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_some()
    }

    /// Role the evaluator will use, if signed in
    #[must_use]
    pub fn effective_role(&self) -> Option<Role> {
        self.principal().map(fba_access::effective_role)
    }
}
