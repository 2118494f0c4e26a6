//! Authentication endpoints.

use reqwest::Method;
use tracing::instrument;

use super::types::{
    AccessToken, LoginRequest, OAuthAuthorizeResponse, OAuthCallbackRequest, RegisterRequest,
    TokenResponse, User,
};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Exchange email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.send_json(
            Method::POST,
            "auth/login",
            &LoginRequest { email, password },
            None,
        )
        .await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` when the email is already registered.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<TokenResponse, ApiError> {
        self.send_json(Method::POST, "auth/register", request, None)
            .await
    }

    /// Fetch the profile that owns `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token expired.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &AccessToken) -> Result<User, ApiError> {
        self.get("auth/me", Some(token)).await
    }

    /// Ask the backend for the Google consent screen URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend has no OAuth provider configured.
    #[instrument(skip(self, state))]
    pub async fn google_authorize_url(
        &self,
        redirect_uri: &str,
        state: &str,
    ) -> Result<OAuthAuthorizeResponse, ApiError> {
        self.get_with_query(
            "auth/oauth/google/authorize",
            &[("redirect_uri", redirect_uri), ("state", state)],
            None,
        )
        .await
    }

    /// Exchange a Google authorization code for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is invalid or expired.
    #[instrument(skip(self, code))]
    pub async fn google_exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, ApiError> {
        self.send_json(
            Method::POST,
            "auth/oauth/google/callback",
            &OAuthCallbackRequest { code, redirect_uri },
            None,
        )
        .await
    }
}
