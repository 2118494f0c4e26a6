//! Authentication middleware and extractors.
//!
//! The session holds a copy of the backend profile plus the bearer token.
//! These extractors read both and gate handlers by role.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::info;

use crate::backend::{AccessToken, ApiError};
use crate::models::{CurrentUser, session_keys};

/// A logged-in user and the token to act on their behalf.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: CurrentUser,
    pub token: AccessToken,
}

/// Extractor that requires a logged-in user of any role.
///
/// If the user is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(auth): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub Authenticated);

/// Extractor that requires a cashier or admin.
pub struct RequireStaff(pub Authenticated);

/// Extractor that requires an admin.
pub struct RequireAdmin(pub Authenticated);

/// Error returned when authentication is required but missing or insufficient.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Logged in with the wrong role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Read the user and token from the session, if both are present.
async fn load_authenticated(session: &Session) -> Option<Authenticated> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    let token = session
        .get::<String>(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()?;
    Some(Authenticated {
        user,
        token: AccessToken::new(token),
    })
}

async fn require(parts: &Parts) -> Result<Authenticated, AuthRejection> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    // Nested routers see a stripped URI; the original keeps the `/api` prefix
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.path());

    load_authenticated(session).await.ok_or_else(|| {
        if path.starts_with("/api/") {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin
        }
    })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = require(parts).await?;
        if !auth.user.role.is_staff() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(auth))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = require(parts).await?;
        if auth.user.role != juicequ_core::UserRole::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(auth))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(auth): OptionalAuth,
/// ) -> impl IntoResponse {
///     match auth {
///         Some(a) => format!("Hello, {}!", a.user.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<Authenticated>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = match parts.extensions.get::<Session>() {
            Some(session) => load_authenticated(session).await,
            None => None,
        };

        Ok(Self(auth))
    }
}

/// Store a freshly authenticated user in the session.
///
/// Cycles the session ID first so a pre-login ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_authenticated(
    session: &Session,
    user: &CurrentUser,
    token: &AccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session
        .insert(session_keys::AUTH_TOKEN, token.expose())
        .await
}

/// Remove the user, token and assistant conversation from the session.
///
/// The cart is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_authenticated(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::CURRENT_USER).await?;
    session.remove_value(session_keys::AUTH_TOKEN).await?;
    session
        .remove_value(session_keys::ASSISTANT_SESSION)
        .await?;
    Ok(())
}

/// Log the visitor out locally when the backend rejects their token.
///
/// Passes `result` through unchanged.
pub async fn expire_on_unauthorized<T>(
    session: &Session,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    if let Err(e) = &result
        && e.is_unauthorized()
    {
        info!("Backend rejected stored token, clearing session auth");
        if let Err(session_err) = clear_authenticated(session).await {
            tracing::error!("Failed to clear expired auth from session: {session_err}");
        }
    }
    result
}

/// Whether `path` is a same-site absolute path that is safe to redirect to.
///
/// Control characters are rejected because browsers drop tabs and newlines
/// from URLs, turning `/\t/host` into `//host`.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use juicequ_core::{Email, UserId, UserRole};

    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(9),
            name: "Sari".to_string(),
            email: Email::parse("sari@juicequ.id").unwrap(),
            role,
        }
    }

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/account/orders"));
        assert!(is_local_path("/menu?sort=popular"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_is_local_path_rejects_control_characters() {
        assert!(!is_local_path("/\t/evil.example"));
        assert!(!is_local_path("/\n/evil.example"));
        assert!(!is_local_path("/menu\r\nSet-Cookie: x=1"));
        assert!(is_local_path("/menu?search=jus%09mangga"));
    }

    #[tokio::test]
    async fn test_set_and_clear_authenticated() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_authenticated(&session, &user(UserRole::Cashier), &AccessToken::new("tok"))
            .await
            .unwrap();

        let auth = load_authenticated(&session).await.unwrap();
        assert_eq!(auth.user.role, UserRole::Cashier);
        assert_eq!(auth.token.expose(), "tok");

        clear_authenticated(&session).await.unwrap();
        assert!(load_authenticated(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_backend_error_logs_out() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_authenticated(&session, &user(UserRole::Customer), &AccessToken::new("old"))
            .await
            .unwrap();

        let result: Result<(), ApiError> = expire_on_unauthorized(
            &session,
            Err(ApiError::Unauthorized("expired".to_string())),
        )
        .await;
        assert!(result.is_err());
        assert!(load_authenticated(&session).await.is_none());
    }
}
