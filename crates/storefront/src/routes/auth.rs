//! Authentication route handlers.
//!
//! Handles login, registration, logout and Google sign-in. Credentials are
//! checked by the backend; the session keeps a copy of the profile and the
//! bearer token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{is_local_path, set_authenticated};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if the visitor declined.
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
    pub next: String,
    pub user: Option<CurrentUser>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub user: Option<CurrentUser>,
}

/// Message for an `?error=` code on the login page.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "google_denied" => "Google sign-in was cancelled",
        "google_unavailable" => "Google sign-in is not available right now",
        "invalid_state" => "Your sign-in link expired, please try again",
        "session" => "We could not start your session, please try again",
        _ => "Sign-in failed, please try again",
    }
}

/// Keep `next` only if it stays on this site.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| is_local_path(n))
}

/// Generate a random string for the OAuth state parameter.
fn generate_state(length: usize) -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Store the identity in the session and pick the landing page.
async fn start_session(
    session: &Session,
    user: &CurrentUser,
    token: &crate::backend::AccessToken,
    next: Option<&str>,
) -> Result<Redirect, AppError> {
    set_authenticated(session, user, token).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    info!(user_id = %user.id, role = %user.role, "User signed in");
    Ok(Redirect::to(
        safe_next(next).unwrap_or_else(|| user.role.home_path()),
    ))
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query
            .error
            .as_deref()
            .map(|code| login_error_message(code).to_string()),
        email: String::new(),
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_string(),
        user: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.backend());
    let result = match service.login(&form.email, &form.password).await {
        Ok((user, token)) => start_session(&session, &user, &token, form.next.as_deref()).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(redirect) => redirect.into_response(),
        Err(e) => {
            warn!(error = %e, "Login failed");
            (
                e.status(),
                LoginTemplate {
                    error: Some(e.public_message()),
                    email: form.email,
                    next: safe_next(form.next.as_deref())
                        .unwrap_or_default()
                        .to_string(),
                    user: None,
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {
        error: None,
        name: String::new(),
        email: String::new(),
        user: None,
    }
}

/// Handle registration form submission.
///
/// The new account is a customer and is signed in straight away.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = Registration {
        name: &form.name,
        email: &form.email,
        phone: form.phone.as_deref(),
        password: &form.password,
        password_confirm: &form.password_confirm,
    };

    let service = AuthService::new(state.backend());
    let result = match service.register(&registration).await {
        Ok((user, token)) => start_session(&session, &user, &token, None).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(redirect) => redirect.into_response(),
        Err(e) => {
            warn!(error = %e, "Registration failed");
            (
                e.status(),
                RegisterTemplate {
                    error: Some(e.public_message()),
                    name: form.name,
                    email: form.email,
                    user: None,
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out.
///
/// Flushes the whole session, cart included.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Google OAuth
// =============================================================================

fn google_redirect_uri(state: &AppState) -> String {
    format!(
        "{}/auth/google/callback",
        state.config().base_url.trim_end_matches('/')
    )
}

/// Start Google sign-in.
///
/// Stores a CSRF state in the session and redirects to the consent screen
/// issued by the backend.
///
/// # Route
///
/// `GET /auth/google/login`
#[instrument(skip(state, session))]
pub async fn google_login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_state(32);

    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    match state
        .backend()
        .google_authorize_url(&google_redirect_uri(&state), &oauth_state)
        .await
    {
        Ok(response) => Redirect::to(&response.authorization_url).into_response(),
        Err(e) => {
            warn!(error = %e, "Google authorize URL unavailable");
            Redirect::to("/auth/login?error=google_unavailable").into_response()
        }
    }
}

/// Finish Google sign-in.
///
/// # Route
///
/// `GET /auth/google/callback`
#[instrument(skip(state, session, query))]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<GoogleCallbackQuery>,
) -> Response {
    // The stored state is single use
    let expected: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if let Some(error) = query.error {
        warn!("Google OAuth error: {error}");
        return Redirect::to("/auth/login?error=google_denied").into_response();
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        warn!("Google OAuth callback missing code or state");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    };

    let service = AuthService::new(state.backend());
    let identity = service
        .google_callback(
            &code,
            &returned_state,
            expected.as_deref(),
            &google_redirect_uri(&state),
        )
        .await;

    match identity {
        Ok((user, token)) => match start_session(&session, &user, &token, None).await {
            Ok(redirect) => redirect.into_response(),
            Err(e) => {
                tracing::error!("Failed to store Google sign-in: {e}");
                Redirect::to("/auth/login?error=session").into_response()
            }
        },
        Err(crate::services::auth::AuthError::InvalidSessionState) => {
            warn!("Google OAuth state mismatch");
            Redirect::to("/auth/login?error=invalid_state").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Google code exchange failed");
            Redirect::to("/auth/login?error=google_failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/checkout")), Some("/checkout"));
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_generate_state() {
        let a = generate_state(32);
        let b = generate_state(32);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_login_error_message() {
        assert_eq!(
            login_error_message("google_denied"),
            "Google sign-in was cancelled"
        );
        assert_eq!(
            login_error_message("anything"),
            "Sign-in failed, please try again"
        );
    }
}
