//! Authentication service.
//!
//! Credentials are checked by the backend; this layer validates input,
//! maps backend failures to visitor-facing errors and produces the session
//! identity.

mod error;

pub use error::AuthError;

use tracing::instrument;

use juicequ_core::Email;

use crate::backend::{AccessToken, ApiError, BackendClient, RegisterRequest, TokenResponse};
use crate::models::CurrentUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest accepted display name.
const MAX_NAME_LENGTH: usize = 100;

/// A registration form after trimming.
#[derive(Debug)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    /// Returns `AuthError::AccountDisabled` if the backend refuses the account.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(CurrentUser, AccessToken), AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let response = self
            .backend
            .login(email.as_str(), password)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized(_) | ApiError::NotFound(_) => AuthError::InvalidCredentials,
                ApiError::Forbidden(_) => AuthError::AccountDisabled,
                other => map_rejection(other),
            })?;

        session_identity(&response)
    }

    /// Register a customer account and log it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or
    /// `AuthError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(
        &self,
        form: &Registration<'_>,
    ) -> Result<(CurrentUser, AccessToken), AuthError> {
        let (name, email) = validate_registration(form)?;

        let response = self
            .backend
            .register(&RegisterRequest {
                email: email.as_str(),
                password: form.password,
                full_name: name,
                phone: form.phone.filter(|p| !p.trim().is_empty()),
            })
            .await
            .map_err(|e| match e {
                ApiError::Conflict(_) => AuthError::UserAlreadyExists,
                other => map_rejection(other),
            })?;

        session_identity(&response)
    }

    /// Exchange a Google authorization code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSessionState` if `state` does not match the
    /// value stored when the flow started.
    #[instrument(skip_all)]
    pub async fn google_callback(
        &self,
        code: &str,
        state: &str,
        expected_state: Option<&str>,
        redirect_uri: &str,
    ) -> Result<(CurrentUser, AccessToken), AuthError> {
        match expected_state {
            Some(expected) if !expected.is_empty() && expected == state => {}
            _ => return Err(AuthError::InvalidSessionState),
        }

        let response = self
            .backend
            .google_exchange_code(code, redirect_uri)
            .await
            .map_err(map_rejection)?;

        session_identity(&response)
    }
}

fn map_rejection(err: ApiError) -> AuthError {
    match err {
        ApiError::Validation(msg) => AuthError::Rejected(msg),
        other => AuthError::Backend(other),
    }
}

fn session_identity(response: &TokenResponse) -> Result<(CurrentUser, AccessToken), AuthError> {
    if !response.user.is_active {
        return Err(AuthError::AccountDisabled);
    }
    Ok((
        CurrentUser::from(&response.user),
        AccessToken::new(response.access_token.clone()),
    ))
}

/// Validate a registration form. Returns the trimmed name and parsed email.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_registration<'f>(
    form: &Registration<'f>,
) -> Result<(&'f str, Email), AuthError> {
    let name = form.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::MissingName);
    }
    let email = Email::parse(form.email)?;
    validate_password(form.password)?;
    if form.password != form.password_confirm {
        return Err(AuthError::PasswordMismatch);
    }
    Ok((name, email))
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(AuthError::WeakPassword(
            "password cannot be only whitespace".to_string(),
        ));
    }
    Ok(())
}
