//! Authentication error types.

use thiserror::Error;

use crate::backend::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] juicequ_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend disabled the account.
    #[error("account disabled")]
    AccountDisabled,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Registration without a name.
    #[error("name is required")]
    MissingName,

    /// OAuth state missing, reused or mismatched.
    #[error("invalid session state")]
    InvalidSessionState,

    /// The backend refused the input with a visitor-facing reason.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(#[from] ApiError),
}
