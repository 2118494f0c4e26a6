//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::ApiError;
use crate::cart::CartError;
use crate::services::auth::AuthError;
use crate::voice::VoiceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Voice command failed.
    #[error("Voice error: {0}")]
    Voice(#[from] VoiceError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status, visitor-facing message and whether to report to Sentry.
struct Classified {
    status: StatusCode,
    message: String,
    report: bool,
    retry_after: Option<u64>,
}

impl Classified {
    fn client(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            report: false,
            retry_after: None,
        }
    }

    fn server(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            report: true,
            retry_after: None,
        }
    }
}

fn classify_api(err: &ApiError) -> Classified {
    match err {
        ApiError::Unauthorized(_) => Classified::client(
            StatusCode::UNAUTHORIZED,
            "Your session has expired, please log in again",
        ),
        ApiError::Forbidden(msg) => Classified::client(StatusCode::FORBIDDEN, msg.clone()),
        ApiError::NotFound(msg) => Classified::client(StatusCode::NOT_FOUND, msg.clone()),
        ApiError::Conflict(msg) => Classified::client(StatusCode::CONFLICT, msg.clone()),
        ApiError::Validation(msg) => Classified::client(StatusCode::BAD_REQUEST, msg.clone()),
        ApiError::RateLimited(seconds) => Classified {
            retry_after: Some(*seconds),
            ..Classified::client(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please slow down",
            )
        },
        ApiError::Http(_) | ApiError::Url(_) | ApiError::Parse(_) | ApiError::Status { .. } => {
            Classified::server(StatusCode::BAD_GATEWAY, "External service error")
        }
    }
}

impl AppError {
    fn classify(&self) -> Classified {
        match self {
            Self::Api(err) | Self::Auth(AuthError::Backend(err)) => classify_api(err),
            Self::Cart(err) => match err {
                CartError::InvalidQuantity => {
                    Classified::client(StatusCode::BAD_REQUEST, err.to_string())
                }
                CartError::ItemNotFound => {
                    Classified::client(StatusCode::NOT_FOUND, err.to_string())
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    Classified::client(StatusCode::UNAUTHORIZED, "Invalid email or password")
                }
                AuthError::AccountDisabled => {
                    Classified::client(StatusCode::FORBIDDEN, "This account has been disabled")
                }
                AuthError::UserAlreadyExists => Classified::client(
                    StatusCode::CONFLICT,
                    "An account with this email already exists",
                ),
                AuthError::WeakPassword(msg) | AuthError::Rejected(msg) => {
                    Classified::client(StatusCode::BAD_REQUEST, msg.clone())
                }
                AuthError::InvalidEmail(_) => {
                    Classified::client(StatusCode::BAD_REQUEST, "Invalid email address")
                }
                AuthError::PasswordMismatch => {
                    Classified::client(StatusCode::BAD_REQUEST, "Passwords do not match")
                }
                AuthError::MissingName => {
                    Classified::client(StatusCode::BAD_REQUEST, "Please enter your name")
                }
                AuthError::InvalidSessionState => Classified::client(
                    StatusCode::UNAUTHORIZED,
                    "Session expired, please try again",
                ),
                AuthError::Backend(err) => classify_api(err),
            },
            Self::Voice(err) => match err {
                VoiceError::EmptyTranscript | VoiceError::TranscriptTooLong { .. } => {
                    Classified::client(StatusCode::BAD_REQUEST, err.to_string())
                }
                VoiceError::Assistant(api) => classify_api(api),
            },
            Self::Session(_) | Self::Internal(_) => {
                Classified::server(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::NotFound(_) => Classified::client(StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized(_) => Classified::client(StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden(_) => Classified::client(StatusCode::FORBIDDEN, self.to_string()),
            Self::BadRequest(_) => Classified::client(StatusCode::BAD_REQUEST, self.to_string()),
            Self::RateLimited => Classified::client(StatusCode::TOO_MANY_REQUESTS, self.to_string()),
        }
    }

    /// HTTP status this error responds with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.classify().status
    }

    /// Message that may be shown to the visitor.
    #[must_use]
    pub fn public_message(&self) -> String {
        self.classify().message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let classified = self.classify();

        // Capture server errors to Sentry
        if classified.report {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Internal details never reach the client
        let mut response = (classified.status, classified.message).into_response();
        if let Some(seconds) = classified.retry_after
            && let Ok(value) = HeaderValue::from_str(&seconds.to_string())
        {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
