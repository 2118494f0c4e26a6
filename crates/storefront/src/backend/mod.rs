//! JuiceQu REST backend client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for users, products, orders and
//!   vouchers - the storefront never persists them
//! - One shared `reqwest` client, JSON in and out, bearer token per call
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//!
//! # Endpoint Groups
//!
//! | Module | Prefix | Used by |
//! |--------|--------|---------|
//! | `auth` | `/auth` | login, register, Google OAuth |
//! | `catalog` | `/products`, `/categories` | menu, cart, voice ordering |
//! | `customer` | `/customer` | checkout, order history, vouchers |
//! | `cashier` | `/cashier` | order queue, payments, daily report |
//! | `admin` | `/admin` | stats, product/user/voucher management |
//! | `chat` | `/ai/chat` | voice assistant fallback |
//!
//! # Example
//!
//! ```rust,ignore
//! use juicequ_storefront::backend::{BackendClient, ProductQuery};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let page = client.list_products(&ProductQuery::search("mangga")).await?;
//! ```

mod admin;
mod auth;
mod cache;
mod cashier;
mod catalog;
mod chat;
mod client;
mod customer;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Maximum number of body characters carried into error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the JuiceQu backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state (e.g. email already registered).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend rejected the input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Extracted error message.
        message: String,
    },
}

impl ApiError {
    /// Message that is safe to show to the visitor, for client-side (4xx) failures.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Validation(msg) => Some(msg),
            _ => None,
        }
    }

    /// Whether the failure means the stored bearer token is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Error body shape returned by the backend: `{"detail": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Deserialize)]
struct FieldError {
    msg: String,
    #[serde(default)]
    loc: Vec<serde_json::Value>,
}

/// Extract a human readable message from an error response body.
///
/// Falls back to the (truncated) raw body, or the status reason when the
/// body is empty.
pub(crate) fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return match parsed.detail {
            ErrorDetail::Message(msg) => msg,
            ErrorDetail::Fields(fields) => fields
                .iter()
                .map(|f| match f.loc.last() {
                    Some(serde_json::Value::String(field)) => format!("{field}: {}", f.msg),
                    _ => f.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

/// Map a non-success status to an [`ApiError`].
pub(crate) fn error_for_status(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> ApiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ApiError::RateLimited(retry_after.unwrap_or(1));
    }

    let message = extract_error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Validation(message)
        }
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_detail() {
        let msg = extract_error_message(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Voucher sudah kedaluwarsa"}"#,
        );
        assert_eq!(msg, "Voucher sudah kedaluwarsa");
    }

    #[test]
    fn test_extract_field_errors() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email address"},
            {"loc": [], "msg": "password too short"}
        ]}"#;
        let msg = extract_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            msg,
            "email: value is not a valid email address; password too short"
        );
    }

    #[test]
    fn test_extract_falls_back_to_raw_body() {
        let body = "x".repeat(500);
        let msg = extract_error_message(StatusCode::BAD_GATEWAY, &body);
        assert_eq!(msg.len(), MAX_ERROR_BODY_CHARS);

        let msg = extract_error_message(StatusCode::SERVICE_UNAVAILABLE, "  ");
        assert_eq!(msg, "Service Unavailable");
    }

    #[test]
    fn test_error_for_status_mapping() {
        let detail = r#"{"detail": "nope"}"#;
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, None, detail),
            ApiError::Unauthorized(m) if m == "nope"
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, None, detail),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, None, detail),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, None, detail),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, None, detail),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, None, detail),
            ApiError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_rate_limited_uses_retry_after() {
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, Some(30), ""),
            ApiError::RateLimited(30)
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, None, ""),
            ApiError::RateLimited(1)
        ));
    }

    #[test]
    fn test_user_message_hides_server_failures() {
        assert_eq!(
            ApiError::Validation("kode tidak valid".to_string()).user_message(),
            Some("kode tidak valid")
        );
        let server = ApiError::Status {
            status: 500,
            message: "stack trace".to_string(),
        };
        assert!(server.user_message().is_none());
    }
}
