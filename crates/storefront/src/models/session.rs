//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use juicequ_core::{Email, UserId, UserRole};

use crate::backend::User;

/// Session-stored user identity.
///
/// A copy of the backend profile taken at login. The backend stays the
/// source of truth; this only drives navigation and role gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Account role.
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend bearer token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for Google OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the assistant conversation ID.
    pub const ASSISTANT_SESSION: &str = "assistant_session_id";
}
