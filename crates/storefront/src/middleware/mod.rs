//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Security headers (CSP, permissions policy, etc.)
//! 6. Rate limiting (governor, auth and voice routes only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, Authenticated, OptionalAuth, RequireAdmin, RequireAuth, RequireStaff,
    clear_authenticated, expire_on_unauthorized, is_local_path, set_authenticated,
};
pub use rate_limit::{auth_rate_limiter, voice_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
