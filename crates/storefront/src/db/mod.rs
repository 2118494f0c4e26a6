//! `PostgreSQL` connection for the storefront.
//!
//! # Database: `jq_storefront`
//!
//! The backend owns every durable business record. Locally the storefront
//! only keeps:
//!
//! ## Tables
//!
//! - `tower_sessions.session` - Visitor sessions (auth copy, cart, voice
//!   conversation ID)
//!
//! # Migrations
//!
//! The session table is created via:
//! ```bash
//! cargo run -p juicequ-cli -- migrate sessions
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Check that the database answers a trivial query.
pub async fn ping(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}
