//! Cart persistence in the visitor session.

use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

use super::Cart;

/// Load the cart from the session.
///
/// A missing or undecodable entry yields an empty cart.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable cart from session");
            Cart::default()
        }
    }
}

/// Write the cart to the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Remove the cart from the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::CART).await.map(|_| ())
}
