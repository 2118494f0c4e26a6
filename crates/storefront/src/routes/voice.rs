//! Voice command endpoint.
//!
//! The browser transcribes speech and posts the text here. The transcript is
//! matched against local rules first and falls back to the ordering
//! assistant.

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::cart::{self, CartSummary};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::routes::cart::CART_UPDATED_TRIGGER;
use crate::state::AppState;
use crate::voice::{Executor, VoiceOutcome};

/// Voice command request body.
#[derive(Debug, Deserialize)]
pub struct VoiceCommandRequest {
    pub transcript: String,
}

/// Voice command result.
#[derive(Debug, Serialize)]
pub struct VoiceCommandResponse {
    #[serde(flatten)]
    pub outcome: VoiceOutcome,
    /// Present when the command changed the cart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartSummary>,
}

/// Classify and execute a transcript.
#[instrument(skip(state, session, auth, request), fields(chars = request.transcript.chars().count()))]
pub async fn command(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Json(request): Json<VoiceCommandRequest>,
) -> Result<Response> {
    let mut cart = cart::store::load(&session).await;
    let mut conversation: Option<String> = session
        .get(session_keys::ASSISTANT_SESSION)
        .await
        .ok()
        .flatten();
    let previous_conversation = conversation.clone();

    let executor = Executor::new(state.backend(), state.config().voice.assistant_enabled);
    let outcome = executor
        .handle(
            &request.transcript,
            &mut cart,
            &mut conversation,
            auth.as_ref().map(|a| &a.token),
        )
        .await?;

    if outcome.cart_changed {
        cart::store::save(&session, &cart).await?;
    }
    if conversation != previous_conversation
        && let Some(id) = &conversation
    {
        session.insert(session_keys::ASSISTANT_SESSION, id).await?;
    }

    info!(intent = %outcome.intent, cart_changed = outcome.cart_changed, "Voice command handled");
    add_breadcrumb("voice", outcome.intent.as_str(), None);

    let changed = outcome.cart_changed;
    let body = Json(VoiceCommandResponse {
        cart: changed.then(|| CartSummary::from(&cart)),
        outcome,
    });

    if changed {
        Ok((AppendHeaders([CART_UPDATED_TRIGGER]), body).into_response())
    } else {
        Ok(body.into_response())
    }
}
