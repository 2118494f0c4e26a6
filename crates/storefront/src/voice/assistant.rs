//! Assistant fallback for transcripts no rule understood.

use tracing::{debug, instrument};

use crate::backend::{AccessToken, BackendClient, ChatContext, ChatRequest, ChatResponse};
use crate::cart::Cart;

use super::VoiceError;

/// Source tag sent with every voice-originated chat message.
const VOICE_SOURCE: &str = "voice";

/// Wraps the backend AI chat endpoint for voice ordering.
pub struct Assistant<'a> {
    backend: &'a BackendClient,
}

impl<'a> Assistant<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Ask the assistant to resolve a transcript against the current cart.
    ///
    /// `conversation` is the chat session ID from earlier turns; the caller
    /// stores the ID returned in the response for the next turn.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Assistant` if the chat call fails.
    #[instrument(skip(self, transcript, cart, token))]
    pub async fn resolve(
        &self,
        transcript: &str,
        cart: &Cart,
        conversation: Option<String>,
        token: Option<&AccessToken>,
    ) -> Result<ChatResponse, VoiceError> {
        let request = ChatRequest {
            message: transcript.to_string(),
            session_id: conversation,
            context: ChatContext {
                source: VOICE_SOURCE,
                cart: cart.chat_context(),
            },
        };

        let response = self.backend.chat(&request, token).await?;
        debug!(actions = response.actions.len(), "Assistant replied");
        Ok(response)
    }
}
