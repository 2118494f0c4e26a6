//! AI chat endpoint.

use reqwest::Method;
use tracing::instrument;

use super::types::{AccessToken, ChatRequest, ChatResponse};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Send a message to the ordering assistant.
    ///
    /// Anonymous visitors may chat; the token only personalises the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the reply is malformed.
    #[instrument(skip(self, request, token), fields(session_id = ?request.session_id))]
    pub async fn chat(
        &self,
        request: &ChatRequest,
        token: Option<&AccessToken>,
    ) -> Result<ChatResponse, ApiError> {
        self.send_json(Method::POST, "ai/chat", request, token)
            .await
    }
}
