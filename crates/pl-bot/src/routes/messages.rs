//! Message ingestion endpoint used by transport adapters.

use axum::Json;
use axum::extract::State;
use pl_protocol::{IncomingMessage, Reply};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for submitting a user utterance.
#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    /// Chat or session identifier; replies are ordered per conversation.
    pub conversation_id: String,
    /// Raw user text.
    pub text: String,
    /// Client locale (e.g., "it-IT").
    #[serde(default)]
    pub locale: Option<String>,
    /// Region already known for this user.
    #[serde(default)]
    pub region: Option<String>,
}

/// POST /api/v1/messages: answer one utterance.
pub async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<SubmitMessageRequest>,
) -> ApiResult<Json<Reply>> {
    let conversation_id = req.conversation_id.trim();
    if conversation_id.is_empty() {
        return Err(ApiError::BadRequest(
            "conversation_id must not be empty".into(),
        ));
    }

    let message = IncomingMessage {
        conversation_id: conversation_id.to_string(),
        text: req.text,
        locale_hint: req.locale.filter(|l| !l.trim().is_empty()),
        region_hint: req.region.filter(|r| !r.trim().is_empty()),
    };

    // Detached so a dropped HTTP connection cannot abandon a queued turn.
    let dispatcher = state.dispatcher.clone();
    let reply = tokio::spawn(async move { dispatcher.submit(message).await })
        .await
        .map_err(|e| ApiError::Internal(format!("message task failed: {e}")))?;

    Ok(Json(reply))
}
