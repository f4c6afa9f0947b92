use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};

pub const EMPTY_ANSWER: &str = "No response received";

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// POST /api/ai/ask - forward one prompt to the completion provider
pub async fn ai_ask(State(state): State<AppState>, ValidJson(body): ValidJson<AskRequest>) -> ApiResult<AskResponse> {
    let prompt = body
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required"))?;

    let mut answer = state.assistant.complete(&prompt).await?;
    if answer.is_empty() {
        answer = EMPTY_ANSWER.to_string();
    }

    Ok(ApiResponse::success(AskResponse { answer }))
}
