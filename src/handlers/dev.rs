use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::Activity;
use crate::services::turn;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DevMessage {
    pub message: String,
}

#[derive(Serialize)]
pub struct DevResponse {
    pub replies: Vec<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs a message turn without a channel; replies are only returned.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DevMessage>,
) -> Json<DevResponse> {
    let activity = Activity::message(payload.message.trim());

    match turn::process_activity(&state, &activity).await {
        Ok(replies) => Json(DevResponse {
            replies,
            success: true,
            error: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, "dev turn failed");
            Json(DevResponse {
                replies: Vec::new(),
                success: false,
                error: Some(e.to_string()),
            })
        }
    }
}
