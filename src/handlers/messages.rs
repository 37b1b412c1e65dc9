use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;

use crate::errors::AppError;
use crate::models::Activity;
use crate::services::turn;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RepliesResponse {
    pub replies: Vec<String>,
}

/// Checks `signature` as base64 HMAC-SHA1 of the raw request body.
fn validate_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };

    let mut mac = match Hmac::<Sha1>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// POST /api/messages
pub async fn messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RepliesResponse>, AppError> {
    // Skip validation when no secret is configured (dev mode)
    if !state.config.bot_shared_secret.is_empty() {
        let signature = headers
            .get("x-bot-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing X-Bot-Signature header");
            return Err(AppError::Unauthorized);
        }

        if !validate_signature(&state.config.bot_shared_secret, signature, &body) {
            tracing::warn!("invalid bot signature");
            return Err(AppError::Unauthorized);
        }
    }

    let activity: Activity =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(
        activity_type = activity.activity_type.as_str(),
        channel = activity.channel_id.as_deref().unwrap_or("-"),
        "incoming activity"
    );

    let replies = turn::process_activity(&state, &activity)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "turn processing failed");
            AppError::Nlu(e.to_string())
        })?;

    for reply in &replies {
        if let Err(e) = state.messaging.send_reply(&activity, reply).await {
            tracing::error!(error = %e, "failed to send reply");
        }
    }

    Ok(Json(RepliesResponse { replies }))
}
