use chrono::{Local, NaiveDateTime};

use crate::models::{Activity, ActivityType, BookingEntities};
use crate::services::booking::build_phrase;
use crate::services::nlu::NluRecognizer;
use crate::state::AppState;

pub const FALLBACK: &str = "Die Eingabe wurde nicht verstanden, bitte wiederholen.";
pub const GREETING: &str =
    "Willkommen! Sagen Sie mir, welchen Raum Sie wann und für wie viele Personen buchen möchten.";

/// Handles one inbound activity and returns the replies to send, in order.
/// Only message activities reach the NLU service.
pub async fn process_activity(state: &AppState, activity: &Activity) -> anyhow::Result<Vec<String>> {
    match &activity.activity_type {
        ActivityType::Message => {
            process_message(state.nlu.as_ref(), activity.text(), Local::now().naive_local()).await
        }
        ActivityType::ConversationUpdate => Ok(greeting(activity).into_iter().collect()),
        other => Ok(vec![format!("[{}]-type activity detected.", other.as_str())]),
    }
}

pub async fn process_message(
    nlu: &dyn NluRecognizer,
    utterance: &str,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<String>> {
    let result = nlu.recognize(utterance).await?;
    let entities = BookingEntities::from_bag(&result.entities);

    tracing::info!(
        intent = %result.top_intent,
        score = ?result.score,
        "recognized utterance"
    );
    tracing::debug!(?entities, "normalized entities");

    // The person-count notification goes out even when the intent is unknown.
    let mut replies = Vec::new();
    let phrase = match build_phrase(&entities, now) {
        Ok(phrase) => Some(phrase),
        Err(e) => {
            tracing::warn!(error = %e, "booking phrase rejected");
            replies.push(e.to_string());
            None
        }
    };

    match phrase {
        Some(phrase) if result.is_recognized() => replies.push(phrase),
        _ => replies.push(FALLBACK.to_string()),
    }
    Ok(replies)
}

/// Greets when someone other than the bot joins.
fn greeting(activity: &Activity) -> Option<String> {
    let joined = activity.members_added.first()?;
    let bot_id = activity.recipient.as_ref().map(|r| r.id.as_str());
    if bot_id == Some(joined.id.as_str()) {
        None
    } else {
        Some(GREETING.to_string())
    }
}
