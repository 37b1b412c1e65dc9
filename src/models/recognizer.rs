use serde::{Deserialize, Serialize};

use super::EntityBag;

/// Intent label the NLU model reports when nothing matched.
pub const NONE_INTENT: &str = "None";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerResult {
    pub text: String,
    pub top_intent: String,
    pub score: Option<f64>,
    pub entities: EntityBag,
}

impl RecognizerResult {
    pub fn is_recognized(&self) -> bool {
        self.top_intent != NONE_INTENT
    }
}
