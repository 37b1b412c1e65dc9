use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    ContactRelationUpdate,
    Typing,
    EndOfConversation,
    Event,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Message => "message",
            ActivityType::ConversationUpdate => "conversationUpdate",
            ActivityType::ContactRelationUpdate => "contactRelationUpdate",
            ActivityType::Typing => "typing",
            ActivityType::EndOfConversation => "endOfConversation",
            ActivityType::Event => "event",
            ActivityType::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "message" => ActivityType::Message,
            "conversationUpdate" => ActivityType::ConversationUpdate,
            "contactRelationUpdate" => ActivityType::ContactRelationUpdate,
            "typing" => ActivityType::Typing,
            "endOfConversation" => ActivityType::EndOfConversation,
            "event" => ActivityType::Event,
            other => ActivityType::Other(other.to_string()),
        }
    }
}

impl From<String> for ActivityType {
    fn from(s: String) -> Self {
        ActivityType::parse(&s)
    }
}

impl From<ActivityType> for String {
    fn from(t: ActivityType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Inbound interaction as delivered by a Bot Framework channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service_url: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub from: Option<ChannelAccount>,
    #[serde(default)]
    pub conversation: Option<ConversationAccount>,
    #[serde(default)]
    pub recipient: Option<ChannelAccount>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
}

impl Activity {
    /// Message activity for callers that have no channel, e.g. the dev endpoint.
    pub fn message(text: &str) -> Self {
        Self {
            activity_type: ActivityType::Message,
            id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp: Some(Utc::now()),
            service_url: None,
            channel_id: Some("dev".to_string()),
            from: Some(ChannelAccount {
                id: "dev-user".to_string(),
                name: None,
            }),
            conversation: Some(ConversationAccount {
                id: uuid::Uuid::new_v4().to_string(),
                name: None,
            }),
            recipient: Some(ChannelAccount {
                id: "roombot".to_string(),
                name: None,
            }),
            text: Some(text.to_string()),
            members_added: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
