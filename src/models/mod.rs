pub mod activity;
pub mod entities;
pub mod recognizer;

pub use activity::{Activity, ActivityType, ChannelAccount, ConversationAccount};
pub use entities::{BookingEntities, EntityBag, EntityCategory, EntityValue};
pub use recognizer::{RecognizerResult, NONE_INTENT};
