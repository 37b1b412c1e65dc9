use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub luis_endpoint: String,
    pub luis_app_id: String,
    pub luis_api_key: String,
    pub luis_staging: bool,
    pub luis_timezone_offset: Option<i32>,
    pub luis_log: bool,
    /// Empty disables signature validation on `/api/messages`.
    pub bot_shared_secret: String,
    /// Pre-issued connector token. Connector tokens expire after about an
    /// hour and this value is not renewed, so prefer `bot_app_id` and
    /// `bot_app_password` outside of short local sessions.
    pub bot_connector_token: String,
    /// Bot registration used to fetch and renew connector tokens.
    pub bot_app_id: String,
    pub bot_app_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3978),
            luis_endpoint: env::var("LUIS_ENDPOINT")
                .unwrap_or_else(|_| "https://westeurope.api.cognitive.microsoft.com".to_string()),
            luis_app_id: env::var("LUIS_APP_ID").unwrap_or_default(),
            luis_api_key: env::var("LUIS_API_KEY").unwrap_or_default(),
            luis_staging: env_flag("LUIS_STAGING", false),
            luis_timezone_offset: env::var("LUIS_TIMEZONE_OFFSET")
                .ok()
                .and_then(|v| v.parse().ok()),
            luis_log: env_flag("LUIS_LOG", true),
            bot_shared_secret: env::var("BOT_SHARED_SECRET").unwrap_or_default(),
            bot_connector_token: env::var("BOT_CONNECTOR_TOKEN").unwrap_or_default(),
            bot_app_id: env::var("BOT_APP_ID").unwrap_or_default(),
            bot_app_password: env::var("BOT_APP_PASSWORD").unwrap_or_default(),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => parse_flag(&v).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
