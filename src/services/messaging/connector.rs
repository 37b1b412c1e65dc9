use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::MessagingProvider;
use crate::config::AppConfig;
use crate::models::Activity;

const TOKEN_URL: &str = "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";
const TOKEN_SCOPE: &str = "https://api.botframework.com/.default";
/// Tokens are renewed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// How replies authenticate against the connector.
pub enum ConnectorAuth {
    /// No `Authorization` header (local emulator).
    Anonymous,
    /// A pre-issued bearer token. It is never renewed here, so it stops
    /// working once it expires unless something outside the process replaces it.
    Static(String),
    /// App id and password exchanged for short-lived tokens, renewed on demand.
    Credentials { app_id: String, app_password: String },
}

impl ConnectorAuth {
    /// Credentials win over a static token.
    pub fn from_config(config: &AppConfig) -> Self {
        if !config.bot_app_id.is_empty() && !config.bot_app_password.is_empty() {
            ConnectorAuth::Credentials {
                app_id: config.bot_app_id.clone(),
                app_password: config.bot_app_password.clone(),
            }
        } else if !config.bot_connector_token.is_empty() {
            ConnectorAuth::Static(config.bot_connector_token.clone())
        } else {
            ConnectorAuth::Anonymous
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// Posts replies back through the Bot Framework connector of the channel
/// that delivered the activity.
pub struct BotConnectorProvider {
    auth: ConnectorAuth,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
    client: reqwest::Client,
}

impl BotConnectorProvider {
    pub fn new(auth: ConnectorAuth) -> Self {
        Self {
            auth,
            token_url: TOKEN_URL.to_string(),
            cached: Mutex::new(None),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ConnectorAuth::from_config(config))
    }

    async fn bearer_token(&self) -> anyhow::Result<Option<String>> {
        match &self.auth {
            ConnectorAuth::Anonymous => Ok(None),
            ConnectorAuth::Static(token) => Ok(Some(token.clone())),
            ConnectorAuth::Credentials {
                app_id,
                app_password,
            } => {
                let mut cached = self.cached.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                    return Ok(Some(token.value.clone()));
                }
                let token = self.fetch_token(app_id, app_password).await?;
                tracing::debug!("renewed bot connector token");
                let value = token.value.clone();
                *cached = Some(token);
                Ok(Some(value))
            }
        }
    }

    async fn fetch_token(&self, app_id: &str, app_password: &str) -> anyhow::Result<CachedToken> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", app_id),
                ("client_secret", app_password),
                ("scope", TOKEN_SCOPE),
            ])
            .send()
            .await
            .context("failed to request bot connector token")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse token response")?;

        if !status.is_success() {
            anyhow::bail!("token endpoint error ({}): {}", status, data);
        }

        parse_token_response(&data, Instant::now())
    }
}

fn parse_token_response(data: &Value, now: Instant) -> anyhow::Result<CachedToken> {
    let value = data["access_token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing access_token in token response"))?;
    let expires_in = data["expires_in"].as_u64().unwrap_or(3600);
    Ok(CachedToken {
        value: value.to_string(),
        expires_at: now + Duration::from_secs(expires_in),
    })
}

fn reply_url(activity: &Activity) -> Option<String> {
    let service_url = activity.service_url.as_deref()?;
    let conversation = activity.conversation.as_ref()?;
    let base = format!(
        "{}/v3/conversations/{}/activities",
        service_url.trim_end_matches('/'),
        conversation.id
    );
    Some(match &activity.id {
        Some(id) => format!("{base}/{id}"),
        None => base,
    })
}

fn reply_body(activity: &Activity, text: &str) -> Value {
    json!({
        "type": "message",
        "text": text,
        "locale": "de-DE",
        "from": activity.recipient,
        "recipient": activity.from,
        "conversation": activity.conversation,
        "replyToId": activity.id,
    })
}

#[async_trait]
impl MessagingProvider for BotConnectorProvider {
    async fn send_reply(&self, activity: &Activity, text: &str) -> anyhow::Result<()> {
        let Some(url) = reply_url(activity) else {
            tracing::debug!("activity has no serviceUrl or conversation, skipping delivery");
            return Ok(());
        };

        let mut req = self.client.post(&url).json(&reply_body(activity, text));
        if let Some(token) = self.bearer_token().await? {
            req = req.bearer_auth(token);
        }

        req.send()
            .await
            .context("failed to send reply to bot connector")?
            .error_for_status()
            .context("bot connector returned error")?;

        Ok(())
    }
}
