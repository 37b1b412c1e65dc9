use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::NluRecognizer;
use crate::config::AppConfig;
use crate::models::{EntityBag, EntityCategory, EntityValue, RecognizerResult, NONE_INTENT};

#[derive(Debug, Clone, Default)]
pub struct LuisOptions {
    pub staging: bool,
    pub timezone_offset: Option<i32>,
    pub log: bool,
}

pub struct LuisRecognizer {
    endpoint: String,
    app_id: String,
    api_key: String,
    options: LuisOptions,
    client: reqwest::Client,
}

impl LuisRecognizer {
    pub fn new(endpoint: String, app_id: String, api_key: String, options: LuisOptions) -> Self {
        Self {
            endpoint,
            app_id,
            api_key,
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.luis_endpoint.clone(),
            config.luis_app_id.clone(),
            config.luis_api_key.clone(),
            LuisOptions {
                staging: config.luis_staging,
                timezone_offset: config.luis_timezone_offset,
                log: config.luis_log,
            },
        )
    }

    fn query_params(&self, utterance: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", utterance.to_string()),
            ("verbose", "true".to_string()),
            ("log", self.options.log.to_string()),
        ];
        if self.options.staging {
            params.push(("staging", "true".to_string()));
        }
        if let Some(offset) = self.options.timezone_offset {
            params.push(("timezoneOffset", offset.to_string()));
        }
        params
    }
}

#[async_trait]
impl NluRecognizer for LuisRecognizer {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<RecognizerResult> {
        let url = format!(
            "{}/luis/v2.0/apps/{}",
            self.endpoint.trim_end_matches('/'),
            self.app_id
        );

        let resp = self
            .client
            .get(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&self.query_params(utterance))
            .send()
            .await
            .context("failed to call LUIS API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse LUIS response")?;

        if !status.is_success() {
            anyhow::bail!("LUIS API error ({}): {}", status, data);
        }

        parse_luis_response(utterance, &data)
    }
}

fn parse_luis_response(utterance: &str, data: &Value) -> anyhow::Result<RecognizerResult> {
    anyhow::ensure!(data.is_object(), "unexpected LUIS response: {data}");

    let top = data.get("topScoringIntent");
    let top_intent = top
        .and_then(|t| t["intent"].as_str())
        .unwrap_or(NONE_INTENT)
        .to_string();
    let score = top.and_then(|t| t["score"].as_f64());

    let mut entities = EntityBag::new();
    if let Some(list) = data["entities"].as_array() {
        for entity in list {
            if let Some((key, value)) = translate_entity(entity) {
                entities.push(&key, value);
            }
        }
    }

    Ok(RecognizerResult {
        text: data["query"].as_str().unwrap_or(utterance).to_string(),
        top_intent,
        score,
        entities,
    })
}

/// Maps one LUIS entity instance to its bag key and value. List entities keep
/// their canonical values as a nested sequence.
fn translate_entity(entity: &Value) -> Option<(String, EntityValue)> {
    let kind = entity["type"].as_str()?;
    let text = entity["entity"].as_str().unwrap_or_default();

    if kind.starts_with("builtin.datetimeV2") {
        let value = entity["resolution"]["values"][0]["value"]
            .as_str()
            .unwrap_or(text);
        let clock = time_of_day(value)?;
        return Some((EntityCategory::DateTime.key().to_string(), EntityValue::text(clock)));
    }

    let key = kind.strip_prefix("builtin.").unwrap_or(kind).to_string();
    match entity["resolution"]["values"].as_array() {
        Some(values) => {
            let values: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
            Some((key, EntityValue::list(values)))
        }
        None => Some((key, EntityValue::text(text))),
    }
}

/// `"2024-03-02 14:30:00"` -> `"14:30:00"`. Date-only values carry no clock.
fn time_of_day(value: &str) -> Option<&str> {
    let clock = value.rsplit(' ').next().unwrap_or(value).trim();
    if clock.contains(':') {
        Some(clock)
    } else {
        None
    }
}
