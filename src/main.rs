use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use roombot::config::AppConfig;
use roombot::services::messaging::connector::BotConnectorProvider;
use roombot::services::nlu::luis::LuisRecognizer;
use roombot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(!config.luis_app_id.is_empty(), "LUIS_APP_ID must be set");
    anyhow::ensure!(!config.luis_api_key.is_empty(), "LUIS_API_KEY must be set");

    tracing::info!(
        "using LUIS app {} (endpoint: {}, staging: {})",
        config.luis_app_id,
        config.luis_endpoint,
        config.luis_staging
    );
    if (config.bot_app_id.is_empty() || config.bot_app_password.is_empty())
        && !config.bot_connector_token.is_empty()
    {
        tracing::warn!("using static BOT_CONNECTOR_TOKEN, it will not be renewed once it expires");
    }
    if config.bot_shared_secret.is_empty() {
        tracing::warn!("BOT_SHARED_SECRET not set, accepting unsigned activities");
    }

    let state = Arc::new(AppState {
        nlu: Box::new(LuisRecognizer::from_config(&config)),
        messaging: Box::new(BotConnectorProvider::from_config(&config)),
        config: config.clone(),
    });

    let app = roombot::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
