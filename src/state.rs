use crate::config::AppConfig;
use crate::services::messaging::MessagingProvider;
use crate::services::nlu::NluRecognizer;

pub struct AppState {
    pub config: AppConfig,
    pub nlu: Box<dyn NluRecognizer>,
    pub messaging: Box<dyn MessagingProvider>,
}
