use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::{info, warn};

use loanlens_agent::{DecisionEngine, LlmError, OpenAiClient};
use loanlens_core::config::{AppConfig, ConfigError};
use loanlens_core::errors::ApplicationError;

use crate::mailer::SmtpMailer;
use crate::report::ReportRenderer;
use crate::routes::{self, AppState};

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[from] LlmError),
    #[error("mail transport initialization failed: {0}")]
    Mailer(ApplicationError),
}

pub fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let client = Arc::new(OpenAiClient::from_config(&config.llm)?);
    let engine = DecisionEngine::new(client);
    info!(
        event_name = "system.bootstrap.decision_engine_ready",
        model = %config.llm.model,
        "decision engine client constructed"
    );

    let renderer = match ReportRenderer::new("templates/reports") {
        Ok(renderer) => renderer,
        Err(error) => {
            warn!(error = %error, "filesystem templates unavailable, using embedded template");
            ReportRenderer::with_embedded_template()
        }
    };

    let mailer = SmtpMailer::from_config(&config.smtp).map_err(BootstrapError::Mailer)?;

    let router = routes::router(AppState {
        engine,
        renderer: Arc::new(renderer),
        mailer: Arc::new(mailer),
    });

    info!(event_name = "system.bootstrap.complete", "application bootstrap complete");
    Ok(Application { config, router })
}
