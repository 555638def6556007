use crate::config::AiModelConfig;
use crate::ollama::{self, OllamaClient};

/// Environment problems that make it pointless to continue.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Cannot connect to Ollama: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Error initializing LLM: {0:#}")]
    ClientBuild(#[source] anyhow::Error),
}

impl InitError {
    /// What the operator should do about it.
    pub fn hint(&self) -> &'static str {
        match self {
            InitError::Unreachable(_) => "Make sure Ollama is running with 'ollama serve'",
            InitError::ClientBuild(_) => "Check the [ai_model] section of config.toml",
        }
    }
}

/// A reachable server and a model client bound to it.
pub struct Session {
    pub status: String,
    pub client: OllamaClient,
}

/// Probe the endpoint, then build the model client.
///
/// The client is only constructed once the probe has succeeded.
pub async fn initialize(config: &AiModelConfig) -> Result<Session, InitError> {
    let status = ollama::probe(&config.endpoint)
        .await
        .map_err(InitError::Unreachable)?;
    log::info!("Ollama reachable at {}", config.endpoint);

    let client = OllamaClient::new(&config.endpoint, &config.model, config.temperature)
        .map_err(InitError::ClientBuild)?;
    log::info!("LLM client ready (model={}, temperature={})", client.model, client.temperature);

    Ok(Session { status, client })
}
