use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use tokio::time::timeout;
use tracing::warn;

use crate::config::Config;

const MODEL_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f32 = 0.1;

/// Seam between the agent and the generation backend. `generate` never
/// fails: whatever goes wrong on the wire comes back as an empty string, and
/// the turn degrades to a parse-failure answer instead of taking the loop
/// down.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> String;
    fn name(&self) -> &str;
}

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        OllamaClient {
            client: Ollama::new(config.ollama_host.clone(), config.ollama_port),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> String {
        let request = GenerationRequest::new(self.model.clone(), prompt.to_string())
            .options(ModelOptions::default().temperature(TEMPERATURE));

        match timeout(MODEL_TIMEOUT, self.client.generate(request)).await {
            Ok(Ok(response)) => response.response.trim().to_string(),
            Ok(Err(e)) => {
                warn!("model request failed: {}", e);
                String::new()
            }
            Err(_) => {
                warn!("model request timed out after {:?}", MODEL_TIMEOUT);
                String::new()
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}
