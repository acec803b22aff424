use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::{map_transport_error, truncate_body, MealModel};
use crate::data_types::model_data_types::{
    OllamaGenerateRequest, OllamaGenerateResponse, OllamaOptions,
};
use crate::data_types::SamplingConfig;
use crate::errors::ModelError;

/// Ollama `/generate` endpoint, e.g. host `http://127.0.0.1:11434/api`.
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(host: String, model: String, timeout: Duration) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(OllamaClient {
            client,
            host: host.trim_end_matches('/').to_string(),
            model,
            timeout,
        })
    }
}

#[async_trait]
impl MealModel for OllamaClient {
    async fn invoke(&self, prompt: &str, sampling: &SamplingConfig) -> Result<String, ModelError> {
        let params = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: sampling.temperature,
                top_k: sampling.top_k,
                top_p: sampling.top_p,
            },
        };

        let now = Instant::now();
        let res = self
            .client
            .post(format!("{}/generate", self.host))
            .json(&params)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.timeout))?;
        log::debug!("Ollama response ({}): {:.2?}", status, now.elapsed());

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let parsed: OllamaGenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ModelError::InvalidResponse(format!("{}: {}", e, truncate_body(&body))))?;
        Ok(parsed.response)
    }
}
