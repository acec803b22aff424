use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::{map_transport_error, truncate_body, MealModel};
use crate::constants::GEMINI_API_BASE;
use crate::data_types::model_data_types::{
    GeminiContent, GeminiGenerationConfig, GeminiRequest, GeminiRequestPart, GeminiResponse,
};
use crate::data_types::SamplingConfig;
use crate::errors::ModelError;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(GeminiClient {
            client,
            api_key,
            model,
            timeout,
        })
    }
}

#[async_trait]
impl MealModel for GeminiClient {
    async fn invoke(&self, prompt: &str, sampling: &SamplingConfig) -> Result<String, ModelError> {
        let params = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: sampling.temperature,
                top_k: sampling.top_k,
                top_p: sampling.top_p,
            },
        };

        let now = Instant::now();
        let res = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                GEMINI_API_BASE, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&params)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.timeout))?;
        log::debug!("Gemini response ({}): {:.2?}", status, now.elapsed());

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        serde_json::from_str::<GeminiResponse>(&body)
            .map_err(|e| {
                ModelError::InvalidResponse(format!("{}: {}", e, truncate_body(&body)))
            })?
            .first_text()
            .ok_or_else(|| {
                ModelError::InvalidResponse("response has no text candidate".to_string())
            })
    }
}
