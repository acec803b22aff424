use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::data_types::{Provider, SamplingConfig, SlotKind};
use crate::errors::ModelError;

pub mod gemini_client;
#[cfg(test)]
pub mod mock_model;
pub mod ollama_client;

pub use gemini_client::GeminiClient;
pub use ollama_client::OllamaClient;

/// A generative text model. The returned text is untrusted and may be anything.
#[async_trait]
pub trait MealModel: Send + Sync {
    async fn invoke(&self, prompt: &str, sampling: &SamplingConfig) -> Result<String, ModelError>;
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub provider: Provider,
    pub ollama_host: Option<String>,
    pub ollama_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub timeout: Duration,
}

pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn MealModel>, ModelError> {
    log::debug!("Using {:?} model backend", settings.provider);
    match settings.provider {
        Provider::Ollama => {
            let host = settings
                .ollama_host
                .clone()
                .ok_or(ModelError::Unconfigured("ollama host"))?;
            Ok(Arc::new(OllamaClient::new(
                host,
                settings.ollama_model.clone(),
                settings.timeout,
            )?))
        }
        Provider::Gemini => {
            let key = settings
                .gemini_api_key
                .clone()
                .ok_or(ModelError::Unconfigured("gemini api key"))?;
            Ok(Arc::new(GeminiClient::new(
                key,
                settings.gemini_model.clone(),
                settings.timeout,
            )?))
        }
    }
}

const MEAL_SCHEMA: &str = r#"{
  "name": "dish name",
  "description": "brief description",
  "ingredients": ["list of ingredients, most important first"],
  "preparationTime": "preparation time like '30 minutes'",
  "difficulty": "one of: Easy, Medium, Hard",
  "calories": approximate calories as a number,
  "nutritionalInfo": { "protein": "20g", "carbs": "30g", "fat": "15g", "fiber": "5g" },
  "servingSize": "serving size like '1 plate'",
  "cuisine": "Turkish Cuisine",
  "imagePrompt": "short English description of a photo of the dish"
}"#;

pub fn build_prompt(slot: SlotKind) -> String {
    let meal_kind = match slot {
        SlotKind::Breakfast => "breakfast",
        SlotKind::Lunch => "lunch main course (not a dessert, snack or soup)",
        SlotKind::Dinner => "dinner main course (not a dessert, snack or soup)",
    };

    let options = if slot.arity() == 1 {
        format!(
            "Return a JSON object with exactly one key \"option1\" whose value has \
            this format:\n{MEAL_SCHEMA}"
        )
    } else {
        format!(
            "Generate two clearly different dishes: they must not share their main ingredients \
            and their calories must differ by at least 100. Return a JSON object with \
            exactly two keys, \"option1\" and \"option2\", each with this format:\n{MEAL_SCHEMA}"
        )
    };

    format!(
        "Generate a detailed Turkish recipe for {meal_kind}. Return ONLY the JSON object, \
        without any markdown formatting or explanation. {options}"
    )
}

/// Trims an error body so log lines and error messages stay readable.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout(timeout)
    } else {
        ModelError::Network(e)
    }
}
