//! One slot's generation pipeline: request, sanitize, validate, retry with backoff,
//! and fall back to the default meals once the retry budget is spent.

use std::sync::Arc;

use tokio::time::sleep;

use crate::data_backend::{build_prompt, MealModel};
use crate::data_types::{
    MealOptionSet, Resolution, RetryPolicy, SamplingConfig, SlotKind, SlotOutcome,
};
use crate::default_meals::default_option_set;
use crate::diversity::too_similar;
use crate::errors::GenerationError;
use crate::meal_sanitizer::sanitize_options;

pub struct SlotGenerator {
    model: Arc<dyn MealModel>,
    retry: RetryPolicy,
    sampling: SamplingConfig,
}

impl SlotGenerator {
    pub fn new(model: Arc<dyn MealModel>, retry: RetryPolicy, sampling: SamplingConfig) -> Self {
        SlotGenerator {
            model,
            retry,
            sampling,
        }
    }

    /// Always returns an option set with the slot's arity.
    pub async fn generate(&self, slot: SlotKind) -> MealOptionSet {
        self.run(slot).await.options
    }

    pub async fn run(&self, slot: SlotKind) -> SlotOutcome {
        let prompt = build_prompt(slot);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.attempt(slot, &prompt).await {
                Ok(options) => {
                    if let Some(second) = options.option2.as_ref() {
                        if too_similar(&options.option1, second) {
                            log::warn!(
                                "{}: '{}' and '{}' are too similar, using default meals",
                                slot,
                                options.option1.name,
                                second.name
                            );
                            return SlotOutcome {
                                options: default_option_set(slot),
                                attempts: attempt,
                                resolution: Resolution::TooSimilar,
                            };
                        }
                    }

                    log::debug!("{}: generated on attempt {}", slot, attempt);
                    return SlotOutcome {
                        options,
                        attempts: attempt,
                        resolution: Resolution::Generated,
                    };
                }
                Err(e) => {
                    log::error!("{}: generation attempt {} failed: {}", slot, attempt, e);
                    if attempt > self.retry.max_retries {
                        break;
                    }
                    let delay = self.retry.delay_after(attempt);
                    log::info!("{}: retrying in {:.2?}", slot, delay);
                    sleep(delay).await;
                }
            }
        }

        log::warn!(
            "{}: no usable meal after {} attempts, using default meals",
            slot,
            attempt
        );
        SlotOutcome {
            options: default_option_set(slot),
            attempts: attempt,
            resolution: Resolution::RetriesExhausted,
        }
    }

    async fn attempt(
        &self,
        slot: SlotKind,
        prompt: &str,
    ) -> Result<MealOptionSet, GenerationError> {
        let raw = self.model.invoke(prompt, &self.sampling).await?;
        match sanitize_options(&raw, slot.arity()) {
            Ok(options) => Ok(options),
            Err(e) => {
                log::debug!("{}: unusable model output: {}", slot, raw);
                Err(e.into())
            }
        }
    }
}
