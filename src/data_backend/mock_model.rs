//! Test doubles for [`MealModel`].

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use super::MealModel;
use crate::data_types::SamplingConfig;
use crate::errors::ModelError;

#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Timeout,
    ApiError(u16),
}

impl Step {
    fn into_result(self) -> Result<String, ModelError> {
        match self {
            Step::Reply(text) => Ok(text),
            Step::Timeout => Err(ModelError::Timeout(Duration::from_secs(30))),
            Step::ApiError(status) => Err(ModelError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// Plays back a script of replies; the last step repeats once the script runs out.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or(Step::Timeout);
        ScriptedModel {
            steps: Mutex::new(steps.into()),
            last,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MealModel for ScriptedModel {
    async fn invoke(
        &self,
        _prompt: &str,
        _sampling: &SamplingConfig,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        step.into_result()
    }
}

/// Answers through a closure over the prompt, for tests that need per-slot replies.
pub struct FnModel<F> {
    reply: F,
    calls: AtomicUsize,
}

impl<F> FnModel<F>
where
    F: Fn(&str) -> Step + Send + Sync,
{
    pub fn new(reply: F) -> Self {
        FnModel {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> MealModel for FnModel<F>
where
    F: Fn(&str) -> Step + Send + Sync,
{
    async fn invoke(&self, prompt: &str, _sampling: &SamplingConfig) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(prompt).into_result()
    }
}

/// A syntactically valid single-option reply.
pub fn one_option_reply(name: &str) -> String {
    serde_json::json!({
        "option1": {
            "name": name,
            "description": "Test dish",
            "ingredients": ["Eggs", "Cheese", "Olives"],
            "preparationTime": "15 minutes",
            "difficulty": "Easy",
            "calories": 450,
            "nutritionalInfo": {"protein": "22g", "carbs": "18g", "fat": "25g", "fiber": "3g"},
            "servingSize": "1 plate",
            "cuisine": "Turkish Cuisine"
        }
    })
    .to_string()
}

/// A two-option reply; `distinct` controls whether the options pass the diversity check.
pub fn two_option_reply(first: &str, second: &str, distinct: bool) -> String {
    let (second_ingredients, second_calories) = if distinct {
        (vec!["Lamb", "Eggplant", "Yogurt"], 800)
    } else {
        (vec!["Rice", "Chicken", "Butter"], 700)
    };
    serde_json::json!({
        "option1": {
            "name": first,
            "description": "First test dish",
            "ingredients": ["Rice", "Chicken", "Butter"],
            "preparationTime": "40 minutes",
            "difficulty": "Medium",
            "calories": 650,
            "nutritionalInfo": {"protein": "35g", "carbs": "70g", "fat": "20g", "fiber": "4g"},
            "servingSize": "1 plate",
            "cuisine": "Turkish Cuisine"
        },
        "option2": {
            "name": second,
            "description": "Second test dish",
            "ingredients": second_ingredients,
            "preparationTime": "50 minutes",
            "difficulty": "Hard",
            "calories": second_calories,
            "nutritionalInfo": {"protein": "40g", "carbs": "30g", "fat": "35g", "fiber": "9g"},
            "servingSize": "1 plate",
            "cuisine": "Turkish Cuisine"
        }
    })
    .to_string()
}
