pub mod model_data_types;

use std::{fmt, time::Duration};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DEFAULT_TOP_P, MAX_RETRIES,
    MENU_DATE_FMT,
};

/// The three daily meal positions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Breakfast,
    Lunch,
    Dinner,
}

impl SlotKind {
    pub const ALL: [SlotKind; 3] = [SlotKind::Breakfast, SlotKind::Lunch, SlotKind::Dinner];

    /// Number of options a slot presents: breakfast has one, lunch and dinner two.
    pub fn arity(self) -> usize {
        match self {
            SlotKind::Breakfast => 1,
            SlotKind::Lunch | SlotKind::Dinner => 2,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotKind::Breakfast => "breakfast",
            SlotKind::Lunch => "lunch",
            SlotKind::Dinner => "dinner",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OptionIndex {
    Primary,
    Alternate,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Accepts the English labels and the Turkish ones the prompt used to ask for.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "easy" | "kolay" => Some(Difficulty::Easy),
            "medium" | "orta" => Some(Difficulty::Medium),
            "hard" | "zor" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NutritionalInfo {
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub preparation_time: String,
    pub difficulty: Difficulty,
    pub calories: u32,
    pub nutritional_info: NutritionalInfo,
    pub serving_size: String,
    pub cuisine: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

/// The alternatives presented for one slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MealOptionSet {
    pub option1: Meal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option2: Option<Meal>,
}

impl MealOptionSet {
    pub fn single(option1: Meal) -> Self {
        MealOptionSet {
            option1,
            option2: None,
        }
    }

    pub fn pair(option1: Meal, option2: Meal) -> Self {
        MealOptionSet {
            option1,
            option2: Some(option2),
        }
    }

    pub fn arity(&self) -> usize {
        1 + usize::from(self.option2.is_some())
    }

    pub fn fits(&self, slot: SlotKind) -> bool {
        self.arity() == slot.arity()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyMenu {
    pub date: String,
    pub breakfast: MealOptionSet,
    pub lunch: MealOptionSet,
    pub dinner: MealOptionSet,
}

impl DailyMenu {
    pub fn menu_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, MENU_DATE_FMT).ok()
    }

    pub fn slot(&self, slot: SlotKind) -> &MealOptionSet {
        match slot {
            SlotKind::Breakfast => &self.breakfast,
            SlotKind::Lunch => &self.lunch,
            SlotKind::Dinner => &self.dinner,
        }
    }
}

pub fn format_menu_date(date: NaiveDate) -> String {
    date.format(MENU_DATE_FMT).to_string()
}

/// Sampling parameters handed to the model on every request.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// `max_retries` additional attempts after the first one, waiting
/// `base_delay * attempt` between them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// How a slot generation ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Generated,
    TooSimilar,
    RetriesExhausted,
}

#[derive(Debug, Clone)]
pub struct SlotOutcome {
    pub options: MealOptionSet,
    pub attempts: u32,
    pub resolution: Resolution,
}

/// Partial meals supplied by an operator instead of the model. Every slot is optional;
/// missing slots and fields fall back to that slot's default meal.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ManualMenuRequest {
    #[serde(default)]
    pub breakfast: Option<serde_json::Value>,
    #[serde(default)]
    pub lunch: Option<serde_json::Value>,
    #[serde(default)]
    pub dinner: Option<serde_json::Value>,
}

impl ManualMenuRequest {
    pub fn slot(&self, slot: SlotKind) -> Option<&serde_json::Value> {
        match slot {
            SlotKind::Breakfast => self.breakfast.as_ref(),
            SlotKind::Lunch => self.lunch.as_ref(),
            SlotKind::Dinner => self.dinner.as_ref(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    Ollama,
    Gemini,
}
