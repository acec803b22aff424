use std::time::Duration;

pub const MENU_DB: &str = "daily_menu.sqlite";
pub const MENU_DATE_FMT: &str = "%Y-%m-%d";

pub const MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_K: u32 = 1;
pub const DEFAULT_TOP_P: f32 = 1.0;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:latest";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const ALTERNATIVE_SUFFIX: &str = " (Alternative)";

pub const REGENERATION_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
