use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct OllamaGenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Serialize, Debug)]
pub struct OllamaOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

#[derive(Deserialize, Debug)]
pub struct OllamaGenerateResponse {
    pub response: String,
    // done: bool,
    // context: Vec<i64>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest<'a> {
    pub contents: Vec<GeminiContent<'a>>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Debug)]
pub struct GeminiContent<'a> {
    pub parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Serialize, Debug)]
pub struct GeminiRequestPart<'a> {
    pub text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

#[derive(Deserialize, Debug, Default)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Debug)]
pub struct GeminiCandidate {
    pub content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize, Debug)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize, Debug)]
pub struct GeminiResponsePart {
    pub text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate's first text part.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
    }
}
