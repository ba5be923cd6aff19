use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const DEFAULT_TEXT_PROMPT: &str = "You are an OCR service. Your only task is to extract all visible text \
from this image. Return only the extracted text exactly as it appears, with original formatting when possible. \
Do not analyze, interpret, or add any commentary to the text.";

pub const DEFAULT_DOCUMENT_PROMPT: &str = "You are a document OCR service. Extract every field visible on this \
document (for example an ID card, passport or driver's license) and return them as a single JSON object whose keys \
are snake_case field names such as document_type, document_number, name, date_of_birth and expiry_date. \
Return only the JSON object, without markdown or commentary.";

/// Which instruction is sent with the image. Fixed per route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptVariant {
    Text,
    Document,
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptVariant::Text => write!(f, "text"),
            PromptVariant::Document => write!(f, "document"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub text_prompt: String,
    pub document_prompt: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl VisionConfig {
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            text_prompt: DEFAULT_TEXT_PROMPT.to_string(),
            document_prompt: DEFAULT_DOCUMENT_PROMPT.to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("API key is required for vision processing"))
    }

    pub fn prompt(&self, variant: PromptVariant) -> &str {
        match variant {
            PromptVariant::Text => &self.text_prompt,
            PromptVariant::Document => &self.document_prompt,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Hand-written so the key never reaches a log line.
impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_deref().map(redact_key))
            .field("model", &self.model)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

pub fn redact_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}…({} chars)", visible, key.chars().count())
}
