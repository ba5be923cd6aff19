use serde::Serialize;

use crate::common::NormalizedImage;

use super::{PromptVariant, VisionConfig};

// Fixed sampling parameters, never taken from the request.
pub const TEMPERATURE: f64 = 0.1;
pub const TOP_P: f64 = 1.0;
pub const FREQUENCY_PENALTY: f64 = 0.0;
pub const PRESENCE_PENALTY: f64 = 0.0;
pub const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One user message: the instruction first, the image second.
pub fn build_chat_request(image: &NormalizedImage, variant: PromptVariant, config: &VisionConfig) -> ChatRequest {
    let data_uri = image.data_uri();
    log::info!("Request body prepared with image data URI length: {}", data_uri.len());

    ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    text: config.prompt(variant).to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_uri },
                },
            ],
        }],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        top_p: TOP_P,
        frequency_penalty: FREQUENCY_PENALTY,
        presence_penalty: PRESENCE_PENALTY,
    }
}
