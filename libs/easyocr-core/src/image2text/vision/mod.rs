mod request;
mod response;
mod types;
mod vision_api_call;

pub use request::{
    build_chat_request, ChatMessage, ChatRequest, ContentPart, ImageUrl, FREQUENCY_PENALTY,
    MAX_TOKENS, PRESENCE_PENALTY, TEMPERATURE, TOP_P,
};
pub use response::{message_content, parse_document, parse_response, NO_RESPONSE_MESSAGE};
pub use types::{redact_key, PromptVariant, VisionConfig, DEFAULT_DOCUMENT_PROMPT, DEFAULT_MODEL, DEFAULT_TEXT_PROMPT, DEFAULT_URL};
pub use vision_api_call::VisionClient;
