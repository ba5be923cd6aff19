pub mod vision;

pub use vision::{
    build_chat_request, parse_response, ChatRequest, PromptVariant, VisionClient, VisionConfig,
};
