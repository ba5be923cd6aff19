use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Image data as it arrives at the HTTP boundary.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Raw upload bytes with the MIME type declared by the client.
    Bytes { data: Vec<u8>, content_type: String },
    /// Base64 text, optionally carrying a `data:<mime>;base64,` header.
    Encoded(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub base64: String,
    pub content_type: String,
}

impl NormalizedImage {
    pub fn new(base64: String, content_type: String) -> Self {
        Self { base64, content_type }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.base64)
    }
}

/// What a client gets back from an OCR route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Error {
        error: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        original_response: Option<Value>,
    },
    ExtractedText {
        extracted_text: String,
    },
    /// Keys decoded from a document reply, returned at the top level.
    StructuredFields(Map<String, Value>),
}

impl ResultPayload {
    pub fn error(message: impl Into<String>) -> Self {
        ResultPayload::Error {
            error: Value::String(message.into()),
            original_response: None,
        }
    }

    pub fn extracted_text(text: impl Into<String>) -> Self {
        ResultPayload::ExtractedText {
            extracted_text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultPayload::Error { .. })
    }
}
