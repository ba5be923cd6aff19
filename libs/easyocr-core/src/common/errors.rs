use serde_json::Value;
use thiserror::Error;

use super::ResultPayload;

pub const NO_CHOICES_MESSAGE: &str = "No text could be extracted from the image";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    InvalidContentType(String),

    #[error("Invalid image data format")]
    InvalidEncoding(#[source] base64::DecodeError),

    #[error("{0}")]
    ProviderCall(String),

    #[error("vision API reported an error: {0}")]
    ProviderReported(Value),

    #[error("{0}")]
    ResponseShape(String),
}

impl OcrError {
    pub fn no_choices() -> Self {
        OcrError::ResponseShape(NO_CHOICES_MESSAGE.to_string())
    }

    pub fn malformed_response(reason: impl std::fmt::Display) -> Self {
        OcrError::ResponseShape(format!("Error parsing API response: {}", reason))
    }

    /// Errors raised before anything is sent to the provider. The HTTP layer
    /// answers these with 400, everything else is reported inside a 200 payload.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OcrError::MissingInput(_) | OcrError::InvalidContentType(_) | OcrError::InvalidEncoding(_)
        )
    }

    pub fn into_payload(self, original: Option<&Value>) -> ResultPayload {
        match self {
            OcrError::ProviderReported(error) => ResultPayload::Error {
                error,
                original_response: None,
            },
            OcrError::ResponseShape(message) => ResultPayload::Error {
                error: Value::String(message),
                original_response: original.cloned(),
            },
            other => ResultPayload::error(other.to_string()),
        }
    }
}
