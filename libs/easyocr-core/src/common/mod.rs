mod errors;
mod types;

pub use errors::OcrError;
pub use types::{ImageInput, NormalizedImage, ResultPayload, DEFAULT_CONTENT_TYPE};
