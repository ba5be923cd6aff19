use anyhow::Result;

use crate::common::{ImageInput, OcrError, ResultPayload};
use crate::image2text::{build_chat_request, parse_response, PromptVariant, VisionClient, VisionConfig};
use crate::input::normalize;

/// The adapter the HTTP routes talk to: normalize, ask the provider, reshape.
pub struct OcrService {
    config: VisionConfig,
    client: VisionClient,
}

impl OcrService {
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = VisionClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Input problems come back as `Err`. Anything that goes wrong after the
    /// image is accepted is reported inside the returned payload instead.
    pub async fn process(&self, input: ImageInput, variant: PromptVariant) -> Result<ResultPayload, OcrError> {
        let image = normalize(input)?;
        log::info!(
            "Processing {} image, base64 length: {}, contentType: {}",
            variant,
            image.base64.len(),
            image.content_type
        );

        let request = build_chat_request(&image, variant, &self.config);
        let body = match self.client.send(&request).await {
            Ok(body) => body,
            Err(err) => {
                log::error!("Error calling vision API at {}: {}", self.client.url(), err);
                return Ok(err.into_payload(None));
            }
        };

        let payload = parse_response(body.as_ref(), variant);
        if payload.is_error() {
            log::warn!("Vision API call for {} image produced an error payload", variant);
        }
        Ok(payload)
    }
}
