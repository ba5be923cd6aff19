use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::common::{ImageInput, NormalizedImage, OcrError, DEFAULT_CONTENT_TYPE};

const MISSING_IMAGE_MESSAGE: &str = "No image data provided";

pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Standard alphabet, but clients frequently strip the `=` padding.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, OcrError> {
    let engine = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
    );
    engine.decode(payload).map_err(OcrError::InvalidEncoding)
}

/// Reads the MIME type out of a `data:<mime>;base64` header.
pub fn content_type_from_header(header: &str) -> Option<&str> {
    let start = header.find(':')? + 1;
    let end = start + header[start..].find(';')?;
    let mime = header[start..end].trim();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

pub fn normalize(input: ImageInput) -> Result<NormalizedImage, OcrError> {
    match input {
        ImageInput::Bytes { data, content_type } => {
            if data.is_empty() {
                return Err(OcrError::MissingInput(MISSING_IMAGE_MESSAGE.to_string()));
            }
            let content_type = if content_type.trim().is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                content_type
            };
            log::debug!("Encoding {} bytes of {}", data.len(), content_type);
            Ok(NormalizedImage::new(encode_base64(&data), content_type))
        }
        ImageInput::Encoded(raw) => normalize_encoded(&raw),
    }
}

fn normalize_encoded(raw: &str) -> Result<NormalizedImage, OcrError> {
    if raw.trim().is_empty() {
        log::warn!("Received empty base64 image string");
        return Err(OcrError::MissingInput(MISSING_IMAGE_MESSAGE.to_string()));
    }

    let (content_type, payload) = match raw.split_once(',') {
        Some((header, payload)) => (content_type_from_header(header), payload),
        None => (None, raw),
    };

    if payload.trim().is_empty() {
        log::warn!("Base64 image has a header but no payload");
        return Err(OcrError::MissingInput(MISSING_IMAGE_MESSAGE.to_string()));
    }

    if let Err(err) = decode_base64(payload) {
        log::warn!("Invalid base64 string: {}", err);
        return Err(err);
    }

    let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string();
    log::debug!("Normalized base64 image, length: {}, contentType: {}", payload.len(), content_type);
    Ok(NormalizedImage::new(payload.to_string(), content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip_through_normalization() {
        let samples: [&[u8]; 4] = [b"\x89PNG\r\n\x1a\n", b"a", &[0u8, 255, 128, 7, 9], &[0xffu8; 1025]];
        for bytes in samples {
            let image = normalize(ImageInput::Bytes {
                data: bytes.to_vec(),
                content_type: "image/png".into(),
            })
            .unwrap();
            assert_eq!(decode_base64(&image.base64).unwrap(), bytes);
            assert_eq!(image.content_type, "image/png");
        }
    }

    #[test]
    fn data_uri_header_sets_content_type() {
        let image = normalize(ImageInput::Encoded("data:image/png;base64,aGVsbG8=".into())).unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.base64, "aGVsbG8=");
    }

    #[test]
    fn bare_payload_defaults_to_jpeg() {
        let image = normalize(ImageInput::Encoded("aGVsbG8=".into())).unwrap();
        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(image.base64, "aGVsbG8=");
    }

    #[test]
    fn header_without_mime_falls_back_to_jpeg() {
        let image = normalize(ImageInput::Encoded("data:image/png,aGVsbG8=".into())).unwrap();
        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(image.base64, "aGVsbG8=");
    }

    #[test]
    fn unpadded_payload_is_accepted() {
        let image = normalize(ImageInput::Encoded("data:image/gif;base64,aGVsbG8".into())).unwrap();
        assert_eq!(decode_base64(&image.base64).unwrap(), b"hello");
    }

    #[test]
    fn empty_inputs_are_missing() {
        for raw in ["", "   ", "data:image/png;base64,"] {
            let err = normalize(ImageInput::Encoded(raw.into())).unwrap_err();
            assert!(matches!(err, OcrError::MissingInput(_)), "{raw:?} gave {err:?}");
        }

        let err = normalize(ImageInput::Bytes {
            data: Vec::new(),
            content_type: "image/png".into(),
        })
        .unwrap_err();
        assert!(matches!(err, OcrError::MissingInput(_)));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err = normalize(ImageInput::Encoded("data:image/png;base64,not*base64!".into())).unwrap_err();
        assert!(matches!(err, OcrError::InvalidEncoding(_)));
        assert_eq!(err.to_string(), "Invalid image data format");
    }

    #[test]
    fn header_parsing() {
        assert_eq!(content_type_from_header("data:image/webp;base64"), Some("image/webp"));
        assert_eq!(content_type_from_header("data:image/webp"), None);
        assert_eq!(content_type_from_header("image/webp;base64"), None);
        assert_eq!(content_type_from_header("data:;base64"), None);
    }
}
