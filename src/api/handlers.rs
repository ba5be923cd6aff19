use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use easyocr_core::common::{ImageInput, ResultPayload};
use easyocr_core::image2text::PromptVariant;

use super::{AppState, ApiError, ImageRequest};

const IMAGE_FIELD: &str = "image";

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

fn subject(variant: PromptVariant) -> &'static str {
    match variant {
        PromptVariant::Text => "image",
        PromptVariant::Document => "document image",
    }
}

pub async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResultPayload>, ApiError> {
    handle_upload(&state, multipart, PromptVariant::Text).await
}

pub async fn process_document_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResultPayload>, ApiError> {
    handle_upload(&state, multipart, PromptVariant::Document).await
}

pub async fn process_base64_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ResultPayload>, ApiError> {
    handle_base64(&state, payload, PromptVariant::Text).await
}

pub async fn process_document_base64_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ResultPayload>, ApiError> {
    handle_base64(&state, payload, PromptVariant::Document).await
}

async fn handle_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    variant: PromptVariant,
) -> Result<Json<ResultPayload>, ApiError> {
    let subject = subject(variant);
    let multipart = multipart.map_err(|err| {
        log::warn!("Rejected {} upload: {}", subject, err);
        ApiError::bad_request(format!("Error processing {}: {}", subject, err))
    })?;

    let upload = match read_image_field(multipart).await {
        Ok(Some(upload)) if !upload.data.is_empty() => upload,
        Ok(_) => {
            log::warn!("No {} file provided", subject);
            return Err(ApiError::bad_request(format!("No {} provided", subject)));
        }
        Err(err) => {
            log::error!("Error reading {} upload: {}", subject, err);
            return Err(ApiError::bad_request(format!("Error processing {}: {}", subject, err)));
        }
    };

    log::info!(
        "Processing {}: {}, Size: {}, Content-Type: {:?}",
        subject,
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.data.len(),
        upload.content_type
    );

    let content_type = match upload.content_type {
        Some(content_type) if content_type.starts_with("image/") => content_type,
        other => {
            log::warn!("Invalid content type: {:?}", other);
            return Err(ApiError::bad_request("Invalid file type. Please upload an image"));
        }
    };

    let input = ImageInput::Bytes {
        data: upload.data.to_vec(),
        content_type,
    };
    let payload = state.service.process(input, variant).await?;
    Ok(Json(payload))
}

async fn handle_base64(
    state: &AppState,
    payload: Result<Json<ImageRequest>, JsonRejection>,
    variant: PromptVariant,
) -> Result<Json<ResultPayload>, ApiError> {
    let subject = subject(variant);
    let Json(request) = payload.map_err(|err| {
        log::warn!("Rejected base64 {} request: {}", subject, err);
        ApiError::bad_request(format!("Invalid request body: {}", err.body_text()))
    })?;

    let image = match request.image {
        Some(image) if !image.is_empty() => image,
        _ => {
            log::warn!("No base64 {} data provided", subject);
            return Err(ApiError::bad_request(format!("No {} data provided", subject)));
        }
    };

    log::info!("Base64 {} length: {}", subject, image.len());

    if !image.contains(";base64,") && !image.starts_with("data:image") {
        log::warn!("Invalid base64 format, missing prefix");
        return Err(ApiError::bad_request("Invalid base64 format"));
    }

    let payload = state.service.process(ImageInput::Encoded(image), variant).await?;
    Ok(Json(payload))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }
    Ok(None)
}
