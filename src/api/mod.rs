mod handlers;
mod types;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use easyocr_core::process::OcrService;
use tower_http::cors::CorsLayer;

pub use handlers::{process_base64_image, process_document_base64_image, process_document_image, process_image};
pub use types::{ApiError, ImageRequest};

pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OcrService>,
}

pub fn router(service: Arc<OcrService>, max_body_bytes: usize) -> Router {
    let ocr = Router::new()
        .route("/process", post(process_image))
        .route("/process-base64", post(process_base64_image))
        .route("/document", post(process_document_image))
        .route("/document-base64", post(process_document_base64_image));

    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/health", get(|| async { "healthy" }))
        .nest("/api/ocr", ocr)
        // Enforced by the extractors, so oversized bodies reach the handlers as rejections.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_requests))
        .with_state(AppState { service })
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    log::info!("{} {} -> {} in {:?}", method, path, response.status(), started.elapsed());
    response
}
