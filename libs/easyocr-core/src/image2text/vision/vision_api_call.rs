use std::time::Instant;

use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::common::OcrError;

use super::{redact_key, ChatRequest, VisionConfig};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Chat-completion client for one provider endpoint. Cheap to share: the
/// underlying connection pool lives inside `reqwest::Client`.
#[derive(Clone)]
pub struct VisionClient {
    http: Client,
    url: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        if config.url.trim().is_empty() {
            anyhow::bail!("URL is required for vision processing");
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()?;

        log::info!(
            "Vision client ready: url={}, model={}, key={}",
            config.url,
            config.model,
            redact_key(&api_key)
        );

        Ok(Self {
            http,
            url: config.url.clone(),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts the request and decodes whatever JSON comes back, whatever the
    /// status code. `Ok(None)` means the provider answered with an empty body.
    pub async fn send(&self, request: &ChatRequest) -> Result<Option<Value>, OcrError> {
        log::info!("Sending request to vision API using model {}", request.model);
        let builder = self.http.post(&self.url).bearer_auth(&self.api_key).json(request);

        let response = self
            .execute_logged(builder)
            .await
            .map_err(|err| OcrError::ProviderCall(format!("Failed to connect to the vision API: {}", err)))?;

        let text = response
            .text()
            .await
            .map_err(|err| OcrError::ProviderCall(format!("Failed to read vision API response: {}", err)))?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| OcrError::ProviderCall(format!("Failed to decode vision API response: {}", err)))
    }

    /// Every outbound call goes through here so that each one is logged once,
    /// with the same fields, whether it succeeds or not.
    async fn execute_logged(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        log::info!("Making request to: {} {}", method, url);

        let started = Instant::now();
        match self.http.execute(request).await {
            Ok(response) => {
                log::info!(
                    "Response received from {} with status {} in {:?}",
                    url,
                    response.status(),
                    started.elapsed()
                );
                Ok(response)
            }
            Err(err) => {
                let kind = if err.is_timeout() { "timed out" } else { "failed" };
                log::error!("Request to {} {} after {:?}: {}", url, kind, started.elapsed(), err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NormalizedImage;
    use crate::image2text::vision::{build_chat_request, PromptVariant};
    use axum::{http::StatusCode, routing::post, Router};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> VisionClient {
        let mut config = VisionConfig::new();
        config.url = format!("http://{}/v1/chat/completions", addr);
        config.api_key = Some("sk-test".into());
        VisionClient::new(&config).unwrap()
    }

    fn sample_request() -> ChatRequest {
        let image = NormalizedImage::new("aGk=".into(), "image/png".into());
        build_chat_request(&image, PromptVariant::Text, &VisionConfig::new())
    }

    #[test]
    fn client_requires_a_key() {
        assert!(VisionClient::new(&VisionConfig::new()).is_err());
    }

    #[tokio::test]
    async fn json_body_is_returned_for_any_status() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    [("content-type", "application/json")],
                    r#"{"error":{"message":"bad key"}}"#,
                )
            }),
        );
        let client = client_for(serve(app).await);

        let body = client.send(&sample_request()).await.unwrap();
        assert_eq!(body.unwrap()["error"]["message"], "bad key");
    }

    #[tokio::test]
    async fn empty_body_is_none() {
        let app = Router::new().route("/v1/chat/completions", post(|| async { StatusCode::OK }));
        let client = client_for(serve(app).await);

        assert!(client.send(&sample_request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_json_body_is_a_provider_error() {
        let app = Router::new().route("/v1/chat/completions", post(|| async { "<html>gateway</html>" }));
        let client = client_for(serve(app).await);

        let err = client.send(&sample_request()).await.unwrap_err();
        assert!(matches!(err, OcrError::ProviderCall(_)));
        assert!(err.to_string().starts_with("Failed to decode vision API response"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_provider_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr).send(&sample_request()).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to connect to the vision API"));
    }
}
