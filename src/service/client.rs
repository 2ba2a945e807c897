use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::{ErrorBody, HealthResponse, RemovalRequest, RemovedImage};
use super::RemovalService;
use crate::config::CutoutConfig;

const DEFAULT_RESULT_MEDIA_TYPE: &str = "image/png";

pub struct RemovalClient {
    api_key: String,
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RemovalClient {
    pub fn new(config: &CutoutConfig) -> Result<Self, ApiError> {
        Self::with_endpoint(
            config.api_key.clone(),
            config.api_url.clone(),
            config.connect_timeout(),
            config.request_timeout(),
        )
    }

    /// Create a client pointing at a custom endpoint (useful for testing).
    pub fn with_endpoint(
        api_key: String,
        endpoint: String,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_key,
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET /health` on the service's origin.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = Url::parse(&self.endpoint)
            .and_then(|base| base.join("/health"))
            .map_err(|e| ApiError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_failure(status, response).await);
        }
        Ok(response.json::<HealthResponse>().await?)
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            ApiError::Network(err)
        }
    }
}

impl RemovalService for RemovalClient {
    async fn remove_background(&self, req: &RemovalRequest) -> Result<RemovedImage, ApiError> {
        debug!(endpoint = %self.endpoint, payload_bytes = req.image.len(), "posting image");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let err = classify_failure(status, response).await;
            warn!(%status, error = %err, "service rejected request");
            return Err(err);
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_RESULT_MEDIA_TYPE.to_string());
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(bytes = bytes.len(), %media_type, "received result");

        Ok(RemovedImage {
            bytes: bytes.to_vec(),
            media_type,
        })
    }
}

/// Map a non-success response onto the error taxonomy.
async fn classify_failure(status: StatusCode, response: Response) -> ApiError {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message())
        .unwrap_or(text);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::InvalidCredential { message },
        StatusCode::BAD_REQUEST => ApiError::InvalidImage { message },
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
