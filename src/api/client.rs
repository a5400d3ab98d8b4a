use super::types::{FileSource, FormPart, MultipartPayload, ResponseOutcome};
use super::Api;
use crate::config::Config;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client bound to a single base URL for its whole lifetime.
///
/// The configured timeout bounds connection setup for every call and the
/// whole exchange for JSON calls. Uploads have no total limit.
#[derive(Clone)]
pub struct RequestClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl RequestClient {
    pub fn new(config: &Config) -> Result<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn json_outcome(response: reqwest::Response) -> Result<ResponseOutcome> {
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %response.url(), "request failed");
            return Ok(status_failure(status));
        }

        let text = response.text().await?;
        Ok(ResponseOutcome::Success(parse_or_raw(&text)))
    }
}

#[async_trait]
impl Api for RequestClient {
    async fn get_json(&self, path: &str) -> Result<ResponseOutcome> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).timeout(self.request_timeout).send().await?;
        Self::json_outcome(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<ResponseOutcome> {
        let url = self.url(path);
        debug!(%url, "POST json");
        // .json() sets the application/json content type
        let response = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;
        Self::json_outcome(response).await
    }

    async fn post_multipart(&self, path: &str, payload: MultipartPayload) -> Result<ResponseOutcome> {
        let url = self.url(path);
        debug!(%url, parts = payload.parts().len(), "POST multipart");

        // reqwest writes the content type and boundary itself
        let form = into_form(payload).await?;
        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        let text = response.text().await?;
        let outcome = multipart_outcome(status, &text);
        if let ResponseOutcome::Failure { status, detail } = &outcome {
            warn!(status, %detail, "multipart upload rejected");
        }
        Ok(outcome)
    }
}

async fn into_form(payload: MultipartPayload) -> Result<Form> {
    let mut form = Form::new();
    for part in payload.into_parts() {
        form = match part {
            FormPart::File {
                field,
                file_name,
                mime,
                source,
            } => {
                let part = match source {
                    FileSource::Memory(bytes) => Part::bytes(bytes.to_vec()),
                    // streamed from disk, never buffered whole
                    FileSource::Disk { path, .. } => {
                        let file = tokio::fs::File::open(&path).await?;
                        let length = file.metadata().await?.len();
                        Part::stream_with_length(Body::from(file), length)
                    }
                };
                let part = part
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| ClientError::Payload(format!("invalid MIME type '{}': {}", mime, e)))?;
                form.part(field, part)
            }
            FormPart::Text { field, value } => form.text(field, value),
        };
    }
    Ok(form)
}

/// Failure for the JSON paths; the body is not inspected.
pub(crate) fn status_failure(status: StatusCode) -> ResponseOutcome {
    ResponseOutcome::Failure {
        status: status.as_u16(),
        detail: format!("Erro na requisição: {}", status.as_u16()),
    }
}

/// Parses `text` as JSON, keeping the raw text when it is not.
pub(crate) fn parse_or_raw(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Best-effort human text out of an error body.
pub(crate) fn failure_detail(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => match json.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(detail) if !detail.is_null() => detail.to_string(),
            _ => match json {
                Value::String(s) => s,
                other => other.to_string(),
            },
        },
        Err(_) => text.to_string(),
    }
}

pub(crate) fn multipart_outcome(status: StatusCode, text: &str) -> ResponseOutcome {
    if status.is_success() {
        ResponseOutcome::Success(parse_or_raw(text))
    } else {
        ResponseOutcome::Failure {
            status: status.as_u16(),
            detail: failure_detail(text),
        }
    }
}
