mod client;
mod types;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use client::RequestClient;
pub use types::{FileSource, FormPart, MultipartPayload, ResponseOutcome};

pub const HEALTH_PATH: &str = "/health";
pub const ITEMS_PATH: &str = "/items";
pub const UPLOAD_PATH: &str = "/upload/video";

/// The request shapes the client needs from the analysis service.
///
/// Failing statuses come back as `ResponseOutcome::Failure`; `Err` is
/// reserved for exchanges that never produced a response.
#[async_trait]
pub trait Api: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<ResponseOutcome>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<ResponseOutcome>;

    async fn post_multipart(&self, path: &str, payload: MultipartPayload) -> Result<ResponseOutcome>;
}
