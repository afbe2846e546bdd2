//! Text-to-image generation boundary.
//!
//! The image service is reached through a [`Transport`], so the crate stays
//! free of any particular HTTP client and tests can script responses. What
//! lives here is everything around the wire call:
//!
//! - local validation (empty prompt, missing credential) before any request
//! - the request body `{"prompt": …, "n": 1, "size": "1024x1024"}`
//! - response handling: `data[0].url` on success, `error.message` on failure
//! - fetching and decoding the generated image into a [`SourceRaster`]
//!
//! There is no retry. A failed call surfaces as
//! [`GenerationError::ServiceFailure`] with the service's own message when it
//! sent one.

use crate::imaging::{DecodeError, SourceRaster, decode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";
pub const DEFAULT_SIZE: &str = "1024x1024";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("no API key configured for image generation")]
    MissingCredential,
    #[error("image service failed: {0}")]
    ServiceFailure(String),
    #[error("generated image could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// `[generation]` section of the config file.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Bearer credential. Unset means generation is unavailable.
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Requested image size, passed through as-is.
    pub size: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            size: DEFAULT_SIZE.to_string(),
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("size", &self.size)
            .finish()
    }
}

/// A JSON response with its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The wire. Errors are transport-level failures (connection refused, TLS,
/// timeout) described as text; HTTP error statuses come back as responses.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, String>;

    fn get(&self, url: &str) -> Result<Vec<u8>, String>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

/// A generated image, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
}

pub struct Generator<T> {
    config: GenerationConfig,
    transport: T,
}

impl<T: Transport> Generator<T> {
    pub fn new(config: GenerationConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Request one image for `prompt`.
    pub fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingCredential)?;

        let request = GenerationRequest {
            prompt,
            n: 1,
            size: &self.config.size,
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| GenerationError::ServiceFailure(e.to_string()))?;

        debug!(endpoint = %self.config.endpoint, size = %self.config.size, "requesting image");
        let response = self
            .transport
            .post_json(&self.config.endpoint, api_key, &body)
            .map_err(|e| {
                warn!(error = %e, "image service unreachable");
                GenerationError::ServiceFailure(e)
            })?;

        interpret_response(response)
    }

    /// Generate, download and decode in one go.
    pub fn generate_source(&self, prompt: &str) -> Result<SourceRaster, GenerationError> {
        let image = self.generate(prompt)?;
        let bytes = self
            .transport
            .get(&image.url)
            .map_err(GenerationError::ServiceFailure)?;
        Ok(decode(&bytes)?)
    }
}

fn interpret_response(response: TransportResponse) -> Result<GeneratedImage, GenerationError> {
    let status = response.status;
    let success = response.is_success();
    // An unparseable body still carries the status
    let parsed: GenerationResponse = serde_json::from_value(response.body).unwrap_or_default();

    if let Some(message) = parsed.error.and_then(|e| e.message) {
        warn!(status, %message, "image service returned an error");
        return Err(GenerationError::ServiceFailure(message));
    }
    if !success {
        return Err(GenerationError::ServiceFailure(format!("HTTP status {status}")));
    }
    parsed
        .data
        .into_iter()
        .find_map(|d| d.url)
        .map(|url| GeneratedImage { url })
        .ok_or_else(|| GenerationError::ServiceFailure("response contained no image".into()))
}
