//! Image generation handler for the Ark MCP image server.
//!
//! This module provides the `ImageHandler` struct and parameter types for the
//! three Seedream generation modes exposed as tools:
//!
//! - text-to-image (`generate_image`)
//! - reference-conditioned generation (`generate_image_with_reference`)
//! - sequential / grouped generation (`generate_image_sequence`)
//!
//! Every mode posts to the same `/images/generations` endpoint. Outcomes are
//! returned as [`GenerationResult`] envelopes; no operation surfaces an error
//! to its caller.

use crate::credential::CredentialResolver;
use crate::envelope::GenerationResult;
use ark_mcp_common::config::Config;
use ark_mcp_common::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default size for text-to-image generation.
pub const DEFAULT_IMAGE_SIZE: &str = "2K";

/// Default size for reference-conditioned and sequential generation.
pub const DEFAULT_PIXEL_SIZE: &str = "2048x2048";

/// Default number of images requested in sequential mode.
pub const DEFAULT_MAX_IMAGES: u32 = 4;

/// Upper bound the vendor accepts for `max_images`; larger requests are clamped.
pub const MAX_SEQUENTIAL_IMAGES: u32 = 15;

/// Request timeout for single-image calls (text-to-image, reference).
pub const SINGLE_IMAGE_TIMEOUT_SECS: u64 = 60;

/// Request timeout for sequential calls, which render several images.
pub const SEQUENTIAL_TIMEOUT_SECS: u64 = 120;

/// Text-to-image parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateImageParams {
    pub prompt: String,
    pub api_key: Option<String>,
    pub model: String,
    pub size: String,
    pub watermark: bool,
}

/// Reference-conditioned generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImageParams {
    pub prompt: String,
    pub reference_image_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub size: String,
}

/// Sequential generation parameters.
///
/// `max_images` is the requested count as the caller sent it, possibly out of
/// range; it is clamped when the request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSequenceParams {
    pub prompt: String,
    pub api_key: Option<String>,
    pub model: String,
    pub size: String,
    pub max_images: i64,
}

/// One outbound generation request, by mode.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    TextToImage {
        prompt: String,
        model: String,
        size: String,
        watermark: bool,
    },
    ReferenceConditioned {
        prompt: String,
        reference_image_url: String,
        model: String,
        size: String,
    },
    Sequential {
        prompt: String,
        model: String,
        size: String,
        max_images: i64,
    },
}

/// Value of the vendor's `sequential_image_generation` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequentialMode {
    Disabled,
    Auto,
}

/// Nested options for sequential generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialOptions {
    pub max_images: u32,
}

/// Wire body of `POST /images/generations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_image_generation: Option<SequentialMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_image_generation_options: Option<SequentialOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Typed view of the text-to-image response; only `data[].url` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Clamp a requested sequential image count into `1..=MAX_SEQUENTIAL_IMAGES`.
///
/// Zero and negative counts become 1.
pub fn clamp_max_images(requested: i64) -> u32 {
    u32::try_from(requested.clamp(1, i64::from(MAX_SEQUENTIAL_IMAGES))).unwrap_or(MAX_SEQUENTIAL_IMAGES)
}

impl GenerationRequest {
    /// Build the wire body for this request.
    pub fn payload(&self) -> ImagesRequest {
        match self {
            GenerationRequest::TextToImage {
                prompt,
                model,
                size,
                watermark,
            } => ImagesRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                size: size.clone(),
                image: None,
                response_format: Some("url".to_string()),
                watermark: Some(*watermark),
                sequential_image_generation: None,
                sequential_image_generation_options: None,
                stream: None,
            },
            GenerationRequest::ReferenceConditioned {
                prompt,
                reference_image_url,
                model,
                size,
            } => ImagesRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                size: size.clone(),
                image: Some(reference_image_url.clone()),
                response_format: None,
                watermark: None,
                sequential_image_generation: Some(SequentialMode::Disabled),
                sequential_image_generation_options: None,
                stream: Some(false),
            },
            GenerationRequest::Sequential {
                prompt,
                model,
                size,
                max_images,
            } => ImagesRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                size: size.clone(),
                image: None,
                response_format: None,
                watermark: None,
                sequential_image_generation: Some(SequentialMode::Auto),
                sequential_image_generation_options: Some(SequentialOptions {
                    max_images: clamp_max_images(*max_images),
                }),
                stream: Some(false),
            },
        }
    }

    /// Time budget for this request.
    pub fn timeout_secs(&self) -> u64 {
        match self {
            GenerationRequest::Sequential { .. } => SEQUENTIAL_TIMEOUT_SECS,
            _ => SINGLE_IMAGE_TIMEOUT_SECS,
        }
    }

    /// Short mode name used in logs.
    pub fn mode(&self) -> &'static str {
        match self {
            GenerationRequest::TextToImage { .. } => "text_to_image",
            GenerationRequest::ReferenceConditioned { .. } => "reference",
            GenerationRequest::Sequential { .. } => "sequential",
        }
    }
}

impl From<&GenerateImageParams> for GenerationRequest {
    fn from(params: &GenerateImageParams) -> Self {
        GenerationRequest::TextToImage {
            prompt: params.prompt.clone(),
            model: params.model.clone(),
            size: params.size.clone(),
            watermark: params.watermark,
        }
    }
}

impl From<&ReferenceImageParams> for GenerationRequest {
    fn from(params: &ReferenceImageParams) -> Self {
        GenerationRequest::ReferenceConditioned {
            prompt: params.prompt.clone(),
            reference_image_url: params.reference_image_url.clone(),
            model: params.model.clone(),
            size: params.size.clone(),
        }
    }
}

impl From<&ImageSequenceParams> for GenerationRequest {
    fn from(params: &ImageSequenceParams) -> Self {
        GenerationRequest::Sequential {
            prompt: params.prompt.clone(),
            model: params.model.clone(),
            size: params.size.clone(),
            max_images: params.max_images,
        }
    }
}

/// Image generation handler.
///
/// Holds only immutable state, so one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct ImageHandler {
    /// Application configuration.
    pub config: Config,
    /// HTTP client for API requests.
    pub http: reqwest::Client,
    /// API key resolution.
    pub credentials: CredentialResolver,
}

impl ImageHandler {
    /// Create a new ImageHandler with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(level = "debug", name = "image_handler_new", skip_all)]
    pub fn new(config: Config) -> Result<Self> {
        debug!(base_url = %config.base_url, "Initializing ImageHandler");

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::api(config.images_endpoint(), 0, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(config, http))
    }

    /// Create a new ImageHandler with a provided HTTP client.
    pub fn with_client(config: Config, http: reqwest::Client) -> Self {
        let credentials = CredentialResolver::new(config.api_key.clone());
        Self {
            config,
            http,
            credentials,
        }
    }

    /// Get the image generation endpoint.
    pub fn endpoint(&self) -> String {
        self.config.images_endpoint()
    }

    /// Generate one image from a text prompt.
    ///
    /// On success `data` is `{url, model, size, watermark}`.
    #[instrument(level = "info", name = "generate_image", skip(self, params), fields(model = %params.model, size = %params.size))]
    pub async fn generate_image(&self, params: GenerateImageParams) -> GenerationResult {
        let outcome = self.try_generate_image(&params).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Image generation failed");
        }
        GenerationResult::from_outcome(outcome, "Image generated successfully", "Image generation failed")
    }

    async fn try_generate_image(&self, params: &GenerateImageParams) -> Result<Value> {
        let api_key = self
            .credentials
            .resolve(params.api_key.as_deref())
            .ok_or(Error::MissingCredential)?;

        let request = GenerationRequest::from(params);
        let response = self.send(&api_key, &request).await?;

        let endpoint = self.endpoint();
        let parsed: ImagesResponse = serde_json::from_value(response)
            .map_err(|e| Error::malformed(&endpoint, format!("Unexpected response shape: {}", e)))?;

        let url = parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| Error::malformed(&endpoint, "response has no data[0].url"))?;

        info!("Received image URL from API");

        Ok(json!({
            "url": url,
            "model": params.model,
            "size": params.size,
            "watermark": params.watermark,
        }))
    }

    /// Generate an image guided by a reference image URL.
    ///
    /// On success `data` is the vendor response body, unmodified.
    #[instrument(level = "info", name = "generate_image_with_reference", skip(self, params), fields(model = %params.model, size = %params.size))]
    pub async fn generate_image_with_reference(&self, params: ReferenceImageParams) -> GenerationResult {
        let outcome = self.dispatch_raw(params.api_key.as_deref(), GenerationRequest::from(&params)).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Reference image generation failed");
        }
        GenerationResult::from_outcome(
            outcome,
            "Reference-guided image generated successfully",
            "Reference-guided image generation failed",
        )
    }

    /// Generate a group of related images.
    ///
    /// `max_images` outside `1..=`[`MAX_SEQUENTIAL_IMAGES`] is clamped, never rejected.
    /// On success `data` is the vendor response body, unmodified.
    #[instrument(level = "info", name = "generate_image_sequence", skip(self, params), fields(model = %params.model, size = %params.size, max_images = params.max_images))]
    pub async fn generate_image_sequence(&self, params: ImageSequenceParams) -> GenerationResult {
        let max_images = clamp_max_images(params.max_images);
        if i64::from(max_images) != params.max_images {
            debug!(requested = params.max_images, clamped = max_images, "Clamped max_images");
        }

        let outcome = self.dispatch_raw(params.api_key.as_deref(), GenerationRequest::from(&params)).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Image sequence generation failed");
        }
        GenerationResult::from_outcome(
            outcome,
            format!("Image sequence generated, up to {} images", max_images),
            "Image sequence generation failed",
        )
    }

    /// Resolve the key, send the request and return the body as-is.
    async fn dispatch_raw(&self, explicit_key: Option<&str>, request: GenerationRequest) -> Result<Value> {
        let api_key = self
            .credentials
            .resolve(explicit_key)
            .ok_or(Error::MissingCredential)?;

        self.send(&api_key, &request).await
    }

    /// Post one generation request and return the JSON body of a 2xx response.
    async fn send(&self, api_key: &str, request: &GenerationRequest) -> Result<Value> {
        let endpoint = self.endpoint();
        let timeout_secs = request.timeout_secs();
        debug!(endpoint = %endpoint, mode = request.mode(), timeout_secs, "Calling image generation API");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(timeout_secs))
            .json(&request.payload())
            .send()
            .await
            .map_err(|e| Error::from_request(&endpoint, e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&endpoint, status.as_u16(), body));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(timeout_secs)
            } else {
                Error::malformed(&endpoint, format!("Failed to parse response: {}", e))
            }
        })
    }
}
