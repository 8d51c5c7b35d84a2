//! MCP Resources for the Image server.
//!
//! - `image-models://supported` - capabilities of the supported Seedream models

use ark_mcp_common::config::DEFAULT_MODEL;
use serde::Serialize;
use std::collections::BTreeMap;

/// URI of the supported-models resource.
pub const MODELS_RESOURCE_URI: &str = "image-models://supported";

/// Capability advertised for plain text-to-image generation.
pub const CAPABILITY_TEXT_TO_IMAGE: &str = "text-to-image";
/// Capability advertised for reference-conditioned generation.
pub const CAPABILITY_IMAGE_TO_IMAGE: &str = "image-to-image";
/// Capability advertised for sequential (grouped) generation.
pub const CAPABILITY_SEQUENTIAL: &str = "sequential-generation";

/// Description of one supported model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelCapability {
    /// Human-readable description
    pub description: &'static str,
    /// Generation modes the model supports
    pub capabilities: &'static [&'static str],
    /// Largest output resolution
    pub max_resolution: &'static str,
}

/// The supported models, keyed by model identifier.
pub const SUPPORTED_MODELS: &[(&str, ModelCapability)] = &[(
    DEFAULT_MODEL,
    ModelCapability {
        description: "Volcengine Ark Seedream 4.0 image generation model",
        capabilities: &[
            CAPABILITY_TEXT_TO_IMAGE,
            CAPABILITY_IMAGE_TO_IMAGE,
            CAPABILITY_SEQUENTIAL,
        ],
        max_resolution: "4096x4096",
    },
)];

/// Supported models as an ordered map.
pub fn list_models() -> BTreeMap<&'static str, ModelCapability> {
    SUPPORTED_MODELS
        .iter()
        .map(|(id, model)| (*id, model.clone()))
        .collect()
}

/// Generate the JSON content for the `image-models://supported` resource.
pub fn models_resource_json() -> String {
    serde_json::to_string_pretty(&list_models()).unwrap_or_else(|_| "{}".to_string())
}
