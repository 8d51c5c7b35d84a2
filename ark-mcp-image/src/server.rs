//! MCP Server implementation for the Image server.
//!
//! This module provides the MCP server handler that exposes:
//! - `generate_image`, `generate_image_with_reference` and
//!   `generate_image_sequence` tools
//! - the `image-models://supported` resource
//! - the `create_image_prompt` prompt

use crate::handler::{
    GenerateImageParams, ImageHandler, ImageSequenceParams, ReferenceImageParams, DEFAULT_IMAGE_SIZE,
    DEFAULT_MAX_IMAGES, DEFAULT_PIXEL_SIZE,
};
use crate::prompt::{self, ImagePromptArgs, PROMPT_NAME};
use crate::resources::{self, MODELS_RESOURCE_URI};
use ark_mcp_common::config::Config;
use ark_mcp_common::error::Error;
use rmcp::{
    model::{
        CallToolResult, Content, GetPromptResult, JsonObject, ListPromptsResult, ListResourcesResult,
        ListToolsResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo, Tool,
    },
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

pub const TOOL_GENERATE_IMAGE: &str = "generate_image";
pub const TOOL_GENERATE_WITH_REFERENCE: &str = "generate_image_with_reference";
pub const TOOL_GENERATE_SEQUENCE: &str = "generate_image_sequence";

/// MCP Server for Ark image generation.
#[derive(Clone)]
pub struct ImageServer {
    handler: Arc<ImageHandler>,
}

/// Tool parameters for generate_image.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateImageToolParams {
    /// Text description of the image (keep under roughly 300 Chinese characters or 600 English words)
    pub prompt: String,
    /// Ark API key; falls back to the ARK_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model or endpoint ID (default: ep-20251002170303-b2mr4)
    #[serde(default)]
    pub model: Option<String>,
    /// Image size (default: 2K)
    #[serde(default)]
    pub size: Option<String>,
    /// Whether to add a watermark (default: true)
    #[serde(default)]
    pub watermark: Option<bool>,
}

impl GenerateImageToolParams {
    fn into_params(self, default_model: &str) -> GenerateImageParams {
        GenerateImageParams {
            prompt: self.prompt,
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            size: self.size.unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
            watermark: self.watermark.unwrap_or(true),
        }
    }
}

/// Tool parameters for generate_image_with_reference.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReferenceImageToolParams {
    /// Text description of the image to generate
    pub prompt: String,
    /// URL of the reference image
    pub reference_image_url: String,
    /// Ark API key; falls back to the ARK_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model or endpoint ID (default: ep-20251002170303-b2mr4)
    #[serde(default)]
    pub model: Option<String>,
    /// Image size (default: 2048x2048)
    #[serde(default)]
    pub size: Option<String>,
}

impl ReferenceImageToolParams {
    fn into_params(self, default_model: &str) -> ReferenceImageParams {
        ReferenceImageParams {
            prompt: self.prompt,
            reference_image_url: self.reference_image_url,
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            size: self.size.unwrap_or_else(|| DEFAULT_PIXEL_SIZE.to_string()),
        }
    }
}

/// Tool parameters for generate_image_sequence.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImageSequenceToolParams {
    /// Text description of the image group to generate
    pub prompt: String,
    /// Ark API key; falls back to the ARK_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model or endpoint ID (default: ep-20251002170303-b2mr4)
    #[serde(default)]
    pub model: Option<String>,
    /// Image size (default: 2048x2048)
    #[serde(default)]
    pub size: Option<String>,
    /// Maximum number of images (default: 4, clamped into 1..=15)
    #[serde(default)]
    pub max_images: Option<i64>,
}

impl ImageSequenceToolParams {
    fn into_params(self, default_model: &str) -> ImageSequenceParams {
        ImageSequenceParams {
            prompt: self.prompt,
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            size: self.size.unwrap_or_else(|| DEFAULT_PIXEL_SIZE.to_string()),
            max_images: self.max_images.unwrap_or(i64::from(DEFAULT_MAX_IMAGES)),
        }
    }
}

/// Deserialize tool or prompt arguments, mapping failures to `invalid_params`.
fn parse_arguments<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    arguments
        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
        .transpose()
        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))?
        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))
}

fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema).unwrap_or_default() {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

fn tool(name: &'static str, description: &'static str, input_schema: Arc<JsonObject>) -> Tool {
    Tool {
        name: Cow::Borrowed(name),
        description: Some(Cow::Borrowed(description)),
        input_schema,
        annotations: None,
        icons: None,
        meta: None,
        output_schema: None,
        title: None,
    }
}

fn prompt_argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}

impl ImageServer {
    /// Create a new ImageServer with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, Error> {
        Ok(Self::with_handler(ImageHandler::new(config)?))
    }

    /// Create a server around an existing handler.
    pub fn with_handler(handler: ImageHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    fn default_model(&self) -> &str {
        &self.handler.config.default_model
    }

    /// Generate one image from a text prompt.
    pub async fn generate_image(&self, params: GenerateImageToolParams) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, "Generating image");

        let params = params.into_params(self.default_model());
        let result = self.handler.generate_image(params).await;

        Ok(CallToolResult::success(vec![Content::text(result.to_json_string())]))
    }

    /// Generate an image from a prompt and a reference image.
    pub async fn generate_image_with_reference(
        &self,
        params: ReferenceImageToolParams,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, reference = %params.reference_image_url, "Generating image from reference");

        let params = params.into_params(self.default_model());
        let result = self.handler.generate_image_with_reference(params).await;

        Ok(CallToolResult::success(vec![Content::text(result.to_json_string())]))
    }

    /// Generate a group of related images.
    pub async fn generate_image_sequence(&self, params: ImageSequenceToolParams) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, max_images = ?params.max_images, "Generating image sequence");

        let params = params.into_params(self.default_model());
        let result = self.handler.generate_image_sequence(params).await;

        Ok(CallToolResult::success(vec![Content::text(result.to_json_string())]))
    }

    /// Dispatch a tool call by name.
    pub async fn call_tool_by_name(&self, name: &str, arguments: Option<JsonObject>) -> Result<CallToolResult, McpError> {
        match name {
            TOOL_GENERATE_IMAGE => self.generate_image(parse_arguments(arguments)?).await,
            TOOL_GENERATE_WITH_REFERENCE => self.generate_image_with_reference(parse_arguments(arguments)?).await,
            TOOL_GENERATE_SEQUENCE => self.generate_image_sequence(parse_arguments(arguments)?).await,
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
        }
    }

    /// Tool definitions published by `list_tools`.
    pub fn tools(&self) -> Vec<Tool> {
        vec![
            tool(
                TOOL_GENERATE_IMAGE,
                "Generate an image from a text prompt with the Volcengine Ark Seedream API. \
                 Returns a JSON result with success, data (url, model, size, watermark), error and message.",
                input_schema::<GenerateImageToolParams>(),
            ),
            tool(
                TOOL_GENERATE_WITH_REFERENCE,
                "Generate a new image from a text prompt and a reference image URL. \
                 Returns a JSON result whose data is the raw Ark API response.",
                input_schema::<ReferenceImageToolParams>(),
            ),
            tool(
                TOOL_GENERATE_SEQUENCE,
                "Generate a group of related images (sequential generation) from one prompt. \
                 max_images defaults to 4 and is clamped into 1..=15. \
                 Returns a JSON result whose data is the raw Ark API response.",
                input_schema::<ImageSequenceToolParams>(),
            ),
        ]
    }

    /// Prompt definitions published by `list_prompts`.
    pub fn prompts(&self) -> Vec<Prompt> {
        vec![Prompt::new(
            PROMPT_NAME,
            Some("Build an optimized image generation prompt from a subject, style, mood and composition"),
            Some(vec![
                prompt_argument("subject", "Main subject of the image", true),
                prompt_argument(
                    "style",
                    "Art style: realistic, cartoon, oil_painting, watercolor, digital_art, photography (default: realistic)",
                    false,
                ),
                prompt_argument(
                    "mood",
                    "Mood: happy, mysterious, dramatic, peaceful, energetic (default: neutral)",
                    false,
                ),
                prompt_argument(
                    "composition",
                    "Composition: centered, rule_of_thirds, close_up, wide_shot, portrait (default: centered)",
                    false,
                ),
            ]),
        )]
    }

    /// Render a prompt by name.
    pub fn render_prompt(&self, name: &str, arguments: Option<JsonObject>) -> Result<GetPromptResult, McpError> {
        if name != PROMPT_NAME {
            return Err(McpError::invalid_params(format!("Unknown prompt: {}", name), None));
        }

        let args: ImagePromptArgs = parse_arguments(arguments)?;
        let text = prompt::compose(&args.subject, &args.style, &args.mood, &args.composition);
        debug!(prompt = %text, "Composed image prompt");

        Ok(GetPromptResult {
            description: Some(format!("Image generation prompt for: {}", args.subject)),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }

    /// Resources published by `list_resources`.
    pub fn resources(&self) -> Vec<rmcp::model::Resource> {
        vec![rmcp::model::Resource {
            raw: rmcp::model::RawResource {
                uri: MODELS_RESOURCE_URI.to_string(),
                name: "Supported Image Models".to_string(),
                title: None,
                description: Some("Supported image generation models and their capabilities".to_string()),
                mime_type: Some("application/json".to_string()),
                size: None,
                icons: None,
                meta: None,
            },
            annotations: None,
        }]
    }

    /// Read a resource by URI.
    pub fn read_resource_by_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let content = match uri {
            MODELS_RESOURCE_URI => resources::models_resource_json(),
            _ => {
                return Err(McpError::resource_not_found(format!("Unknown resource: {}", uri), None));
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content, uri.to_string())],
        })
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server backed by the Volcengine Ark Seedream API. \
                 Use generate_image for text-to-image, generate_image_with_reference to \
                 condition on an existing image URL, and generate_image_sequence for a group \
                 of related images. Every tool returns a JSON object with success, data, error \
                 and message. Read image-models://supported for model capabilities and use the \
                 create_image_prompt prompt to build a detailed prompt."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: self.tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.call_tool_by_name(params.name.as_ref(), params.arguments).await }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");
            Ok(ListResourcesResult {
                resources: self.resources(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            debug!(uri = %params.uri, "Reading resource");
            self.read_resource_by_uri(&params.uri)
        }
    }

    fn list_prompts(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListPromptsResult {
                prompts: self.prompts(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn get_prompt(
        &self,
        params: rmcp::model::GetPromptRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        async move {
            debug!(name = %params.name, "Rendering prompt");
            self.render_prompt(&params.name, params.arguments)
        }
    }
}
