//! Ark MCP Image Server Library
//!
//! Image generation tools, a model capability resource and a prompt template
//! backed by the Volcengine Ark Seedream API.

pub mod credential;
pub mod envelope;
pub mod handler;
pub mod prompt;
pub mod resources;
pub mod server;

pub use credential::CredentialResolver;
pub use envelope::GenerationResult;
pub use handler::{
    GenerateImageParams, GenerationRequest, ImageHandler, ImageSequenceParams, ReferenceImageParams,
};
pub use prompt::ImagePromptArgs;
pub use server::ImageServer;
