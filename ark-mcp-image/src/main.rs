//! Ark MCP Image Server
//!
//! MCP server for image generation using the Volcengine Ark Seedream API.

use ark_mcp_common::tracing::init_tracing;
use ark_mcp_common::{Config, McpServerBuilder, TransportArgs};
use ark_mcp_image::ImageServer;
use anyhow::Result;
use clap::Parser;

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "ark-mcp-image")]
#[command(about = "MCP server for image generation using the Volcengine Ark Seedream API")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,

    /// Ark API base URL (overrides ARK_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Default model or endpoint ID (overrides ARK_DEFAULT_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("ark-mcp-image server starting...");

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(model) = args.model {
        config.default_model = model;
    }
    tracing::info!(
        base_url = %config.base_url,
        default_model = %config.default_model,
        api_key_configured = config.api_key.is_some(),
        "Configuration loaded"
    );
    if config.api_key.is_none() {
        tracing::warn!("ARK_API_KEY is not set; tool calls must pass api_key");
    }

    let server = ImageServer::new(config)?;

    let transport = args.transport.into_transport();
    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
