//! Ark MCP Common Library
//!
//! Shared configuration, error types, tracing setup and MCP transport
//! plumbing for the Ark (Seedream) image MCP server.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod config_test;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use server::{McpServerBuilder, ServerError};
pub use transport::{Transport, TransportArgs, TransportMode};
