//! Transport selection for the MCP host.
//!
//! An agent normally spawns the server and talks JSON-RPC over stdin/stdout.
//! `--transport http` instead serves the streamable HTTP transport on
//! `--port`; `sse` is accepted as an alias because rmcp streams SSE responses
//! from the same endpoint.

use clap::{Args, ValueEnum};
use std::fmt;

/// Port used for the HTTP transport when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Where the server reads and writes MCP messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// JSON-RPC over the process's stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on `0.0.0.0:port`. Port 0 picks an ephemeral port.
    Http { port: u16 },
}

impl Transport {
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    pub fn http(port: u16) -> Self {
        Transport::Http { port }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    /// Listening port, if the transport has one.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { port } => Some(*port),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http { port } => write!(f, "http:{}", port),
        }
    }
}

/// Value of `--transport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    #[default]
    Stdio,
    #[value(alias = "sse")]
    Http,
}

/// Transport flags, meant to be `#[command(flatten)]`ed into a binary's CLI.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TransportArgs {
    /// Transport mode (`sse` is accepted as an alias of `http`)
    #[arg(long, value_enum, ignore_case = true, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,

    /// Port for the HTTP transport
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl TransportArgs {
    /// Resolve the flags into a transport; the port is ignored for stdio.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http { port: self.port },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::default(),
            port: DEFAULT_PORT,
        }
    }
}
