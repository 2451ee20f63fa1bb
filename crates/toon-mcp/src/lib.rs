//! # toon-mcp
//!
//! A Model Context Protocol server exposing the `toon-codec` conversions as
//! tools. It speaks line-delimited JSON-RPC 2.0 over stdin/stdout and offers:
//!
//! - `convert_json_to_toon`: any JSON value to TOON text
//! - `convert_toon_to_json`: TOON text back to JSON
//! - `convert_system_prompt_to_toon`: wrap a plain prompt in a TOON envelope
//!
//! ```
//! use toon_mcp::{McpServer, ToolConfig, ToolRegistry};
//!
//! let server = McpServer::new(ToolRegistry::new(ToolConfig::default()));
//! let response = server
//!     .process_line(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
//!     .unwrap();
//! assert_eq!(response.result, Some(serde_json::json!({})));
//! ```

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::{ToolConfig, ToolDef, ToolError, ToolRegistry};

use thiserror::Error;

/// Failures that stop the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
