//! Tool registry: the three TOON conversion tools exposed over MCP.
//!
//! The registry is built once at start-up and never mutated afterwards.
//! Each tool is a name, a description, a JSON input schema and a plain
//! function handler.

use serde_json::{json, Map, Value};
use thiserror::Error;
use toon_codec::{EncodeOptions, ToonError};

use crate::protocol::ToolDefinition;

/// Errors reported back to the host as `isError` tool results.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },

    #[error(transparent)]
    Codec(#[from] ToonError),
}

/// Settings shared by every tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Indentation used by `convert_json_to_toon` when the call omits `indent`.
    pub default_indent: Option<usize>,
}

type Handler = fn(&ToolConfig, &Map<String, Value>) -> Result<String, ToolError>;

/// A registered tool.
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    handler: Handler,
}

impl ToolDef {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// Immutable name → tool table.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
    config: ToolConfig,
}

impl ToolRegistry {
    /// Registry holding the TOON conversion tools.
    pub fn new(config: ToolConfig) -> Self {
        let tools = vec![
            ToolDef {
                name: "convert_json_to_toon",
                description: "Convert JSON-compatible data into TOON text.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "payload": {
                            "description": "Any JSON value to encode"
                        },
                        "indent": {
                            "type": "integer",
                            "minimum": 0,
                            "description": "Spaces per nesting level (optional)"
                        }
                    },
                    "required": ["payload"]
                }),
                handler: convert_json_to_toon,
            },
            ToolDef {
                name: "convert_toon_to_json",
                description: "Convert TOON text back into JSON-compatible data.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "toon_text": {
                            "type": "string",
                            "description": "String containing TOON-formatted data"
                        }
                    },
                    "required": ["toon_text"]
                }),
                handler: convert_toon_to_json,
            },
            ToolDef {
                name: "convert_system_prompt_to_toon",
                description: "Wrap a plain system prompt in a minimal TOON document.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompt": {
                            "type": "string",
                            "description": "The system prompt text"
                        }
                    },
                    "required": ["prompt"]
                }),
                handler: convert_system_prompt_to_toon,
            },
        ];
        Self { tools, config }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDef> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Definitions in registration order, for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolDef::definition).collect()
    }

    /// Run tool `name` with `arguments` and return its text output.
    pub fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tracing::debug!(tool = name, "calling tool");
        (tool.handler)(&self.config, arguments)
    }
}

fn required<'a>(arguments: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ToolError> {
    arguments.get(name).ok_or(ToolError::MissingArgument(name))
}

fn convert_json_to_toon(config: &ToolConfig, arguments: &Map<String, Value>) -> Result<String, ToolError> {
    let payload = toon_codec::to_value(required(arguments, "payload")?)?;
    let indent = match arguments.get("indent") {
        None | Some(Value::Null) => config.default_indent,
        Some(value) => {
            let indent = value.as_u64().ok_or_else(|| ToolError::InvalidArgument {
                name: "indent",
                message: format!("expected a non-negative integer, got {value}"),
            })?;
            Some(usize::try_from(indent).map_err(|_| ToolError::InvalidArgument {
                name: "indent",
                message: format!("{indent} is too large"),
            })?)
        }
    };
    let options = EncodeOptions {
        indent,
        ..EncodeOptions::default()
    };
    Ok(toon_codec::encode(&payload, &options))
}

fn convert_toon_to_json(_: &ToolConfig, arguments: &Map<String, Value>) -> Result<String, ToolError> {
    let value = toon_codec::decode_argument(required(arguments, "toon_text")?)?;
    serde_json::to_string_pretty(&value).map_err(|e| ToolError::Codec(e.into()))
}

fn convert_system_prompt_to_toon(
    _: &ToolConfig,
    arguments: &Map<String, Value>,
) -> Result<String, ToolError> {
    let prompt = toon_codec::text_argument(required(arguments, "prompt")?, "prompt as a string")?;
    Ok(toon_codec::encode_prompt(prompt))
}
