//! MCP wire types (JSON-RPC 2.0, one message per line).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::db::models::{round_score, ContentType};
use crate::scoring::AggregateScore;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "trust-guardian-analyzer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications, which get no response. An explicit
    /// `"id": null` is kept as `Some(Value::Null)` and still answered.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Only called when the key is present, so `null` stays distinguishable
/// from a missing id.
fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl McpRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(Value::Number(1.into())),
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Always serialized; `null` when the request id couldn't be read.
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
}

pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

/// `tools/call` params.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeArgs {
    pub content: String,
    #[serde(rename = "type", default)]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchArgs {
    pub items: Vec<AnalyzeArgs>,
}

/// What a tool reports for one item. Scores are whole percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolVerdict {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub spam: u32,
    pub deepfake: u32,
    pub toxicity: u32,
    pub scam: u32,
    pub threat_level: String,
    pub is_threat: bool,
}

impl ToolVerdict {
    pub fn new(content_type: ContentType, score: &AggregateScore) -> Self {
        Self {
            content_type,
            spam: round_score(score.spam),
            deepfake: round_score(score.deepfake),
            toxicity: round_score(score.toxicity),
            scam: round_score(score.scam),
            threat_level: score.overall.as_str().to_string(),
            is_threat: score.is_threat,
        }
    }
}

/// Wrap a JSON payload as MCP text content.
pub fn text_content(payload: &Value) -> Value {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    json!({ "content": [{ "type": "text", "text": text }] })
}

const CONTENT_TYPES: [&str; 5] = ["email", "comment", "review", "text", "ocr_image"];

/// Definitions for `analyze_content` and `batch_analyze`.
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": "analyze_content",
            "description": "Analyze content for spam, deepfakes, toxicity, and scams",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "Content to analyze" },
                    "type": { "type": "string", "enum": CONTENT_TYPES, "default": "text" }
                },
                "required": ["content"]
            }
        },
        {
            "name": "batch_analyze",
            "description": "Analyze multiple content items concurrently",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "content": { "type": "string" },
                                "type": { "type": "string", "enum": CONTENT_TYPES }
                            },
                            "required": ["content"]
                        }
                    }
                },
                "required": ["items"]
            }
        }
    ])
}
