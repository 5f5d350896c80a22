//! MCP server over stdio.
//!
//! Each tool call takes a fresh steering snapshot, so a `config set` made
//! while the server is running applies from the next call on.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::protocol::{
    error_codes, text_content, tool_definitions, AnalyzeArgs, BatchArgs, McpError, McpRequest,
    McpResponse, ToolCall, ToolVerdict, PROTOCOL_VERSION, SERVER_NAME,
};
use crate::db::models::ContentType;
use crate::scoring::Analyzer;
use crate::steering::{SteeringConfig, SteeringManager};

pub struct McpServer {
    analyzer: Arc<Analyzer>,
    steering: Arc<SteeringManager>,
}

impl McpServer {
    pub fn new(analyzer: Arc<Analyzer>, steering: Arc<SteeringManager>) -> Self {
        Self { analyzer, steering }
    }

    /// Serve until stdin closes. Responses go to stdout; logs go to stderr.
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        info!("MCP server started");

        while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }

        info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw line. `None` means nothing is written back.
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Unparsable MCP message");
                return Some(McpResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<McpRequest>(value) {
            Ok(request) => self.handle(&request).await,
            Err(e) => Some(McpResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    pub async fn handle(&self, request: &McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(request.params.as_ref()).await,
            "ping" => Ok(json!({})),
            other => Err(McpError {
                code: error_codes::METHOD_NOT_FOUND,
                message: format!("Method not found: {other}"),
            }),
        };

        Some(match outcome {
            Ok(result) => McpResponse::success(id, result),
            Err(e) => McpResponse::error(id, e.code, e.message),
        })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, McpError> {
        let call: ToolCall = parse_params(params.cloned().unwrap_or(Value::Null))?;
        let config = self.steering.get().await;

        match call.name.as_str() {
            "analyze_content" => {
                let args: AnalyzeArgs = parse_params(call.arguments)?;
                let verdict = self.verdict(&args, &config).await?;
                Ok(text_content(&json!(verdict)))
            }
            "batch_analyze" => {
                let args: BatchArgs = parse_params(call.arguments)?;
                let verdicts = join_all(args.items.iter().map(|item| self.verdict(item, &config)))
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(text_content(&json!(verdicts)))
            }
            other => Err(invalid_params(format!("Unknown tool: {other}"))),
        }
    }

    async fn verdict(
        &self,
        args: &AnalyzeArgs,
        config: &SteeringConfig,
    ) -> Result<ToolVerdict, McpError> {
        if args.content.trim().is_empty() {
            return Err(invalid_params("content must not be empty"));
        }
        let content_type = args.content_type.unwrap_or(ContentType::Text);
        let analysis = self.analyzer.analyze(&args.content, config).await;
        Ok(ToolVerdict::new(content_type, &analysis.score))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, McpError> {
    serde_json::from_value(value).map_err(|e| invalid_params(format!("Invalid params: {e}")))
}

fn invalid_params(message: impl Into<String>) -> McpError {
    McpError {
        code: error_codes::INVALID_PARAMS,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::traits::DetectorKind;
    use crate::detectors::DetectorSet;
    use crate::steering::{MemoryStore, SteeringUpdate};

    async fn server() -> (McpServer, Arc<SteeringManager>) {
        let steering = Arc::new(SteeringManager::open(Arc::new(MemoryStore::new())).await);
        let analyzer = Arc::new(Analyzer::new(DetectorSet::local()));
        (McpServer::new(analyzer, steering.clone()), steering)
    }

    fn tool_payload(response: &McpResponse) -> Value {
        let text = response.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let (server, _) = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(resp.id, json!(1));
    }

    #[tokio::test]
    async fn unparsable_line_gets_parse_error_with_null_id() {
        let (server, _) = server().await;
        let resp = server.handle_line("{not json").await.unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn unknown_method_and_notifications() {
        let (server, _) = server().await;
        let resp = server
            .handle(&McpRequest::new("resources/list").with_id(7))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let notification = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.handle_line(notification).await.is_none());
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn explicit_null_id_still_gets_a_response() {
        let (server, _) = server().await;
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, Value::Null);
        assert!(resp.error.is_none());
        assert!(resp.result.is_some());
    }

    #[tokio::test]
    async fn analyze_content_returns_rounded_verdict() {
        let (server, _) = server().await;
        let req = McpRequest::new("tools/call").with_params(json!({
            "name": "analyze_content",
            "arguments": { "content": "FREE MONEY WINNER CLICK HERE ACT NOW", "type": "email" }
        }));
        let resp = server.handle(&req).await.unwrap();
        let payload = tool_payload(&resp);
        assert_eq!(payload["type"], "email");
        assert_eq!(payload["spam"], 95);
        assert_eq!(payload["threatLevel"], "high");
        assert_eq!(payload["isThreat"], true);
    }

    #[tokio::test]
    async fn batch_analyze_keeps_item_order() {
        let (server, _) = server().await;
        let req = McpRequest::new("tools/call").with_params(json!({
            "name": "batch_analyze",
            "arguments": { "items": [
                { "content": "see you tomorrow" },
                { "content": "you stupid idiot!!!", "type": "comment" }
            ] }
        }));
        let payload = tool_payload(&server.handle(&req).await.unwrap());
        let items = payload.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["type"], "text");
        assert_eq!(items[0]["isThreat"], false);
        assert_eq!(items[1]["type"], "comment");
        assert_eq!(items[1]["toxicity"], 50);
    }

    #[tokio::test]
    async fn bad_params_and_unknown_tool_are_invalid_params() {
        let (server, _) = server().await;
        for params in [
            json!({ "name": "analyze_content", "arguments": {} }),
            json!({ "name": "analyze_content", "arguments": { "content": "  " } }),
            json!({ "name": "delete_everything", "arguments": {} }),
            json!({ "arguments": {} }),
        ] {
            let req = McpRequest::new("tools/call").with_params(params);
            let resp = server.handle(&req).await.unwrap();
            assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
        }
    }

    #[tokio::test]
    async fn steering_changes_apply_to_the_next_call() {
        let (server, steering) = server().await;
        let req = McpRequest::new("tools/call").with_params(json!({
            "name": "analyze_content",
            "arguments": { "content": "you stupid idiot!!!" }
        }));
        assert_eq!(tool_payload(&server.handle(&req).await.unwrap())["toxicity"], 50);

        steering
            .set(&SteeringUpdate::default().agent(DetectorKind::Toxicity, false))
            .await
            .unwrap();
        let payload = tool_payload(&server.handle(&req).await.unwrap());
        assert_eq!(payload["toxicity"], 0);
        assert_eq!(payload["isThreat"], false);
    }
}
