//! Stdio transport: one JSON-RPC message per line in, one per line out.
//! Requests are handled to completion one at a time.

pub mod protocol;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::tools::{catalog, Arguments, ToolDispatcher};
use protocol::{
    CallParams, Request, Response, DEFAULT_PROTOCOL_VERSION, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR,
};

pub struct Server {
    dispatcher: ToolDispatcher,
    name: String,
    version: &'static str,
}

impl Server {
    pub fn new(dispatcher: ToolDispatcher, name: impl Into<String>) -> Self {
        Self { dispatcher, name: name.into(), version: env!("CARGO_PKG_VERSION") }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Serve until the reader hits EOF.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(server = %self.name, "serving tools on stdio");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "unparsable message");
                return Some(Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}")));
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Response::result(
                    id,
                    json!({
                        "protocolVersion": version,
                        "capabilities": { "tools": {} },
                        "serverInfo": { "name": self.name, "version": self.version }
                    }),
                )
            }
            "ping" => Response::result(id, json!({})),
            "tools/list" => Response::result(id, json!({ "tools": catalog() })),
            "tools/call" => match serde_json::from_value::<CallParams>(request.params) {
                Ok(call) => {
                    let args: Arguments = call.arguments.unwrap_or_default();
                    let result = self.dispatcher.call(&call.name, &args).await;
                    match serde_json::to_value(result) {
                        Ok(v) => Response::result(id, v),
                        Err(e) => Response::error(id, INVALID_PARAMS, e.to_string()),
                    }
                }
                Err(e) => Response::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
            },
            other => Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };
        Some(response)
    }
}
