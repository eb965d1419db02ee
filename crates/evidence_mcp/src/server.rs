//! MCP Server Implementation
//!
//! JSON-RPC 2.0 server over stdio for the Model Context Protocol.
//!
//! # Architecture
//!
//! The server reads one request per line from stdin and writes one response
//! per line to stdout. Requests are handled strictly in order; a query
//! blocks the loop until the engine returns. Logging goes to stderr and the
//! log file, never to stdout.
//!
//! # Example
//!
//! ```ignore
//! let gateway = QueryGateway::new(Arc::new(catalog));
//! let mut server = McpServer::new(gateway, McpServerConfig::default());
//! server.run()?; // Blocking, no async runtime required
//! ```

use crate::protocol::{
    methods, ContentBlock, ErrorCode, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListChangedCapability, RequestId, ResourceReadParams,
    ResourceReadResult, ResourceTemplatesListResult, ResourcesListResult, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolCallResult, ToolsListResult, JSONRPC_VERSION,
    MCP_PROTOCOL_VERSION,
};
use crate::resources;
use crate::security::OutputBudget;
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use evidence_db::{QueryGateway, DEFAULT_PREVIEW_LIMIT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{debug, error, info, info_span, warn};

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "evidence-mcp-server";

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name (reported in initialize)
    pub server_name: String,

    /// Server version (reported in initialize)
    pub server_version: String,

    /// Maximum serialized tool result size in bytes
    pub max_response_bytes: usize,

    /// Row cap for `evidence://query/{source}/{table}` reads
    pub default_result_limit: usize,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            max_response_bytes: crate::security::DEFAULT_MAX_RESPONSE_BYTES,
            default_result_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

/// MCP Server
pub struct McpServer {
    config: McpServerConfig,
    gateway: QueryGateway,
    tools: ToolRegistry,
    budget: OutputBudget,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server over an already built catalog
    pub fn new(gateway: QueryGateway, config: McpServerConfig) -> Self {
        let budget = OutputBudget::new(config.max_response_bytes);
        Self {
            config,
            gateway,
            tools: ToolRegistry::new(),
            budget,
            initialized: false,
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// True once a client has sent `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server (blocking, reads from stdin, writes to stdout)
    pub fn run(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<()> {
        info!(
            sources = self.gateway.catalog().sources().len(),
            tables = self.gateway.catalog().table_count(),
            "MCP server starting"
        );

        for line in reader.lines() {
            let line = line.context("Failed to read request line")?;

            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let request = match parse_request(&line) {
                Ok(req) => req,
                Err(response) => {
                    write_response(&mut writer, &response)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_response(&mut writer, &response)?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single request; `None` for notifications.
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let span = info_span!("mcp.request", method = %request.method);
        let _guard = span.enter();

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::new(
                    ErrorCode::InvalidRequest,
                    format!("Invalid JSON-RPC version: {}", request.jsonrpc),
                ),
            ));
        }

        let notification = request.is_notification();
        let id = request.id.clone();

        let response = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, request.params),
            methods::INITIALIZED => {
                debug!("Client initialized");
                JsonRpcResponse::success(id, Value::Object(Default::default()))
            }
            methods::PING => JsonRpcResponse::success(id, Value::Object(Default::default())),
            methods::TOOLS_LIST => to_response(
                id,
                &ToolsListResult {
                    tools: self.tools.list_tools(),
                },
            ),
            methods::TOOLS_CALL => self.handle_tools_call(id, request.params),
            methods::RESOURCES_LIST => to_response(
                id,
                &ResourcesListResult {
                    resources: resources::list_resources(&self.gateway),
                },
            ),
            methods::RESOURCES_TEMPLATES_LIST => to_response(
                id,
                &ResourceTemplatesListResult {
                    resource_templates: resources::list_templates(),
                },
            ),
            methods::RESOURCES_READ => self.handle_resources_read(id, request.params),
            other => JsonRpcResponse::error(
                id,
                JsonRpcError::new(
                    ErrorCode::MethodNotFound,
                    format!("Method not found: {}", other),
                ),
            ),
        };

        if notification {
            None
        } else {
            Some(response)
        }
    }

    fn handle_initialize(
        &mut self,
        id: Option<RequestId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(params, "initialize") {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!(
            "Initialize from {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_call(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params, "tool call") {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        let Some(tool) = self.tools.get_tool(&params.name) else {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::new(
                    ErrorCode::InvalidParams,
                    format!("Unknown tool: {}", params.name),
                ),
            );
        };

        info!("Tool call: {}", params.name);

        let result = match tool.execute(params.arguments, &self.gateway) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(json) => {
                    let (content, was_truncated) = self.budget.enforce(json);
                    ToolCallResult {
                        content: vec![ContentBlock::text(content)],
                        // Truncated output is flagged so the client narrows the query
                        is_error: was_truncated,
                    }
                }
                Err(e) => {
                    error!("Failed to serialize tool result: {}", e);
                    error_result(format!("Error: Serialization failed: {}", e))
                }
            },
            Err(e) if e.is_invalid_params() => {
                return JsonRpcResponse::error(id, JsonRpcError::from_tool_error(&e));
            }
            Err(e) => {
                warn!(tool = %params.name, "Tool error: {}", e);
                error_result(format!("Error: {}", e))
            }
        };

        to_response(id, &result)
    }

    fn handle_resources_read(
        &self,
        id: Option<RequestId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ResourceReadParams = match parse_params(params, "resource read") {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!("Resource read: {}", params.uri);

        let contents =
            resources::read_resource(&self.gateway, &params.uri, self.config.default_result_limit);
        to_response(
            id,
            &ResourceReadResult {
                contents: vec![contents],
            },
        )
    }
}

/// Split "not JSON" (-32700) from "JSON but not a request" (-32600).
fn parse_request(line: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!("Unparseable request: {}", e);
        JsonRpcResponse::error(
            None,
            JsonRpcError::new(ErrorCode::ParseError, format!("Invalid JSON: {}", e)),
        )
    })?;

    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
    serde_json::from_value(value).map_err(|e| {
        warn!("Invalid request: {}", e);
        JsonRpcResponse::error(
            id,
            JsonRpcError::new(ErrorCode::InvalidRequest, format!("Invalid request: {}", e)),
        )
    })
}

fn parse_params<T: DeserializeOwned>(
    params: Option<Value>,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| {
        JsonRpcError::new(ErrorCode::InvalidParams, format!("Missing {} params", what))
    })?;
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::new(
            ErrorCode::InvalidParams,
            format!("Invalid {} params: {}", what, e),
        )
    })
}

fn to_response<T: Serialize>(id: Option<RequestId>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            JsonRpcResponse::error(
                id,
                JsonRpcError::new(ErrorCode::InternalError, "Failed to serialize response"),
            )
        }
    }
}

fn error_result(text: String) -> ToolCallResult {
    ToolCallResult {
        content: vec![ContentBlock::text(text)],
        is_error: true,
    }
}

fn write_response<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    debug!("Sending: {}", json);
    writeln!(writer, "{}", json)?;
    writer.flush()?;
    Ok(())
}
