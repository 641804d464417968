//! Blender MCP Server - Model Context Protocol server for Blender scene manipulation
//!
//! This crate exposes Blender's object model to AI agents as a set of
//! validated MCP tools. Agents can:
//!
//! - Create primitives (cube, UV sphere, cylinder, plane)
//! - Move, rotate, scale, select, duplicate and delete objects
//! - Create materials and assign them to objects
//! - Place cameras and lights, pick the active camera and render stills
//! - Save and open `.blend` documents
//!
//! ## Request flow
//!
//! 1. The client calls a tool by name over stdio JSON-RPC
//! 2. The arguments are deserialized and checked against the tool's constraints
//! 3. The handler runs once on the scene host thread
//! 4. A single human-readable status line (or an `Error...` line) comes back
//!
//! Tool-level failures are never protocol errors: they are ordinary text
//! results. Only an unknown tool name is answered with `invalid_params`.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod state;
pub mod tools;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::io::stdio,
};
use serde_json::Value;

use crate::lifecycle::StopSignal;
use crate::registry::registry;
use crate::state::HostHandle;

pub use rmcp;

/// The Blender MCP service
///
/// Implements the MCP ServerHandler on top of the tool registry. All scene
/// access goes through the [`HostHandle`], so the service is cheap to clone
/// and Send + Sync.
#[derive(Clone)]
pub struct BlenderMcpService {
    host: HostHandle,
}

impl BlenderMcpService {
    /// Create a new MCP service backed by the given host thread
    pub fn new(host: HostHandle) -> Self {
        Self { host }
    }

    /// Tool descriptors advertised in `tools/list`
    pub fn tools() -> Vec<Tool> {
        registry()
            .iter()
            .map(|entry| {
                Tool::new(
                    entry.name(),
                    entry.description(),
                    Arc::new(entry.input_schema().clone()),
                )
            })
            .collect()
    }

    /// Run one tool and return its message
    ///
    /// Unknown tools are an `invalid_params` protocol error. A vanished host
    /// thread is an internal error.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, McpError> {
        tracing::info!(tool = name, "Tool call");

        match self.host.invoke(name, arguments).await {
            Ok(Some(outcome)) => Ok(outcome.into_message()),
            Ok(None) => {
                tracing::warn!(tool = name, "Unknown tool requested");
                Err(McpError::invalid_params(
                    format!("Unknown tool: {name}"),
                    None,
                ))
            }
            Err(e) => {
                tracing::error!(tool = name, error = %e, "Scene host unreachable");
                Err(McpError::internal_error(e.to_string(), None))
            }
        }
    }
}

impl ServerHandler for BlenderMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "blender-mcp".to_string(),
                title: Some("Blender Scene Tools".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: Some("https://github.com/blender-mcp/blender-mcp".to_string()),
            },
            instructions: Some(
                "Blender MCP server for building and rendering 3D scenes. \
                 \n\nWorkflow:\n\
                 1. create_cube() / create_sphere() / create_cylinder() / create_plane() - Add geometry\n\
                 2. move_object() / rotate_object() / scale_object() - Arrange it\n\
                 3. create_material() + assign_material() - Add color\n\
                 4. create_camera() + set_active_camera(), create_light() - Stage the shot\n\
                 5. render_scene() - Render a still to disk\n\
                 6. save_file() - Keep the result as a .blend file\n\n\
                 Use list_objects() and get_object_info() to inspect the scene at any time. \
                 Rotations are in radians."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(Self::tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        let message = self.call(&request.name, arguments).await?;
        Ok(CallToolResult::success(vec![Content::text(message)]))
    }
}

/// Serve `service` on stdin/stdout until the client disconnects or `stop` fires
pub async fn serve_stdio(service: BlenderMcpService, mut stop: StopSignal) -> Result<()> {
    let server = service
        .serve(stdio())
        .await
        .context("Failed to initialize MCP session")?;
    tracing::info!("Ready. Listening on stdio...");

    let cancel = server.cancellation_token();
    let waiting = server.waiting();
    tokio::pin!(waiting);

    tokio::select! {
        result = &mut waiting => {
            let reason = result.context("MCP session task failed")?;
            tracing::info!(?reason, "Client disconnected");
        }
        () = stop.requested() => {
            tracing::info!("Stop requested, closing MCP session");
            cancel.cancel();
            waiting.await.context("MCP session task failed")?;
        }
    }
    Ok(())
}
