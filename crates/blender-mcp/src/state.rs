//! Scene host thread
//!
//! A scene host is not required to be `Send` (Blender's Python objects are
//! not), so the host lives on a dedicated thread and tool calls reach it by
//! message passing. Commands are processed one at a time, which serializes
//! every mutation of the scene.

use std::thread;

use anyhow::{Context, Result, anyhow};
use blender_mcp_core::SceneHost;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::ToolOutcome;
use crate::registry::registry;

/// Commands sent to the host thread
enum Command {
    Invoke {
        tool: String,
        arguments: Value,
        respond: oneshot::Sender<Option<ToolOutcome>>,
    },
}

/// Handle to the host thread
///
/// This is Send + Sync and can be cloned and shared between tasks. The thread
/// exits once every handle has been dropped.
#[derive(Clone)]
pub struct HostHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl HostHandle {
    /// Spawn the host thread
    ///
    /// `factory` runs on the new thread, so the host it builds never crosses
    /// threads.
    pub fn spawn<F>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Box<dyn SceneHost> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        thread::Builder::new()
            .name("scene-host".to_string())
            .spawn(move || {
                let mut host = factory();
                tracing::debug!("Scene host thread started");

                while let Some(cmd) = rx.blocking_recv() {
                    match cmd {
                        Command::Invoke {
                            tool,
                            arguments,
                            respond,
                        } => {
                            let outcome = registry().invoke(&tool, host.as_mut(), arguments);
                            let _ = respond.send(outcome);
                        }
                    }
                }

                tracing::debug!("Scene host thread stopped");
            })
            .context("Failed to spawn scene host thread")?;

        Ok(Self { sender: tx })
    }

    /// Run tool `tool` on the host thread
    ///
    /// Returns `Ok(None)` for an unknown tool name. Errors mean the host
    /// thread is gone.
    pub async fn invoke(&self, tool: &str, arguments: Value) -> Result<Option<ToolOutcome>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Invoke {
                tool: tool.to_string(),
                arguments,
                respond: tx,
            })
            .map_err(|_| anyhow!("Scene host thread is not running"))?;
        rx.await.context("Scene host thread dropped the request")
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}
