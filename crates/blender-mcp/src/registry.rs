//! The tool table
//!
//! Each [`ToolEntry`] couples a tool name with its input contract and handler.
//! The table is built once per process and never changes afterwards.

use std::sync::LazyLock;

use blender_mcp_core::SceneHost;
use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolOutcome};
use crate::tools;
use crate::validate::{self, ToolInput};

/// A tool handler: validated input in, success message or error out
pub type Handler<I> = fn(&I, &mut dyn SceneHost) -> Result<String, ToolError>;

type Invoker = Box<dyn Fn(&mut dyn SceneHost, Value) -> ToolOutcome + Send + Sync>;

/// One registered tool
pub struct ToolEntry {
    name: &'static str,
    label: &'static str,
    description: &'static str,
    input_schema: Map<String, Value>,
    invoke: Invoker,
}

impl ToolEntry {
    /// Register `handler` under `name` with input type `I`
    ///
    /// Arguments are read into `I` field by field, each checked as it is
    /// read, before `handler` runs. Any failure there is reported without
    /// touching the host.
    pub fn new<I>(
        name: &'static str,
        label: &'static str,
        description: &'static str,
        handler: Handler<I>,
    ) -> Self
    where
        I: ToolInput + JsonSchema + 'static,
    {
        let invoke = move |host: &mut dyn SceneHost, arguments: Value| {
            let input: I = match validate::parse(arguments) {
                Ok(input) => input,
                Err(message) => return ToolOutcome::Failure(ToolError::Validation(message)),
            };
            handler(&input, host).map_err(|e| e.with_label(label)).into()
        };

        Self {
            name,
            label,
            description,
            input_schema: schema_object::<I>(),
            invoke: Box::new(invoke),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable operation label used in failure messages
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// JSON Schema of the tool's input object
    pub fn input_schema(&self) -> &Map<String, Value> {
        &self.input_schema
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Every tool the server exposes, in registration order
#[derive(Debug)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
}

impl ToolRegistry {
    /// Build the table from a list of entries
    ///
    /// A later entry with an already registered name is ignored.
    pub fn new(entries: impl IntoIterator<Item = ToolEntry>) -> Self {
        let mut unique: Vec<ToolEntry> = Vec::new();
        for entry in entries {
            if unique.iter().any(|e| e.name == entry.name) {
                tracing::warn!(tool = entry.name, "Duplicate tool registration ignored");
                continue;
            }
            unique.push(entry);
        }
        Self { entries: unique }
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run tool `name` against `host`
    ///
    /// Returns `None` for an unknown tool. The caller decides how to report
    /// that, since it is not a tool-level failure.
    pub fn invoke(
        &self,
        name: &str,
        host: &mut dyn SceneHost,
        arguments: Value,
    ) -> Option<ToolOutcome> {
        let entry = self.get(name)?;
        let outcome = (entry.invoke)(host, arguments);
        match &outcome {
            ToolOutcome::Success(_) => tracing::debug!(tool = name, "Tool succeeded"),
            ToolOutcome::Failure(error) => {
                tracing::debug!(tool = name, error = %error, "Tool failed");
            }
        }
        Some(outcome)
    }
}

static REGISTRY: LazyLock<ToolRegistry> = LazyLock::new(|| ToolRegistry::new(tools::entries()));

/// The process-wide tool table
pub fn registry() -> &'static ToolRegistry {
    &REGISTRY
}

fn schema_object<I: JsonSchema>() -> Map<String, Value> {
    match serde_json::to_value(schemars::schema_for!(I)) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String("object".to_string()));
            map
        }
    }
}
