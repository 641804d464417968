//! Whole-scene tools

use blender_mcp_core::SceneHost;
use schemars::JsonSchema;

use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{Arguments, ToolInput};

/// Request for tools that take no arguments
#[derive(Debug, Default, JsonSchema)]
pub struct EmptyRequest {}

impl ToolInput for EmptyRequest {
    fn parse(_args: &Arguments) -> Result<Self, String> {
        Ok(Self {})
    }
}

pub fn list_objects(_input: &EmptyRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let objects = host.objects()?;
    if objects.is_empty() {
        return Ok("Scene is empty - no objects found".to_string());
    }

    let lines: Vec<String> = objects
        .iter()
        .map(|o| format!("  - {} ({}) at location {}", o.name, o.object_type, o.location))
        .collect();
    Ok(format!(
        "Found {} object(s):\n{}",
        objects.len(),
        lines.join("\n")
    ))
}

pub fn clear_scene(_input: &EmptyRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    if host.objects()?.is_empty() {
        return Ok("Scene was already empty".to_string());
    }
    let removed = host.clear_objects()?;
    Ok(format!(
        "Successfully cleared scene - removed {removed} object(s)"
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "list_objects",
            "List Objects",
            "List every object in the scene with its type and location.",
            list_objects,
        ),
        ToolEntry::new(
            "clear_scene",
            "Clear Scene",
            "Remove all objects from the scene. Materials are kept.",
            clear_scene,
        ),
    ]
}
