//! Document tools: save, open and report the current `.blend` file

use std::path::Path;

use blender_mcp_core::SceneHost;
use schemars::JsonSchema;

use super::scene::EmptyRequest;
use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

/// Request naming a `.blend` document
#[derive(Debug, JsonSchema)]
pub struct DocumentRequest {
    /// Full path of the .blend file (must end with .blend)
    pub filepath: String,
}

impl ToolInput for DocumentRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut filepath = args.required("filepath")?;
        validate::document_path(&mut filepath)?;
        Ok(Self { filepath })
    }
}

pub fn save_file(input: &DocumentRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let path = Path::new(&input.filepath);
    host.save_document(path)?;
    tracing::info!(path = %path.display(), "Document saved");
    Ok(format!(
        "Successfully saved Blender file to '{}'",
        input.filepath
    ))
}

pub fn open_file(input: &DocumentRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let path = Path::new(&input.filepath);
    host.open_document(path)?;
    tracing::info!(path = %path.display(), "Document opened");
    Ok(format!("Successfully opened Blender file '{}'", input.filepath))
}

pub fn get_scene_filepath(
    _input: &EmptyRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    Ok(match host.document_path()? {
        Some(path) => format!("Current Blender file: {}", path.display()),
        None => "File not saved yet (unsaved file)".to_string(),
    })
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "save_file",
            "Save File",
            "Save the current scene to a .blend file. Missing parent directories are created.",
            save_file,
        ),
        ToolEntry::new(
            "open_file",
            "Open File",
            "Open an existing .blend file, replacing the current scene.",
            open_file,
        ),
        ToolEntry::new(
            "get_scene_filepath",
            "Get Scene Filepath",
            "Get the path of the currently open .blend file, if it has been saved.",
            get_scene_filepath,
        ),
    ]
}
