//! Rendering tools
//!
//! Renders a still from the scene's active camera and writes it to disk. The
//! image format follows the file extension.

use std::path::PathBuf;

use blender_mcp_core::{HostError, RenderSettings, SceneHost};
use schemars::JsonSchema;

use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

fn default_resolution_x() -> u32 {
    1920
}

fn default_resolution_y() -> u32 {
    1080
}

/// Request for rendering the scene
#[derive(Debug, JsonSchema)]
pub struct RenderSceneRequest {
    /// Output image path, e.g. "/path/to/image.png".
    /// Must end with .png, .jpg, .jpeg, .bmp, .tiff or .exr
    pub filepath: String,

    /// Horizontal resolution in pixels (default: 1920, 1-10000)
    #[schemars(default = "default_resolution_x")]
    pub resolution_x: u32,

    /// Vertical resolution in pixels (default: 1080, 1-10000)
    #[schemars(default = "default_resolution_y")]
    pub resolution_y: u32,
}

impl ToolInput for RenderSceneRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let filepath: String = args.required("filepath")?;
        validate::image_path(&filepath)?;
        let resolution_x = args.optional("resolution_x", default_resolution_x)?;
        validate::int_range("resolution_x", resolution_x, 1, 10_000)?;
        let resolution_y = args.optional("resolution_y", default_resolution_y)?;
        validate::int_range("resolution_y", resolution_y, 1, 10_000)?;
        Ok(Self {
            filepath,
            resolution_x,
            resolution_y,
        })
    }
}

pub fn render_scene(input: &RenderSceneRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    if host.active_camera()?.is_none() {
        return Err(HostError::NoActiveCamera.into());
    }

    let settings = RenderSettings {
        filepath: PathBuf::from(&input.filepath),
        resolution_x: input.resolution_x,
        resolution_y: input.resolution_y,
    };
    host.render(&settings)?;

    Ok(format!(
        "Successfully rendered scene to '{}' at resolution {}x{}",
        input.filepath, input.resolution_x, input.resolution_y
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![ToolEntry::new(
        "render_scene",
        "Render Scene",
        "Render the scene from the active camera and save the image to a file. Requires an active camera (see create_camera and set_active_camera).",
        render_scene,
    )]
}
