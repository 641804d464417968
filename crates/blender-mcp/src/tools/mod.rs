//! MCP tool implementations for Blender
//!
//! Each module holds the request types and handlers for one family of tools:
//! - Primitives (create_cube, create_sphere, create_cylinder, create_plane)
//! - Objects (move, rotate, scale, select, delete, duplicate, inspect)
//! - Materials (create_material, assign_material)
//! - Camera and lights (create_camera, set_active_camera, create_light)
//! - Rendering (render_scene)
//! - Files (save_file, open_file, get_scene_filepath)
//! - Scene (list_objects, clear_scene)

pub mod camera;
pub mod file;
pub mod light;
pub mod materials;
pub mod objects;
pub mod primitives;
pub mod render;
pub mod scene;

use blender_mcp_core::{ObjectInfo, SceneHost};

use crate::error::ToolError;
use crate::registry::ToolEntry;

/// All tool entries in registration order
pub(crate) fn entries() -> Vec<ToolEntry> {
    [
        primitives::entries(),
        objects::entries(),
        scene::entries(),
        materials::entries(),
        camera::entries(),
        light::entries(),
        render::entries(),
        file::entries(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Fetch a live snapshot of `name`, failing with `kind` when it is missing
pub(crate) fn require(
    host: &dyn SceneHost,
    kind: &'static str,
    name: &str,
) -> Result<ObjectInfo, ToolError> {
    host.object(name)?.ok_or_else(|| ToolError::NotFound {
        kind,
        name: name.to_string(),
    })
}

pub(crate) fn require_object(host: &dyn SceneHost, name: &str) -> Result<ObjectInfo, ToolError> {
    require(host, "Object", name)
}

fn origin() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}
