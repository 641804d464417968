//! Tools acting on one existing object
//!
//! Every handler resolves its target first and fails with
//! `Error: Object '<name>' not found` before touching the scene.

use blender_mcp_core::{SceneHost, TransformUpdate, Vector3};
use schemars::JsonSchema;

use super::require_object;
use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

/// Request naming a single object
#[derive(Debug, JsonSchema)]
pub struct ObjectRequest {
    /// Name of the object
    pub name: String,
}

impl ToolInput for ObjectRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::lookup_name("name", &mut name)?;
        Ok(Self { name })
    }
}

/// Request for moving an object
#[derive(Debug, JsonSchema)]
pub struct MoveObjectRequest {
    /// Name of the object to move
    pub name: String,

    /// New location [x, y, z], each within ±10000
    pub location: [f64; 3],
}

impl ToolInput for MoveObjectRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::lookup_name("name", &mut name)?;
        let location = args.required("location")?;
        validate::location(location)?;
        Ok(Self { name, location })
    }
}

/// Request for rotating an object
#[derive(Debug, JsonSchema)]
pub struct RotateObjectRequest {
    /// Name of the object to rotate
    pub name: String,

    /// Euler rotation in radians [x, y, z], each within ±2π
    pub rotation: [f64; 3],
}

impl ToolInput for RotateObjectRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::lookup_name("name", &mut name)?;
        let rotation = args.required("rotation")?;
        validate::rotation(rotation)?;
        Ok(Self { name, rotation })
    }
}

/// Request for scaling an object
#[derive(Debug, JsonSchema)]
pub struct ScaleObjectRequest {
    /// Name of the object to scale
    pub name: String,

    /// Scale factors [x, y, z], each > 0 and <= 1000
    pub scale: [f64; 3],
}

impl ToolInput for ScaleObjectRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::lookup_name("name", &mut name)?;
        let scale = args.required("scale")?;
        validate::object_scale(scale)?;
        Ok(Self { name, scale })
    }
}

/// Request for duplicating an object
#[derive(Debug, JsonSchema)]
pub struct DuplicateObjectRequest {
    /// Name of the object to duplicate
    pub name: String,

    /// Name for the copy (1-63 characters, no / \ : * ? " < > |)
    pub new_name: String,

    /// Location for the copy [x, y, z]; keeps the source location when omitted
    #[schemars(default)]
    pub location: Option<[f64; 3]>,
}

impl ToolInput for DuplicateObjectRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::lookup_name("name", &mut name)?;
        let mut new_name = args.required("new_name")?;
        validate::new_name("new_name", &mut new_name)?;
        let location: Option<[f64; 3]> = args.optional("location", || None)?;
        location.map_or(Ok(()), validate::location)?;
        Ok(Self {
            name,
            new_name,
            location,
        })
    }
}

pub fn move_object(input: &MoveObjectRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    let location = Vector3::from(input.location);
    host.set_transform(&input.name, TransformUpdate::Location(location))?;
    host.select_object(&input.name, false)?;
    Ok(format!(
        "Successfully moved object '{}' to location {}",
        input.name, location
    ))
}

pub fn delete_object(input: &ObjectRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    host.remove_object(&input.name)?;
    Ok(format!("Successfully deleted object '{}'", input.name))
}

pub fn select_object(input: &ObjectRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    host.select_object(&input.name, true)?;
    Ok(format!("Successfully selected object '{}'", input.name))
}

pub fn rotate_object(
    input: &RotateObjectRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    let rotation = Vector3::from(input.rotation);
    host.set_transform(&input.name, TransformUpdate::Rotation(rotation))?;
    Ok(format!(
        "Successfully rotated object '{}' to rotation {}",
        input.name, rotation
    ))
}

pub fn scale_object(input: &ScaleObjectRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    let scale = Vector3::from(input.scale);
    host.set_transform(&input.name, TransformUpdate::Scale(scale))?;
    Ok(format!(
        "Successfully scaled object '{}' to scale {}",
        input.name, scale
    ))
}

pub fn get_object_info(input: &ObjectRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let info = require_object(host, &input.name)?;

    let mut lines = vec![
        format!("Object: {}", info.name),
        format!("Type: {}", info.object_type),
        format!("Location: {}", info.location),
        format!("Rotation: {}", info.rotation),
        format!("Scale: {}", info.scale),
    ];
    if let Some(mesh) = info.mesh {
        lines.push(format!("Vertices: {}", mesh.vertices));
        lines.push(format!("Faces: {}", mesh.faces));
    }
    Ok(lines.join("\n"))
}

pub fn duplicate_object(
    input: &DuplicateObjectRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    require_object(host, &input.name)?;
    let assigned = host.duplicate_object(
        &input.name,
        &input.new_name,
        input.location.map(Vector3::from),
    )?;
    Ok(format!(
        "Successfully duplicated object '{}' as '{}'",
        input.name, assigned
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "move_object",
            "Move Object",
            "Move an existing object to a new location. The object also becomes selected and active.",
            move_object,
        ),
        ToolEntry::new(
            "delete_object",
            "Delete Object",
            "Delete an object from the scene by name.",
            delete_object,
        ),
        ToolEntry::new(
            "select_object",
            "Select Object",
            "Select an object by name and make it the active object. All other objects are deselected.",
            select_object,
        ),
        ToolEntry::new(
            "rotate_object",
            "Rotate Object",
            "Set an object's Euler rotation in radians.",
            rotate_object,
        ),
        ToolEntry::new(
            "scale_object",
            "Scale Object",
            "Set an object's scale factors. Values must be positive.",
            scale_object,
        ),
        ToolEntry::new(
            "get_object_info",
            "Get Object Info",
            "Get detailed information about an object: type, location, rotation and scale, plus vertex and face counts for meshes.",
            get_object_info,
        ),
        ToolEntry::new(
            "duplicate_object",
            "Duplicate Object",
            "Duplicate an object under a new name, optionally placing the copy at a new location.",
            duplicate_object,
        ),
    ]
}
