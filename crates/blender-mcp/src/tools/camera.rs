//! Camera tools

use blender_mcp_core::{ObjectType, SceneHost, Vector3};
use schemars::JsonSchema;

use super::{origin, require};
use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

fn default_camera_location() -> [f64; 3] {
    [0.0, 0.0, 5.0]
}

/// Request for creating a camera
#[derive(Debug, JsonSchema)]
pub struct CreateCameraRequest {
    /// Name for the camera object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Location in 3D space [x, y, z] (default: [0, 0, 5])
    #[schemars(default = "default_camera_location")]
    pub location: [f64; 3],

    /// Euler rotation in radians [x, y, z], each within ±2π (default: [0, 0, 0]).
    /// At zero rotation the camera looks straight down the -Z axis.
    #[schemars(default = "origin")]
    pub rotation: [f64; 3],
}

impl ToolInput for CreateCameraRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let location = args.optional("location", default_camera_location)?;
        validate::location(location)?;
        let rotation = args.optional("rotation", origin)?;
        validate::rotation(rotation)?;
        Ok(Self {
            name,
            location,
            rotation,
        })
    }
}

/// Request for choosing the scene camera
#[derive(Debug, JsonSchema)]
pub struct SetActiveCameraRequest {
    /// Name of the camera to set as active
    pub camera_name: String,
}

impl ToolInput for SetActiveCameraRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut camera_name = args.required("camera_name")?;
        validate::lookup_name("camera_name", &mut camera_name)?;
        Ok(Self { camera_name })
    }
}

pub fn create_camera(
    input: &CreateCameraRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    let location = Vector3::from(input.location);
    let rotation = Vector3::from(input.rotation);
    let name = host.add_camera(&input.name, location, rotation)?;
    Ok(format!(
        "Successfully created camera '{}' at location {} with rotation {}",
        name, location, rotation
    ))
}

pub fn set_active_camera(
    input: &SetActiveCameraRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    let target = require(host, "Camera", &input.camera_name)?;
    if target.object_type != ObjectType::Camera {
        return Err(ToolError::Rejected(format!(
            "Object '{}' is not a camera (type: {})",
            target.name, target.object_type
        )));
    }
    host.set_active_camera(&input.camera_name)?;
    Ok(format!(
        "Successfully set '{}' as active camera",
        input.camera_name
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "create_camera",
            "Create Camera",
            "Create a camera in the scene. Use set_active_camera to render from it.",
            create_camera,
        ),
        ToolEntry::new(
            "set_active_camera",
            "Set Active Camera",
            "Set which camera the scene renders from.",
            set_active_camera,
        ),
    ]
}
