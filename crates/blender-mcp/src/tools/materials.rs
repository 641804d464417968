//! Material tools

use blender_mcp_core::{SceneHost, Vector3};
use schemars::JsonSchema;

use super::require_object;
use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

fn default_color() -> [f64; 3] {
    [0.8, 0.8, 0.8]
}

/// Request for creating a material
#[derive(Debug, JsonSchema)]
pub struct CreateMaterialRequest {
    /// Name for the material (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Base color as RGB, each 0.0-1.0 (default: [0.8, 0.8, 0.8])
    #[schemars(default = "default_color")]
    pub color: [f64; 3],
}

impl ToolInput for CreateMaterialRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let color = args.optional("color", default_color)?;
        validate::color(color)?;
        Ok(Self { name, color })
    }
}

/// Request for assigning a material to an object
#[derive(Debug, JsonSchema)]
pub struct AssignMaterialRequest {
    /// Name of the object
    pub object_name: String,

    /// Name of the material to assign
    pub material_name: String,
}

impl ToolInput for AssignMaterialRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut object_name = args.required("object_name")?;
        validate::lookup_name("object_name", &mut object_name)?;
        let mut material_name = args.required("material_name")?;
        validate::lookup_name("material_name", &mut material_name)?;
        Ok(Self {
            object_name,
            material_name,
        })
    }
}

pub fn create_material(
    input: &CreateMaterialRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    if host.material_exists(&input.name)? {
        return Err(ToolError::Rejected(format!(
            "Material '{}' already exists",
            input.name
        )));
    }
    let color = Vector3::from(input.color);
    host.create_material(&input.name, color)?;
    Ok(format!(
        "Successfully created material '{}' with color RGB{}",
        input.name, color
    ))
}

pub fn assign_material(
    input: &AssignMaterialRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    require_object(host, &input.object_name)?;
    if !host.material_exists(&input.material_name)? {
        return Err(ToolError::NotFound {
            kind: "Material",
            name: input.material_name.clone(),
        });
    }
    host.assign_material(&input.object_name, &input.material_name)?;
    Ok(format!(
        "Successfully assigned material '{}' to object '{}'",
        input.material_name, input.object_name
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "create_material",
            "Create Material",
            "Create a new material with a base color. Assign it to objects with assign_material.",
            create_material,
        ),
        ToolEntry::new(
            "assign_material",
            "Assign Material",
            "Assign an existing material to an object, replacing the material in its first slot.",
            assign_material,
        ),
    ]
}
