//! Light tools

use blender_mcp_core::{LightType, SceneHost, Vector3};
use schemars::JsonSchema;

use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

fn default_light_type() -> String {
    "SUN".to_string()
}

fn default_light_location() -> [f64; 3] {
    [0.0, 0.0, 10.0]
}

fn default_energy() -> f64 {
    1.0
}

/// Request for creating a light
#[derive(Debug, JsonSchema)]
pub struct CreateLightRequest {
    /// Name for the light object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Light type: "SUN" (default), "POINT", "SPOT" or "AREA"; case-insensitive
    #[schemars(default = "default_light_type")]
    pub light_type: String,

    /// Location in 3D space [x, y, z] (default: [0, 0, 10])
    #[schemars(default = "default_light_location")]
    pub location: [f64; 3],

    /// Light energy, 0.0-1000.0 (default: 1.0)
    #[schemars(default = "default_energy")]
    pub energy: f64,
}

impl ToolInput for CreateLightRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let mut light_type = args.optional("light_type", default_light_type)?;
        validate::one_of("Light type", &mut light_type, LightType::all_names())?;
        let location = args.optional("location", default_light_location)?;
        validate::location(location)?;
        let energy = args.optional("energy", default_energy)?;
        validate::float_range("energy", energy, 0.0, 1000.0)?;
        Ok(Self {
            name,
            light_type,
            location,
            energy,
        })
    }
}

pub fn create_light(input: &CreateLightRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let light_type = LightType::parse(&input.light_type).ok_or_else(|| {
        ToolError::Validation(format!(
            "Light type must be one of: {}",
            LightType::all_names().join(", ")
        ))
    })?;
    let location = Vector3::from(input.location);
    let name = host.add_light(&input.name, light_type, location, input.energy)?;
    Ok(format!(
        "Successfully created {} light '{}' at location {} with energy {:?}",
        light_type, name, location, input.energy
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![ToolEntry::new(
        "create_light",
        "Create Light",
        "Create a light in the scene. Types: SUN (directional), POINT (omnidirectional), SPOT (cone) and AREA (rectangular emitter).",
        create_light,
    )]
}
