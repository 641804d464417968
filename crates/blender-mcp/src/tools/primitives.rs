//! Mesh primitive tools
//!
//! Mirrors Blender's `bpy.ops.mesh.primitive_*_add` operators. The object name
//! reported back is the one Blender actually assigned, which carries a numeric
//! suffix when the requested name was taken.

use blender_mcp_core::{Alignment, Primitive, PrimitiveSpec, SceneHost, Vector3};
use schemars::JsonSchema;

use super::origin;
use crate::error::ToolError;
use crate::registry::ToolEntry;
use crate::validate::{self, Arguments, ToolInput};

fn default_size() -> f64 {
    2.0
}

fn default_radius() -> f64 {
    1.0
}

fn default_depth() -> f64 {
    2.0
}

fn default_segments() -> u32 {
    32
}

fn default_ring_count() -> u32 {
    16
}

fn default_vertices() -> u32 {
    32
}

fn default_true() -> bool {
    true
}

fn default_align() -> String {
    "WORLD".to_string()
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// Request for creating a cube
#[derive(Debug, JsonSchema)]
pub struct CreateCubeRequest {
    /// Name for the cube object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Edge length of the cube (default: 2.0, must be > 0.001 and <= 1000.0)
    #[schemars(default = "default_size")]
    pub size: f64,

    /// Location in 3D space [x, y, z] (default: [0, 0, 0])
    #[schemars(default = "origin")]
    pub location: [f64; 3],
}

impl ToolInput for CreateCubeRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let size = args.optional("size", default_size)?;
        validate::extent("size", size)?;
        let location = args.optional("location", origin)?;
        validate::location(location)?;
        Ok(Self {
            name,
            size,
            location,
        })
    }
}

/// Request for creating a UV sphere
#[derive(Debug, JsonSchema)]
pub struct CreateSphereRequest {
    /// Name for the sphere object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Number of vertical segments (default: 32, 3-100000)
    #[schemars(default = "default_segments")]
    pub segments: u32,

    /// Number of horizontal rings (default: 16, 3-100000)
    #[schemars(default = "default_ring_count")]
    pub ring_count: u32,

    /// Sphere radius (default: 1.0, must be > 0.001 and <= 1000.0)
    #[schemars(default = "default_radius")]
    pub radius: f64,

    /// Generate a default UV map (default: true)
    #[schemars(default = "default_true")]
    pub calc_uvs: bool,

    /// Enter edit mode after creation (default: false)
    #[schemars(default)]
    pub enter_editmode: bool,

    /// Alignment of the new object: "WORLD" (default), "VIEW" or "CURSOR"
    #[schemars(default = "default_align")]
    pub align: String,

    /// Location in 3D space [x, y, z] (default: [0, 0, 0])
    #[schemars(default = "origin")]
    pub location: [f64; 3],

    /// Rotation in radians [x, y, z] (default: [0, 0, 0])
    #[schemars(default = "origin")]
    pub rotation: [f64; 3],

    /// Scale [x, y, z] (default: [1, 1, 1], each 0.0-1000.0)
    #[schemars(default = "unit_scale")]
    pub scale: [f64; 3],
}

impl ToolInput for CreateSphereRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let segments = args.optional("segments", default_segments)?;
        validate::int_range("segments", segments, 3, 100_000)?;
        let ring_count = args.optional("ring_count", default_ring_count)?;
        validate::int_range("ring_count", ring_count, 3, 100_000)?;
        let radius = args.optional("radius", default_radius)?;
        validate::extent("radius", radius)?;
        let calc_uvs = args.optional("calc_uvs", default_true)?;
        let enter_editmode = args.optional("enter_editmode", bool::default)?;
        let mut align = args.optional("align", default_align)?;
        validate::one_of("Align", &mut align, Alignment::all_names())?;
        let location = args.optional("location", origin)?;
        validate::vector(location)?;
        let rotation = args.optional("rotation", origin)?;
        validate::vector(rotation)?;
        let scale = args.optional("scale", unit_scale)?;
        validate::creation_scale(scale)?;
        Ok(Self {
            name,
            segments,
            ring_count,
            radius,
            calc_uvs,
            enter_editmode,
            align,
            location,
            rotation,
            scale,
        })
    }
}

/// Request for creating a cylinder
#[derive(Debug, JsonSchema)]
pub struct CreateCylinderRequest {
    /// Name for the cylinder object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Cylinder radius (default: 1.0, must be > 0.001 and <= 1000.0)
    #[schemars(default = "default_radius")]
    pub radius: f64,

    /// Cylinder height (default: 2.0, must be > 0.001 and <= 1000.0)
    #[schemars(default = "default_depth")]
    pub depth: f64,

    /// Location in 3D space [x, y, z] (default: [0, 0, 0])
    #[schemars(default = "origin")]
    pub location: [f64; 3],

    /// Number of vertices around the circumference (default: 32, 3-256)
    #[schemars(default = "default_vertices")]
    pub vertices: u32,
}

impl ToolInput for CreateCylinderRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let radius = args.optional("radius", default_radius)?;
        validate::extent("radius", radius)?;
        let depth = args.optional("depth", default_depth)?;
        validate::extent("depth", depth)?;
        let location = args.optional("location", origin)?;
        validate::location(location)?;
        let vertices = args.optional("vertices", default_vertices)?;
        validate::int_range("vertices", vertices, 3, 256)?;
        Ok(Self {
            name,
            radius,
            depth,
            location,
            vertices,
        })
    }
}

/// Request for creating a plane
#[derive(Debug, JsonSchema)]
pub struct CreatePlaneRequest {
    /// Name for the plane object (1-63 characters, no / \ : * ? " < > |)
    pub name: String,

    /// Edge length of the plane (default: 2.0, must be > 0.001 and <= 1000.0)
    #[schemars(default = "default_size")]
    pub size: f64,

    /// Location in 3D space [x, y, z] (default: [0, 0, 0])
    #[schemars(default = "origin")]
    pub location: [f64; 3],
}

impl ToolInput for CreatePlaneRequest {
    fn parse(args: &Arguments) -> Result<Self, String> {
        let mut name = args.required("name")?;
        validate::new_name("name", &mut name)?;
        let size = args.optional("size", default_size)?;
        validate::extent("size", size)?;
        let location = args.optional("location", origin)?;
        validate::location(location)?;
        Ok(Self {
            name,
            size,
            location,
        })
    }
}

pub fn create_cube(input: &CreateCubeRequest, host: &mut dyn SceneHost) -> Result<String, ToolError> {
    let location = Vector3::from(input.location);
    let name = host.add_primitive(PrimitiveSpec::new(
        input.name.as_str(),
        Primitive::Cube { size: input.size },
        location,
    ))?;
    Ok(format!(
        "Successfully created cube '{}' with size {:?} at location {}",
        name, input.size, location
    ))
}

pub fn create_sphere(
    input: &CreateSphereRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    let location = Vector3::from(input.location);
    let spec = PrimitiveSpec {
        rotation: Vector3::from(input.rotation),
        scale: Vector3::from(input.scale),
        align: Alignment::parse(&input.align).unwrap_or_default(),
        enter_editmode: input.enter_editmode,
        ..PrimitiveSpec::new(
            input.name.as_str(),
            Primitive::UvSphere {
                segments: input.segments,
                ring_count: input.ring_count,
                radius: input.radius,
                calc_uvs: input.calc_uvs,
            },
            location,
        )
    };
    let name = host.add_primitive(spec)?;
    Ok(format!(
        "Successfully created sphere '{}' with radius {:?} (segments={}, rings={}) at location {}",
        name, input.radius, input.segments, input.ring_count, location
    ))
}

pub fn create_cylinder(
    input: &CreateCylinderRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    let location = Vector3::from(input.location);
    let name = host.add_primitive(PrimitiveSpec::new(
        input.name.as_str(),
        Primitive::Cylinder {
            radius: input.radius,
            depth: input.depth,
            vertices: input.vertices,
        },
        location,
    ))?;
    Ok(format!(
        "Successfully created cylinder '{}' with radius {:?} and depth {:?} at location {}",
        name, input.radius, input.depth, location
    ))
}

pub fn create_plane(
    input: &CreatePlaneRequest,
    host: &mut dyn SceneHost,
) -> Result<String, ToolError> {
    let location = Vector3::from(input.location);
    let name = host.add_primitive(PrimitiveSpec::new(
        input.name.as_str(),
        Primitive::Plane { size: input.size },
        location,
    ))?;
    Ok(format!(
        "Successfully created plane '{}' with size {:?} at location {}",
        name, input.size, location
    ))
}

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "create_cube",
            "Create Cube",
            "Create a cube primitive in the Blender scene. Cubes are the basic building block for 3D structures.",
            create_cube,
        ),
        ToolEntry::new(
            "create_sphere",
            "Create Sphere",
            "Create a UV sphere in the Blender scene. Quad faces everywhere except triangle fans at the poles. Supports segment and ring counts, radius, UV generation, alignment, rotation and scale.",
            create_sphere,
        ),
        ToolEntry::new(
            "create_cylinder",
            "Create Cylinder",
            "Create a cylinder primitive in the Blender scene with the given radius, depth and number of vertices around the circumference.",
            create_cylinder,
        ),
        ToolEntry::new(
            "create_plane",
            "Create Plane",
            "Create a flat square plane in the Blender scene. Useful for floors, walls and backdrops.",
            create_plane,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use blender_mcp_core::MemoryScene;
    use serde_json::json;

    #[test]
    fn test_cube_reports_assigned_name() {
        let mut scene = MemoryScene::new();
        let input: CreateCubeRequest =
            validate::parse(json!({"name": " Box ", "location": [0.0, 0.0, 1.0]})).unwrap();
        assert_eq!(
            create_cube(&input, &mut scene).unwrap(),
            "Successfully created cube 'Box' with size 2.0 at location (0.0, 0.0, 1.0)"
        );
        assert_eq!(
            create_cube(&input, &mut scene).unwrap(),
            "Successfully created cube 'Box.001' with size 2.0 at location (0.0, 0.0, 1.0)"
        );
    }

    #[test]
    fn test_sphere_validation_order() {
        let err = validate::parse::<CreateSphereRequest>(
            json!({"radius": 0.0, "segments": 2, "name": "Ball"}),
        )
        .unwrap_err();
        assert_eq!(err, "segments must be between 3 and 100000");

        let input: CreateSphereRequest =
            validate::parse(json!({"name": "Ball", "align": "view"})).unwrap();
        assert_eq!(input.align, "VIEW");
        assert_eq!((input.segments, input.ring_count), (32, 16));
        assert!(input.calc_uvs);
    }

    #[test]
    fn test_cylinder_vertex_limit() {
        let err = validate::parse::<CreateCylinderRequest>(json!({"name": "Pipe", "vertices": 257}))
            .unwrap_err();
        assert_eq!(err, "vertices must be between 3 and 256");
    }

    #[test]
    fn test_earlier_field_reported_before_later_shape_error() {
        // Key order in the JSON text does not matter, declaration order does
        let err = validate::parse::<CreateCubeRequest>(json!({"size": "big", "name": "a/b"}))
            .unwrap_err();
        assert_eq!(err, r#"Name cannot contain: /, \, :, *, ?, ", <, >, |"#);

        let err = validate::parse::<CreateCubeRequest>(json!({"name": "Box", "size": "big"}))
            .unwrap_err();
        assert_eq!(err, r#"size: invalid type: string "big", expected f64"#);

        let err = validate::parse::<CreateCylinderRequest>(
            json!({"name": "Pipe", "vertices": "many", "radius": -1.0}),
        )
        .unwrap_err();
        assert_eq!(err, "radius must be greater than 0.001");
    }
}
