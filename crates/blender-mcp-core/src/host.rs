//! The scene host capability
//!
//! [`SceneHost`] is the narrow interface tool handlers use to reach the 3D
//! application's object model. There is one method per operation family. Hosts
//! own all scene state: callers keep no mirror of it and re-read live state on
//! every call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};
use crate::vector::Vector3;

/// Kind of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectType {
    Mesh,
    Camera,
    Light,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mesh => "MESH",
            Self::Camera => "CAMERA",
            Self::Light => "LIGHT",
        };
        write!(f, "{name}")
    }
}

/// Light source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightType {
    /// Directional light, position does not matter
    Sun,
    /// Omnidirectional light bulb
    Point,
    /// Cone-shaped spotlight
    Spot,
    /// Rectangular emitter
    Area,
}

impl LightType {
    /// Parse a light type, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUN" => Some(Self::Sun),
            "POINT" => Some(Self::Point),
            "SPOT" => Some(Self::Spot),
            "AREA" => Some(Self::Area),
            _ => None,
        }
    }

    /// Canonical names in declaration order
    pub fn all_names() -> &'static [&'static str] {
        &["SUN", "POINT", "SPOT", "AREA"]
    }
}

impl std::fmt::Display for LightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sun => "SUN",
            Self::Point => "POINT",
            Self::Spot => "SPOT",
            Self::Area => "AREA",
        };
        write!(f, "{name}")
    }
}

/// Orientation a newly added object is aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    #[default]
    World,
    View,
    Cursor,
}

impl Alignment {
    /// Parse an alignment mode, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "WORLD" => Some(Self::World),
            "VIEW" => Some(Self::View),
            "CURSOR" => Some(Self::Cursor),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["WORLD", "VIEW", "CURSOR"]
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::World => "WORLD",
            Self::View => "VIEW",
            Self::Cursor => "CURSOR",
        };
        write!(f, "{name}")
    }
}

/// Mesh primitive shapes and their construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
pub enum Primitive {
    Cube {
        size: f64,
    },
    UvSphere {
        segments: u32,
        ring_count: u32,
        radius: f64,
        calc_uvs: bool,
    },
    Cylinder {
        radius: f64,
        depth: f64,
        vertices: u32,
    },
    Plane {
        size: f64,
    },
}

impl Primitive {
    /// Vertex and face counts of the generated mesh
    pub fn topology(&self) -> MeshStats {
        match *self {
            Self::Cube { .. } => MeshStats { vertices: 8, faces: 6 },
            Self::Plane { .. } => MeshStats { vertices: 4, faces: 1 },
            // n-gon caps
            Self::Cylinder { vertices, .. } => MeshStats {
                vertices: 2 * vertices as usize,
                faces: vertices as usize + 2,
            },
            // Triangle fans at both poles
            Self::UvSphere {
                segments,
                ring_count,
                ..
            } => MeshStats {
                vertices: segments as usize * (ring_count as usize - 1) + 2,
                faces: segments as usize * ring_count as usize,
            },
        }
    }

    /// Radius of a sphere enclosing the unscaled primitive
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Self::Cube { size } => size * 0.5 * 3.0_f64.sqrt(),
            Self::Plane { size } => size * 0.5 * 2.0_f64.sqrt(),
            Self::UvSphere { radius, .. } => radius,
            Self::Cylinder { radius, depth, .. } => radius.hypot(depth * 0.5),
        }
    }
}

/// Mesh topology counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshStats {
    pub vertices: usize,
    pub faces: usize,
}

/// Everything needed to add a mesh primitive to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSpec {
    /// Requested object name (the host may suffix it to keep names unique)
    pub name: String,
    pub primitive: Primitive,
    pub location: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
    pub align: Alignment,
    pub enter_editmode: bool,
}

impl PrimitiveSpec {
    /// A primitive at `location` with identity rotation and unit scale
    pub fn new(name: impl Into<String>, primitive: Primitive, location: Vector3) -> Self {
        Self {
            name: name.into(),
            primitive,
            location,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            align: Alignment::World,
            enter_editmode: false,
        }
    }
}

/// Read-only snapshot of one scene object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    pub object_type: ObjectType,
    pub location: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
    /// Present for mesh objects
    pub mesh: Option<MeshStats>,
    /// Material in the first slot, if any
    pub material: Option<String>,
}

/// A single transform channel to overwrite
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformUpdate {
    Location(Vector3),
    /// Euler XYZ, radians
    Rotation(Vector3),
    Scale(Vector3),
}

/// Output settings for a still render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub filepath: PathBuf,
    pub resolution_x: u32,
    pub resolution_y: u32,
}

/// The host application's object model
///
/// Implementations must not cache state across calls on behalf of callers.
/// A host that cannot reach its backing application at all reports
/// [`HostError::Unavailable`] from every method.
pub trait SceneHost {
    /// Add a mesh primitive; returns the name actually assigned
    fn add_primitive(&mut self, spec: PrimitiveSpec) -> HostResult<String>;

    /// Add a camera; returns the name actually assigned
    fn add_camera(&mut self, name: &str, location: Vector3, rotation: Vector3)
    -> HostResult<String>;

    /// Add a light; returns the name actually assigned
    fn add_light(
        &mut self,
        name: &str,
        light_type: LightType,
        location: Vector3,
        energy: f64,
    ) -> HostResult<String>;

    /// Look up one object by exact name
    fn object(&self, name: &str) -> HostResult<Option<ObjectInfo>>;

    /// All objects, ordered by name
    fn objects(&self) -> HostResult<Vec<ObjectInfo>>;

    fn set_transform(&mut self, name: &str, update: TransformUpdate) -> HostResult<()>;

    /// Select `name` and make it the active object
    ///
    /// With `exclusive`, every other object is deselected first.
    fn select_object(&mut self, name: &str, exclusive: bool) -> HostResult<()>;

    fn remove_object(&mut self, name: &str) -> HostResult<()>;

    /// Clone `name` as `new_name`; returns the name actually assigned
    fn duplicate_object(
        &mut self,
        name: &str,
        new_name: &str,
        location: Option<Vector3>,
    ) -> HostResult<String>;

    /// Remove every object; returns how many were removed
    fn clear_objects(&mut self) -> HostResult<usize>;

    fn material_exists(&self, name: &str) -> HostResult<bool>;

    /// Create a material with an opaque RGB base color
    fn create_material(&mut self, name: &str, color: Vector3) -> HostResult<()>;

    /// Put `material` in the first material slot of `object`
    fn assign_material(&mut self, object: &str, material: &str) -> HostResult<()>;

    fn set_active_camera(&mut self, name: &str) -> HostResult<()>;

    fn active_camera(&self) -> HostResult<Option<String>>;

    /// Render a still from the active camera and write it to disk
    fn render(&mut self, settings: &RenderSettings) -> HostResult<()>;

    /// Write the scene to `path`, creating missing parent directories
    fn save_document(&mut self, path: &Path) -> HostResult<()>;

    /// Replace the scene with the document at `path`
    ///
    /// A missing file is [`HostError::FileNotFound`].
    fn open_document(&mut self, path: &Path) -> HostResult<()>;

    /// Path of the current document, `None` while unsaved
    fn document_path(&self) -> HostResult<Option<PathBuf>>;
}

/// A host with no reachable application behind it
///
/// Every call fails with [`HostError::Unavailable`]. This is what the server
/// runs against when it is started outside of Blender.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl SceneHost for DetachedHost {
    fn add_primitive(&mut self, _spec: PrimitiveSpec) -> HostResult<String> {
        Err(HostError::Unavailable)
    }

    fn add_camera(
        &mut self,
        _name: &str,
        _location: Vector3,
        _rotation: Vector3,
    ) -> HostResult<String> {
        Err(HostError::Unavailable)
    }

    fn add_light(
        &mut self,
        _name: &str,
        _light_type: LightType,
        _location: Vector3,
        _energy: f64,
    ) -> HostResult<String> {
        Err(HostError::Unavailable)
    }

    fn object(&self, _name: &str) -> HostResult<Option<ObjectInfo>> {
        Err(HostError::Unavailable)
    }

    fn objects(&self) -> HostResult<Vec<ObjectInfo>> {
        Err(HostError::Unavailable)
    }

    fn set_transform(&mut self, _name: &str, _update: TransformUpdate) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn select_object(&mut self, _name: &str, _exclusive: bool) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn remove_object(&mut self, _name: &str) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn duplicate_object(
        &mut self,
        _name: &str,
        _new_name: &str,
        _location: Option<Vector3>,
    ) -> HostResult<String> {
        Err(HostError::Unavailable)
    }

    fn clear_objects(&mut self) -> HostResult<usize> {
        Err(HostError::Unavailable)
    }

    fn material_exists(&self, _name: &str) -> HostResult<bool> {
        Err(HostError::Unavailable)
    }

    fn create_material(&mut self, _name: &str, _color: Vector3) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn assign_material(&mut self, _object: &str, _material: &str) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn set_active_camera(&mut self, _name: &str) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn active_camera(&self) -> HostResult<Option<String>> {
        Err(HostError::Unavailable)
    }

    fn render(&mut self, _settings: &RenderSettings) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn save_document(&mut self, _path: &Path) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn open_document(&mut self, _path: &Path) -> HostResult<()> {
        Err(HostError::Unavailable)
    }

    fn document_path(&self) -> HostResult<Option<PathBuf>> {
        Err(HostError::Unavailable)
    }
}
