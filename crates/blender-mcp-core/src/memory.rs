//! In-memory scene host
//!
//! [`MemoryScene`] implements [`SceneHost`] without a running Blender. It is
//! the headless backend of the server and the double used by tests. Naming
//! follows Blender: objects are listed by name, and a taken name gets a
//! `.001`, `.002`, ... suffix.
//!
//! Documents are written as JSON, not in Blender's binary format.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};
use crate::host::{
    LightType, ObjectInfo, ObjectType, Primitive, PrimitiveSpec, RenderSettings, SceneHost,
    TransformUpdate,
};
use crate::preview::{self, PreviewCamera, Splat};
use crate::vector::Vector3;

/// Document format version written by [`MemoryScene::save_document`]
const DOCUMENT_VERSION: u32 = 1;

/// Base color of a mesh with no material
const DEFAULT_SURFACE: Vector3 = Vector3::new(0.8, 0.8, 0.8);

/// Longest name Blender stores, in bytes
const MAX_NAME_LEN: usize = 63;

/// Type-specific object data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
enum ObjectData {
    Mesh {
        primitive: Primitive,
    },
    Camera,
    Light {
        light_type: LightType,
        energy: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SceneObject {
    name: String,
    data: ObjectData,
    location: Vector3,
    rotation: Vector3,
    scale: Vector3,
    #[serde(default)]
    materials: Vec<String>,
}

impl SceneObject {
    fn new(name: String, data: ObjectData, location: Vector3) -> Self {
        Self {
            name,
            data,
            location,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            materials: Vec::new(),
        }
    }

    fn object_type(&self) -> ObjectType {
        match self.data {
            ObjectData::Mesh { .. } => ObjectType::Mesh,
            ObjectData::Camera => ObjectType::Camera,
            ObjectData::Light { .. } => ObjectType::Light,
        }
    }

    fn info(&self) -> ObjectInfo {
        ObjectInfo {
            name: self.name.clone(),
            object_type: self.object_type(),
            location: self.location,
            rotation: self.rotation,
            scale: self.scale,
            mesh: match &self.data {
                ObjectData::Mesh { primitive } => Some(primitive.topology()),
                _ => None,
            },
            material: self.materials.first().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Material {
    name: String,
    /// Linear RGBA
    base_color: [f64; 4],
}

/// On-disk representation of a scene
#[derive(Debug, Serialize, Deserialize)]
struct SceneDocument {
    version: u32,
    objects: Vec<SceneObject>,
    materials: Vec<Material>,
    active_camera: Option<String>,
}

/// A complete scene held in memory
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: BTreeMap<String, SceneObject>,
    materials: BTreeMap<String, Material>,
    selected: BTreeSet<String>,
    active_object: Option<String>,
    active_camera: Option<String>,
    filepath: Option<PathBuf>,
    last_render: Option<RenderSettings>,
}

impl MemoryScene {
    /// Create an empty, unsaved scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the scene
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Names of the currently selected objects
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// The active (last selected) object
    pub fn active_object(&self) -> Option<&str> {
        self.active_object.as_deref()
    }

    /// Settings of the most recent successful render
    pub fn last_render(&self) -> Option<&RenderSettings> {
        self.last_render.as_ref()
    }

    /// Base color of a material, if it exists
    pub fn material_color(&self, name: &str) -> Option<Vector3> {
        self.materials.get(name).map(|m| {
            let [r, g, b, _] = m.base_color;
            Vector3::new(r, g, b)
        })
    }

    /// Pick a free object name, suffixing `.001`, `.002`, ... when taken
    fn unique_name(&self, requested: &str) -> String {
        if !self.objects.contains_key(requested) {
            return requested.to_string();
        }

        let base = truncate_name(requested, MAX_NAME_LEN - 4);
        (1..)
            .map(|i| format!("{base}.{i:03}"))
            .find(|candidate| !self.objects.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Insert a new object and make it the only selected, active object
    fn insert(&mut self, mut object: SceneObject) -> String {
        let name = self.unique_name(&object.name);
        object.name.clone_from(&name);
        tracing::debug!(name = %name, object_type = %object.object_type(), "Object added");
        self.objects.insert(name.clone(), object);
        self.selected.clear();
        self.selected.insert(name.clone());
        self.active_object = Some(name.clone());
        name
    }

    fn get_mut(&mut self, name: &str) -> HostResult<&mut SceneObject> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| HostError::ObjectNotFound(name.to_string()))
    }

    fn surface_color(&self, object: &SceneObject) -> Vector3 {
        object
            .materials
            .first()
            .and_then(|m| self.material_color(m))
            .unwrap_or(DEFAULT_SURFACE)
    }
}

impl SceneHost for MemoryScene {
    fn add_primitive(&mut self, spec: PrimitiveSpec) -> HostResult<String> {
        let mut object = SceneObject::new(
            spec.name,
            ObjectData::Mesh {
                primitive: spec.primitive,
            },
            spec.location,
        );
        object.rotation = spec.rotation;
        object.scale = spec.scale;
        Ok(self.insert(object))
    }

    fn add_camera(
        &mut self,
        name: &str,
        location: Vector3,
        rotation: Vector3,
    ) -> HostResult<String> {
        let mut object = SceneObject::new(name.to_string(), ObjectData::Camera, location);
        object.rotation = rotation;
        Ok(self.insert(object))
    }

    fn add_light(
        &mut self,
        name: &str,
        light_type: LightType,
        location: Vector3,
        energy: f64,
    ) -> HostResult<String> {
        let object = SceneObject::new(
            name.to_string(),
            ObjectData::Light { light_type, energy },
            location,
        );
        Ok(self.insert(object))
    }

    fn object(&self, name: &str) -> HostResult<Option<ObjectInfo>> {
        Ok(self.objects.get(name).map(SceneObject::info))
    }

    fn objects(&self) -> HostResult<Vec<ObjectInfo>> {
        Ok(self.objects.values().map(SceneObject::info).collect())
    }

    fn set_transform(&mut self, name: &str, update: TransformUpdate) -> HostResult<()> {
        let object = self.get_mut(name)?;
        match update {
            TransformUpdate::Location(v) => object.location = v,
            TransformUpdate::Rotation(v) => object.rotation = v,
            TransformUpdate::Scale(v) => object.scale = v,
        }
        Ok(())
    }

    fn select_object(&mut self, name: &str, exclusive: bool) -> HostResult<()> {
        if !self.objects.contains_key(name) {
            return Err(HostError::ObjectNotFound(name.to_string()));
        }
        if exclusive {
            self.selected.clear();
        }
        self.selected.insert(name.to_string());
        self.active_object = Some(name.to_string());
        Ok(())
    }

    fn remove_object(&mut self, name: &str) -> HostResult<()> {
        if self.objects.remove(name).is_none() {
            return Err(HostError::ObjectNotFound(name.to_string()));
        }
        self.selected.remove(name);
        if self.active_object.as_deref() == Some(name) {
            self.active_object = None;
        }
        if self.active_camera.as_deref() == Some(name) {
            self.active_camera = None;
        }
        Ok(())
    }

    fn duplicate_object(
        &mut self,
        name: &str,
        new_name: &str,
        location: Option<Vector3>,
    ) -> HostResult<String> {
        let mut copy = self
            .objects
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::ObjectNotFound(name.to_string()))?;
        copy.name = new_name.to_string();
        if let Some(location) = location {
            copy.location = location;
        }
        Ok(self.insert(copy))
    }

    fn clear_objects(&mut self) -> HostResult<usize> {
        let count = self.objects.len();
        self.objects.clear();
        self.selected.clear();
        self.active_object = None;
        self.active_camera = None;
        Ok(count)
    }

    fn material_exists(&self, name: &str) -> HostResult<bool> {
        Ok(self.materials.contains_key(name))
    }

    fn create_material(&mut self, name: &str, color: Vector3) -> HostResult<()> {
        if self.materials.contains_key(name) {
            return Err(HostError::MaterialExists(name.to_string()));
        }
        let [r, g, b] = color.0;
        self.materials.insert(
            name.to_string(),
            Material {
                name: name.to_string(),
                base_color: [r, g, b, 1.0],
            },
        );
        Ok(())
    }

    fn assign_material(&mut self, object: &str, material: &str) -> HostResult<()> {
        if !self.materials.contains_key(material) {
            return Err(HostError::MaterialNotFound(material.to_string()));
        }
        let target = self.get_mut(object)?;
        if !matches!(target.data, ObjectData::Mesh { .. }) {
            return Err(HostError::Unsupported(format!(
                "Object '{}' of type {} has no material slots",
                object,
                target.object_type()
            )));
        }
        match target.materials.first_mut() {
            Some(slot) => *slot = material.to_string(),
            None => target.materials.push(material.to_string()),
        }
        Ok(())
    }

    fn set_active_camera(&mut self, name: &str) -> HostResult<()> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| HostError::ObjectNotFound(name.to_string()))?;
        if object.object_type() != ObjectType::Camera {
            return Err(HostError::NotACamera {
                name: name.to_string(),
                object_type: object.object_type(),
            });
        }
        self.active_camera = Some(name.to_string());
        Ok(())
    }

    fn active_camera(&self) -> HostResult<Option<String>> {
        Ok(self.active_camera.clone())
    }

    fn render(&mut self, settings: &RenderSettings) -> HostResult<()> {
        let camera = self
            .active_camera
            .as_ref()
            .and_then(|name| self.objects.get(name))
            .ok_or(HostError::NoActiveCamera)?;
        let camera = PreviewCamera::from_transform(camera.location, camera.rotation);

        let mut light_energy = 0.0;
        let mut splats = Vec::new();
        for object in self.objects.values() {
            match &object.data {
                ObjectData::Mesh { primitive } => splats.push(Splat {
                    center: object.location,
                    radius: primitive.bounding_radius() * object.scale.max_element(),
                    color: self.surface_color(object),
                }),
                ObjectData::Light { energy, .. } => light_energy += energy,
                ObjectData::Camera => {}
            }
        }

        let image = preview::rasterize(
            &camera,
            &splats,
            light_energy,
            settings.resolution_x,
            settings.resolution_y,
        );

        create_parent_dirs(&settings.filepath)?;
        preview::write_image(image, &settings.filepath)?;

        tracing::info!(
            path = %settings.filepath.display(),
            width = settings.resolution_x,
            height = settings.resolution_y,
            meshes = splats.len(),
            "Rendered preview"
        );
        self.last_render = Some(settings.clone());
        Ok(())
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        let document = SceneDocument {
            version: DOCUMENT_VERSION,
            objects: self.objects.values().cloned().collect(),
            materials: self.materials.values().cloned().collect(),
            active_camera: self.active_camera.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        create_parent_dirs(path)?;
        fs::write(path, json)?;
        self.filepath = Some(path.to_path_buf());
        Ok(())
    }

    fn open_document(&mut self, path: &Path) -> HostResult<()> {
        if !path.exists() {
            return Err(HostError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let document: SceneDocument = serde_json::from_str(&contents)?;
        if document.version > DOCUMENT_VERSION {
            return Err(HostError::Unsupported(format!(
                "Scene document version {} is newer than supported version {}",
                document.version, DOCUMENT_VERSION
            )));
        }

        *self = Self {
            objects: document
                .objects
                .into_iter()
                .map(|o| (o.name.clone(), o))
                .collect(),
            materials: document
                .materials
                .into_iter()
                .map(|m| (m.name.clone(), m))
                .collect(),
            active_camera: document.active_camera,
            filepath: Some(path.to_path_buf()),
            ..Self::default()
        };
        Ok(())
    }

    fn document_path(&self) -> HostResult<Option<PathBuf>> {
        Ok(self.filepath.clone())
    }
}

fn create_parent_dirs(path: &Path) -> HostResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

/// Cut `name` to at most `max` bytes on a char boundary
fn truncate_name(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(name: &str) -> PrimitiveSpec {
        PrimitiveSpec::new(name, Primitive::Cube { size: 2.0 }, Vector3::ZERO)
    }

    #[test]
    fn test_taken_names_get_numeric_suffix() {
        let mut scene = MemoryScene::new();
        assert_eq!(scene.add_primitive(cube("Cube")).unwrap(), "Cube");
        assert_eq!(scene.add_primitive(cube("Cube")).unwrap(), "Cube.001");
        assert_eq!(scene.add_primitive(cube("Cube")).unwrap(), "Cube.002");
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_new_object_becomes_only_selection() {
        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("A")).unwrap();
        scene.add_primitive(cube("B")).unwrap();
        assert_eq!(scene.selected().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(scene.active_object(), Some("B"));

        scene.select_object("A", false).unwrap();
        assert_eq!(scene.selected().collect::<Vec<_>>(), vec!["A", "B"]);

        scene.select_object("A", true).unwrap();
        assert_eq!(scene.selected().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_duplicate_copies_materials_and_moves() {
        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("Crate")).unwrap();
        scene.create_material("Wood", Vector3::new(0.4, 0.2, 0.1)).unwrap();
        scene.assign_material("Crate", "Wood").unwrap();

        let name = scene
            .duplicate_object("Crate", "Crate2", Some(Vector3::new(3.0, 0.0, 0.0)))
            .unwrap();
        let copy = scene.object(&name).unwrap().unwrap();
        assert_eq!(copy.location, Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(copy.material.as_deref(), Some("Wood"));
        assert_eq!(scene.active_object(), Some("Crate2"));
    }

    #[test]
    fn test_assign_material_replaces_first_slot() {
        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("Box")).unwrap();
        scene.create_material("Red", Vector3::new(1.0, 0.0, 0.0)).unwrap();
        scene.create_material("Blue", Vector3::new(0.0, 0.0, 1.0)).unwrap();

        scene.assign_material("Box", "Red").unwrap();
        scene.assign_material("Box", "Blue").unwrap();
        let info = scene.object("Box").unwrap().unwrap();
        assert_eq!(info.material.as_deref(), Some("Blue"));
    }

    #[test]
    fn test_cameras_have_no_material_slots() {
        let mut scene = MemoryScene::new();
        scene.add_camera("Cam", Vector3::ZERO, Vector3::ZERO).unwrap();
        scene.create_material("Red", Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            scene.assign_material("Cam", "Red"),
            Err(HostError::Unsupported(_))
        ));
    }

    #[test]
    fn test_removing_active_camera_clears_it() {
        let mut scene = MemoryScene::new();
        scene.add_camera("Cam", Vector3::ZERO, Vector3::ZERO).unwrap();
        scene.set_active_camera("Cam").unwrap();
        scene.remove_object("Cam").unwrap();
        assert_eq!(scene.active_camera().unwrap(), None);
    }

    #[test]
    fn test_set_active_camera_rejects_meshes() {
        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("Cube")).unwrap();
        let err = scene.set_active_camera("Cube").unwrap_err();
        assert_eq!(err.to_string(), "Object 'Cube' is not a camera (type: MESH)");
    }

    #[test]
    fn test_document_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.blend");

        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("Cube")).unwrap();
        scene.add_light("Sun", LightType::Sun, Vector3::new(0.0, 0.0, 10.0), 3.0).unwrap();
        scene.add_camera("Cam", Vector3::new(0.0, -10.0, 2.0), Vector3::ZERO).unwrap();
        scene.set_active_camera("Cam").unwrap();
        scene.create_material("Red", Vector3::new(1.0, 0.0, 0.0)).unwrap();
        scene.assign_material("Cube", "Red").unwrap();
        scene.save_document(&path).unwrap();
        assert_eq!(scene.document_path().unwrap(), Some(path.clone()));

        let mut loaded = MemoryScene::new();
        loaded.open_document(&path).unwrap();
        assert_eq!(loaded.objects().unwrap(), scene.objects().unwrap());
        assert_eq!(loaded.active_camera().unwrap().as_deref(), Some("Cam"));
        assert_eq!(loaded.material_color("Red"), Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("scene.blend");
        let mut scene = MemoryScene::new();
        scene.save_document(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_open_missing_document() {
        let mut scene = MemoryScene::new();
        let err = scene
            .open_document(Path::new("/definitely/not/here.blend"))
            .unwrap_err();
        assert!(matches!(err, HostError::FileNotFound(_)));
    }

    #[test]
    fn test_render_writes_image_of_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renders").join("out.png");

        let mut scene = MemoryScene::new();
        scene.add_primitive(cube("Cube")).unwrap();
        assert!(matches!(
            scene.render(&RenderSettings {
                filepath: path.clone(),
                resolution_x: 32,
                resolution_y: 24,
            }),
            Err(HostError::NoActiveCamera)
        ));

        scene
            .add_camera("Cam", Vector3::new(0.0, 0.0, 10.0), Vector3::ZERO)
            .unwrap();
        scene.set_active_camera("Cam").unwrap();
        let settings = RenderSettings {
            filepath: path.clone(),
            resolution_x: 32,
            resolution_y: 24,
        };
        scene.render(&settings).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (32, 24));
        assert_eq!(scene.last_render(), Some(&settings));
    }

    #[test]
    fn test_unique_name_respects_length_limit() {
        let mut scene = MemoryScene::new();
        let long = "x".repeat(63);
        scene.add_primitive(cube(&long)).unwrap();
        let second = scene.add_primitive(cube(&long)).unwrap();
        assert!(second.len() <= MAX_NAME_LEN);
        assert!(second.ends_with(".001"));
    }
}
