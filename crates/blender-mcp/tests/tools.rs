//! End-to-end tool behaviour against the in-memory scene

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use blender_mcp::error::ToolOutcome;
use blender_mcp::registry::registry;
use blender_mcp::state::HostHandle;
use blender_mcp::BlenderMcpService;
use blender_mcp_core::{
    HostResult, LightType, MemoryScene, ObjectInfo, PrimitiveSpec, RenderSettings, SceneHost,
    TransformUpdate, Vector3,
};
use approx::assert_relative_eq;
use serde_json::{Value, json};

/// Forwards to a [`MemoryScene`] and counts every host call
#[derive(Default)]
struct CountingHost {
    inner: MemoryScene,
    calls: Arc<AtomicUsize>,
}

impl CountingHost {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl SceneHost for CountingHost {
    fn add_primitive(&mut self, spec: PrimitiveSpec) -> HostResult<String> {
        self.tick();
        self.inner.add_primitive(spec)
    }

    fn add_camera(&mut self, name: &str, location: Vector3, rotation: Vector3) -> HostResult<String> {
        self.tick();
        self.inner.add_camera(name, location, rotation)
    }

    fn add_light(
        &mut self,
        name: &str,
        light_type: LightType,
        location: Vector3,
        energy: f64,
    ) -> HostResult<String> {
        self.tick();
        self.inner.add_light(name, light_type, location, energy)
    }

    fn object(&self, name: &str) -> HostResult<Option<ObjectInfo>> {
        self.tick();
        self.inner.object(name)
    }

    fn objects(&self) -> HostResult<Vec<ObjectInfo>> {
        self.tick();
        self.inner.objects()
    }

    fn set_transform(&mut self, name: &str, update: TransformUpdate) -> HostResult<()> {
        self.tick();
        self.inner.set_transform(name, update)
    }

    fn select_object(&mut self, name: &str, exclusive: bool) -> HostResult<()> {
        self.tick();
        self.inner.select_object(name, exclusive)
    }

    fn remove_object(&mut self, name: &str) -> HostResult<()> {
        self.tick();
        self.inner.remove_object(name)
    }

    fn duplicate_object(
        &mut self,
        name: &str,
        new_name: &str,
        location: Option<Vector3>,
    ) -> HostResult<String> {
        self.tick();
        self.inner.duplicate_object(name, new_name, location)
    }

    fn clear_objects(&mut self) -> HostResult<usize> {
        self.tick();
        self.inner.clear_objects()
    }

    fn material_exists(&self, name: &str) -> HostResult<bool> {
        self.tick();
        self.inner.material_exists(name)
    }

    fn create_material(&mut self, name: &str, color: Vector3) -> HostResult<()> {
        self.tick();
        self.inner.create_material(name, color)
    }

    fn assign_material(&mut self, object: &str, material: &str) -> HostResult<()> {
        self.tick();
        self.inner.assign_material(object, material)
    }

    fn set_active_camera(&mut self, name: &str) -> HostResult<()> {
        self.tick();
        self.inner.set_active_camera(name)
    }

    fn active_camera(&self) -> HostResult<Option<String>> {
        self.tick();
        self.inner.active_camera()
    }

    fn render(&mut self, settings: &RenderSettings) -> HostResult<()> {
        self.tick();
        self.inner.render(settings)
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        self.tick();
        self.inner.save_document(path)
    }

    fn open_document(&mut self, path: &Path) -> HostResult<()> {
        self.tick();
        self.inner.open_document(path)
    }

    fn document_path(&self) -> HostResult<Option<PathBuf>> {
        self.tick();
        self.inner.document_path()
    }
}

fn run(host: &mut dyn SceneHost, tool: &str, arguments: Value) -> String {
    registry()
        .invoke(tool, host, arguments)
        .expect("tool is registered")
        .into_message()
}

#[test]
fn test_constraint_violation_never_reaches_host() {
    let mut host = CountingHost::default();

    let message = run(&mut host, "create_cube", json!({"name": "ok", "size": 0.0}));
    assert_eq!(message, "Error: size must be greater than 0.001");
    assert_eq!(host.calls(), 0);

    let message = run(&mut host, "create_cube", json!({"name": "bad/name"}));
    assert!(message.starts_with("Error: Name cannot contain:"));
    assert_eq!(host.calls(), 0);

    // Shape errors are reported the same way
    let message = run(&mut host, "create_cube", json!({"size": 1.0}));
    assert!(message.starts_with("Error: "), "{message}");
    assert!(message.contains("name"), "{message}");
    let message = run(&mut host, "move_object", json!({"name": "A", "location": [1, 2]}));
    assert!(message.starts_with("Error: "), "{message}");
    assert_eq!(host.calls(), 0);

    // Fail-fast: the first violated field wins
    let message = run(
        &mut host,
        "create_cylinder",
        json!({"name": "Pipe", "radius": 0.0, "depth": 0.0, "vertices": 1}),
    );
    assert_eq!(message, "Error: radius must be greater than 0.001");
    assert_eq!(host.calls(), 0);
}

#[test]
fn test_valid_call_invokes_host() {
    let mut host = CountingHost::default();
    let message = run(&mut host, "create_cube", json!({"name": "  Crate  ", "size": 1.5}));
    assert_eq!(
        message,
        "Successfully created cube 'Crate' with size 1.5 at location (0.0, 0.0, 0.0)"
    );
    assert_eq!(host.calls(), 1);
}

#[test]
fn test_sphere_defaults() {
    let mut scene = MemoryScene::new();
    let message = run(&mut scene, "create_sphere", json!({"name": "Ball"}));
    assert_eq!(
        message,
        "Successfully created sphere 'Ball' with radius 1.0 (segments=32, rings=16) at location (0.0, 0.0, 0.0)"
    );

    let info = run(&mut scene, "get_object_info", json!({"name": "Ball"}));
    assert!(info.contains("Vertices: 482"), "{info}");
    assert!(info.contains("Faces: 512"), "{info}");
}

#[test]
fn test_list_objects_empty_then_one() {
    let mut scene = MemoryScene::new();
    assert_eq!(
        run(&mut scene, "list_objects", json!({})),
        "Scene is empty - no objects found"
    );

    run(&mut scene, "create_cube", json!({"name": "A"}));
    let listing = run(&mut scene, "list_objects", json!({}));
    assert!(listing.contains("Found 1 object(s)"), "{listing}");
    assert!(listing.contains("  - A (MESH) at location (0.0, 0.0, 0.0)"), "{listing}");
}

#[test]
fn test_missing_object_short_circuits() {
    let mut host = CountingHost::default();
    let message = run(
        &mut host,
        "move_object",
        json!({"name": "Ghost", "location": [1, 2, 3]}),
    );
    assert_eq!(message, "Error: Object 'Ghost' not found");
    // Only the lookup ran
    assert_eq!(host.calls(), 1);
    assert!(host.inner.is_empty());
}

#[test]
fn test_render_requires_active_camera() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");
    let filepath = output.display().to_string();
    let mut scene = MemoryScene::new();

    run(&mut scene, "create_cube", json!({"name": "Subject"}));
    let message = run(&mut scene, "render_scene", json!({"filepath": filepath}));
    assert!(message.contains("No active camera"), "{message}");
    assert!(message.starts_with("Error [Render Scene]: "), "{message}");
    assert!(!output.exists());

    run(
        &mut scene,
        "create_camera",
        json!({"name": "Cam", "location": [0.0, 0.0, 10.0]}),
    );
    assert_eq!(
        run(&mut scene, "set_active_camera", json!({"camera_name": "Cam"})),
        "Successfully set 'Cam' as active camera"
    );

    let message = run(
        &mut scene,
        "render_scene",
        json!({"filepath": filepath, "resolution_x": 64, "resolution_y": 48}),
    );
    assert_eq!(
        message,
        format!("Successfully rendered scene to '{filepath}' at resolution 64x48")
    );
    let image = image_dimensions(&output);
    assert_eq!(image, (64, 48));
}

fn image_dimensions(path: &Path) -> (u32, u32) {
    let bytes = std::fs::read(path).unwrap();
    // PNG IHDR: width and height are big-endian u32 at offsets 16 and 20
    let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    (width, height)
}

#[test]
fn test_declaration_order_beats_json_key_order() {
    let mut host = CountingHost::default();

    let message = run(&mut host, "create_cube", json!({"name": "a/b", "size": "big"}));
    assert_eq!(message, r#"Error: Name cannot contain: /, \, :, *, ?, ", <, >, |"#);

    let message = run(&mut host, "create_cube", json!({"size": "big", "name": "ok"}));
    assert_eq!(message, r#"Error: size: invalid type: string "big", expected f64"#);

    let message = run(
        &mut host,
        "create_light",
        json!({"energy": "bright", "light_type": "laser", "name": "Key"}),
    );
    assert_eq!(message, "Error: Light type must be one of: SUN, POINT, SPOT, AREA");
    assert_eq!(host.calls(), 0);
}

#[test]
fn test_detached_file_tools_report_unavailable_first() {
    const UNAVAILABLE: &str = "Error: bpy module not found. Tool must run in Blender environment.";
    let dir = tempfile::tempdir().unwrap();
    let mut host = blender_mcp_core::DetachedHost;

    let missing = dir.path().join("missing.blend").display().to_string();
    assert_eq!(run(&mut host, "open_file", json!({"filepath": missing})), UNAVAILABLE);

    let nested = dir.path().join("fresh").join("scene.blend").display().to_string();
    assert_eq!(run(&mut host, "save_file", json!({"filepath": nested})), UNAVAILABLE);
    assert!(!dir.path().join("fresh").exists());
}

#[test]
fn test_unavailable_host_message() {
    let mut host = blender_mcp_core::DetachedHost;
    for (tool, args) in [
        ("create_cube", json!({"name": "Cube"})),
        ("list_objects", json!({})),
        ("move_object", json!({"name": "Cube", "location": [0, 0, 0]})),
        ("get_scene_filepath", json!({})),
    ] {
        assert_eq!(
            run(&mut host, tool, args),
            "Error: bpy module not found. Tool must run in Blender environment.",
            "{tool}"
        );
    }
}

#[test]
fn test_document_round_trip_through_tools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects").join("scene.blend");
    let filepath = path.display().to_string();

    let mut scene = MemoryScene::new();
    run(&mut scene, "create_plane", json!({"name": "Floor", "size": 10.0}));
    run(&mut scene, "create_material", json!({"name": "Concrete", "color": [0.5, 0.5, 0.5]}));
    assert_eq!(
        run(
            &mut scene,
            "assign_material",
            json!({"object_name": "Floor", "material_name": "Concrete"})
        ),
        "Successfully assigned material 'Concrete' to object 'Floor'"
    );
    assert_eq!(
        run(&mut scene, "save_file", json!({"filepath": format!("  {filepath} ")})),
        format!("Successfully saved Blender file to '{filepath}'")
    );

    let mut reopened = MemoryScene::new();
    assert_eq!(
        run(&mut reopened, "open_file", json!({"filepath": filepath})),
        format!("Successfully opened Blender file '{filepath}'")
    );
    let listing = run(&mut reopened, "list_objects", json!({}));
    assert!(listing.contains("Floor (MESH)"), "{listing}");
    assert_eq!(
        run(&mut reopened, "get_scene_filepath", json!({})),
        format!("Current Blender file: {filepath}")
    );
}

#[test]
fn test_transform_tools() {
    let mut scene = MemoryScene::new();
    run(&mut scene, "create_cube", json!({"name": "Box"}));

    assert_eq!(
        run(&mut scene, "rotate_object", json!({"name": "Box", "rotation": [0.0, 0.0, 1.5]})),
        "Successfully rotated object 'Box' to rotation (0.0, 0.0, 1.5)"
    );
    let rotation = scene.object("Box").unwrap().unwrap().rotation;
    assert_relative_eq!(rotation.0[2], 1.5);
    assert_eq!(
        run(&mut scene, "rotate_object", json!({"name": "Box", "rotation": [0.0, 0.0, 7.0]})),
        "Error: Rotation values should be within ±2π radians (approximately ±360 degrees)"
    );
    assert_eq!(
        run(&mut scene, "scale_object", json!({"name": "Box", "scale": [2, 2, 2]})),
        "Successfully scaled object 'Box' to scale (2.0, 2.0, 2.0)"
    );
    assert_eq!(
        run(&mut scene, "select_object", json!({"name": "Box"})),
        "Successfully selected object 'Box'"
    );
    assert_eq!(
        run(&mut scene, "duplicate_object", json!({"name": "Box", "new_name": "Box"})),
        "Successfully duplicated object 'Box' as 'Box.001'"
    );
    assert_eq!(
        run(&mut scene, "delete_object", json!({"name": "Box"})),
        "Successfully deleted object 'Box'"
    );
    assert_eq!(
        run(&mut scene, "clear_scene", json!({})),
        "Successfully cleared scene - removed 1 object(s)"
    );
}

#[test]
fn test_outcomes_are_tagged() {
    let mut scene = MemoryScene::new();
    let outcome = registry()
        .invoke("delete_object", &mut scene, json!({"name": "Nope"}))
        .unwrap();
    assert!(matches!(outcome, ToolOutcome::Failure(_)));
    assert!(registry().invoke("no_such_tool", &mut scene, json!({})).is_none());
}

#[tokio::test]
async fn test_service_answers_through_host_thread() {
    let service = BlenderMcpService::new(HostHandle::spawn(|| Box::new(MemoryScene::new())).unwrap());

    let message = service
        .call("create_light", json!({"name": "Sun", "light_type": "sun"}))
        .await
        .unwrap();
    assert_eq!(
        message,
        "Successfully created SUN light 'Sun' at location (0.0, 0.0, 10.0) with energy 1.0"
    );

    let err = service.call("teleport_object", json!({})).await.unwrap_err();
    assert!(err.message.contains("teleport_object"));

    let tools = BlenderMcpService::tools();
    assert_eq!(tools.len(), registry().len());
    assert!(tools.iter().any(|t| t.name == "render_scene"));
}
