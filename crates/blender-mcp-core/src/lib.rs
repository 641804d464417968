//! # Blender MCP Core
//!
//! The scene-host side of the Blender MCP server.
//!
//! Tool handlers never touch Blender directly. They talk to a [`SceneHost`],
//! which exposes the handful of object-model operations the tools need:
//! adding primitives, cameras and lights, transforming and selecting objects,
//! materials, rendering and document IO.
//!
//! Two hosts ship with this crate:
//!
//! - [`MemoryScene`]: a complete headless scene. Renders are rasterized
//!   previews and documents are JSON.
//! - [`DetachedHost`]: the host used when no application is reachable. Every
//!   call reports [`HostError::Unavailable`].
//!
//! ## Conventions
//!
//! - **Distances**: Blender units (meters)
//! - **Angles**: Euler XYZ in **radians**
//! - **Coordinate system**: Right-handed, Z-up
//! - **Names**: unique per scene, suffixed `.001`, `.002`, ... on collision

pub mod host;
pub mod memory;
pub mod preview;
pub mod vector;

mod error;

pub use error::{HostError, HostResult};
pub use host::{
    Alignment, DetachedHost, LightType, MeshStats, ObjectInfo, ObjectType, Primitive,
    PrimitiveSpec, RenderSettings, SceneHost, TransformUpdate,
};
pub use memory::MemoryScene;
pub use vector::Vector3;
