//! Headless preview rasterizer
//!
//! Produces a quick still of a [`MemoryScene`](crate::MemoryScene) from its
//! active camera. Every mesh is drawn as a shaded disc sized by its bounding
//! radius, which is enough to check framing and placement without a GPU.

use std::path::Path;

use glam::{DQuat, DVec3, EulerRot};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::HostResult;
use crate::vector::Vector3;

/// Background shade (linear, 0-1)
const BACKGROUND: [f64; 3] = [0.05, 0.05, 0.05];

/// Light that reaches every surface regardless of scene lights
const AMBIENT: f64 = 0.25;

/// Objects closer than this to the lens are clipped
const NEAR_CLIP: f64 = 0.01;

/// A pinhole camera using Blender conventions
///
/// The camera looks down its local -Z axis with +Y up. Rotation is XYZ Euler
/// in radians, applied X first.
#[derive(Debug, Clone)]
pub struct PreviewCamera {
    /// Camera position in world space
    pub position: DVec3,
    /// Camera orientation in world space
    pub orientation: DQuat,
    /// Lens focal length in millimetres
    pub focal_length_mm: f64,
    /// Sensor width in millimetres, fitted to the larger image dimension
    pub sensor_width_mm: f64,
}

impl PreviewCamera {
    /// Create a camera from an object's location and Euler rotation
    pub fn from_transform(location: Vector3, rotation: Vector3) -> Self {
        Self {
            position: location.to_dvec3(),
            orientation: DQuat::from_euler(EulerRot::ZYX, rotation.z(), rotation.y(), rotation.x()),
            focal_length_mm: 50.0,
            sensor_width_mm: 36.0,
        }
    }

    /// Transform a world-space point into camera space
    pub fn to_view(&self, point: DVec3) -> DVec3 {
        self.orientation.inverse() * (point - self.position)
    }

    /// Focal length expressed in pixels for an image of the given size
    pub fn focal_px(&self, width: u32, height: u32) -> f64 {
        self.focal_length_mm / self.sensor_width_mm * f64::from(width.max(height))
    }

    /// Project a world-space point to pixel coordinates
    ///
    /// Returns `(x, y, depth)` or `None` when the point is behind the lens.
    pub fn project(&self, point: DVec3, width: u32, height: u32) -> Option<(f64, f64, f64)> {
        let view = self.to_view(point);
        let depth = -view.z;
        if depth < NEAR_CLIP {
            return None;
        }

        let focal = self.focal_px(width, height);
        let x = f64::from(width) * 0.5 + view.x / depth * focal;
        let y = f64::from(height) * 0.5 - view.y / depth * focal;
        Some((x, y, depth))
    }
}

/// A world-space disc to draw
#[derive(Debug, Clone)]
pub struct Splat {
    pub center: Vector3,
    pub radius: f64,
    /// Linear RGB base color
    pub color: Vector3,
}

/// Rasterize `splats` as seen from `camera`
///
/// `light_energy` is the summed energy of the scene lights. Zero leaves only
/// ambient shading.
pub fn rasterize(
    camera: &PreviewCamera,
    splats: &[Splat],
    light_energy: f64,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, to_rgb8(BACKGROUND));
    let focal = camera.focal_px(width, height);
    let direct = 1.0 - (-light_energy.max(0.0)).exp();

    let mut projected: Vec<(f64, f64, f64, f64, &Splat)> = splats
        .iter()
        .filter_map(|splat| {
            let (x, y, depth) = camera.project(splat.center.to_dvec3(), width, height)?;
            let radius_px = splat.radius / depth * focal;
            Some((x, y, depth, radius_px, splat))
        })
        .collect();

    // Painter's algorithm: far to near
    projected.sort_by(|a, b| b.2.total_cmp(&a.2));

    for (cx, cy, _, radius, splat) in projected {
        if radius < 0.5 {
            continue;
        }
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = (cx + radius).ceil().min(f64::from(width)) as u32;
        let y1 = (cy + radius).ceil().min(f64::from(height)) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = (f64::from(px) + 0.5 - cx) / radius;
                let dy = (f64::from(py) + 0.5 - cy) / radius;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 {
                    continue;
                }
                // Facing ratio of a sphere at this pixel
                let facing = (1.0 - d2).sqrt();
                let shade = (AMBIENT + (1.0 - AMBIENT) * direct * facing).min(1.0);
                let c = splat.color.0;
                image.put_pixel(px, py, to_rgb8([c[0] * shade, c[1] * shade, c[2] * shade]));
            }
        }
    }

    image
}

/// Encode `image` to `path`, choosing the format from the extension
///
/// OpenEXR output is written as 32-bit float RGB.
pub fn write_image(image: RgbImage, path: &Path) -> HostResult<()> {
    let format = ImageFormat::from_path(path)?;
    let image = DynamicImage::ImageRgb8(image);

    if format == ImageFormat::OpenExr {
        DynamicImage::ImageRgb32F(image.to_rgb32f()).save_with_format(path, format)?;
    } else {
        image.save_with_format(path, format)?;
    }
    Ok(())
}

fn to_rgb8(color: [f64; 3]) -> Rgb<u8> {
    Rgb(color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}
