use crate::geometry::vector::{add, scale};
use nalgebra::Vector3;

/// Distance used by the pseudo-perspective divide, in scaled model units.
pub const FOCAL_LENGTH: f32 = 200.0;

/// Largest accepted scale. Line meshes are sampled `scale` times per segment,
/// so this also bounds the work per line.
pub const MAX_SCALE: f32 = 100_000.0;

/// Maps model-space positions to buffer pixel coordinates.
///
/// The mapping mirrors Y (screen space grows downward), scales uniformly by
/// `scale`, moves the origin to the logical canvas center and finally applies a
/// simple `FOCAL_LENGTH / (z + FOCAL_LENGTH)` divide. There is no camera,
/// frustum or near/far clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    /// Model units to pixels.
    scale: f32,
    /// Display canvas size; divided by `pixel_size` to get logical pixels.
    canvas_width: f32,
    canvas_height: f32,
    pixel_size: f32,
}

impl Projector {
    pub fn new(
        scale: f32,
        canvas_width: usize,
        canvas_height: usize,
        pixel_size: usize,
    ) -> Result<Self, String> {
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_SCALE {
            return Err(format!(
                "Scale factor must be in (0, {}], got {}",
                MAX_SCALE, scale
            ));
        }
        if pixel_size == 0 {
            return Err("Pixel size must be greater than 0".to_string());
        }
        Ok(Self {
            scale,
            canvas_width: canvas_width as f32,
            canvas_height: canvas_height as f32,
            pixel_size: pixel_size as f32,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Center of the logical (pixel-size adjusted) canvas, z = 0.
    pub fn canvas_center(&self) -> Vector3<f32> {
        Vector3::new(
            self.canvas_width / self.pixel_size / 2.0,
            self.canvas_height / self.pixel_size / 2.0,
            0.0,
        )
    }

    /// Projects one model-space position. The x/y components of the result are
    /// buffer pixel coordinates; z is the scaled depth.
    pub fn project(&self, position: &Vector3<f32>) -> Vector3<f32> {
        let mirrored = Vector3::new(position.x, -position.y, position.z);
        let scaled = scale(&mirrored, self.scale);
        let mut out = add(&scaled, &self.canvas_center());

        if out.z != 0.0 {
            let divisor = out.z + FOCAL_LENGTH;
            out.x = out.x * FOCAL_LENGTH / divisor;
            out.y = out.y * FOCAL_LENGTH / divisor;
        }
        out
    }
}
