use crate::core::frame_buffer::FrameBuffer;
use crate::geometry::vector::{EPSILON, lerp, mad, scale, signed_triangle_area};
use crate::utils::color_utils::{Color, color_to_rgba8};
use log::{debug, warn};
use nalgebra::Vector2;

// ===== Geometric helpers =====

/// Rotational order of three points, from the sign of their signed area.
///
/// "Counter-clockwise" follows the y-up convention of
/// [`signed_triangle_area`]; in y-down buffer space it looks clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear = 0,
    CounterClockwise = 1,
    Clockwise = 2,
}

pub fn orientation(a: &Vector2<f32>, b: &Vector2<f32>, c: &Vector2<f32>) -> Orientation {
    let area = signed_triangle_area(a, b, c);
    if area == 0.0 {
        Orientation::Collinear
    } else if area > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Inclusive integer pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl BoundingBox {
    /// `floor(min) ..= ceil(max)` on both axes. `None` if a vertex is not a
    /// usable pixel coordinate.
    pub fn of_triangle(a: &Vector2<f32>, b: &Vector2<f32>, c: &Vector2<f32>) -> Option<Self> {
        Some(BoundingBox {
            min_x: to_pixel_coordinate(a.x.min(b.x).min(c.x).floor())?,
            min_y: to_pixel_coordinate(a.y.min(b.y).min(c.y).floor())?,
            max_x: to_pixel_coordinate(a.x.max(b.x).max(c.x).ceil())?,
            max_y: to_pixel_coordinate(a.y.max(b.y).max(c.y).ceil())?,
        })
    }

    /// The part of the box that lies inside a `width` x `height` buffer.
    /// `None` when they do not overlap.
    pub fn clamped_to(&self, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let clamped = BoundingBox {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width as i64 - 1),
            max_y: self.max_y.min(height as i64 - 1),
        };
        (clamped.min_x <= clamped.max_x && clamped.min_y <= clamped.max_y).then_some(clamped)
    }

    /// Number of pixels in the box.
    pub fn area(&self) -> u64 {
        let width = (self.max_x - self.min_x + 1).max(0) as u64;
        let height = (self.max_y - self.min_y + 1).max(0) as u64;
        width.saturating_mul(height)
    }
}

/// Off-buffer work, in pixels, that a primitive may still cost. Within it every
/// lost pixel is visited and counted in `skipped_pixels`; beyond it only the
/// visible part is drawn and the primitive counts once in `skipped_primitives`.
pub const OVERHANG_SCAN_LIMIT: u64 = 1 << 16;

/// Integer line endpoints plus the stretch `[t_start, t_end]` of the
/// requested segment they cover.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineSpan {
    x_start: i64,
    y_start: i64,
    x_end: i64,
    y_end: i64,
    t_start: f32,
    t_end: f32,
}

impl LineSpan {
    fn total_steps(&self) -> i64 {
        (self.x_end - self.x_start)
            .abs()
            .max((self.y_end - self.y_start).abs())
    }

    fn is_partial(&self) -> bool {
        self.t_start > 0.0 || self.t_end < 1.0
    }

    /// Liang-Barsky clip against the buffer grown by one pixel on every side.
    fn clipped_to(&self, width: usize, height: usize) -> Option<Self> {
        let x0 = self.x_start as f64;
        let y0 = self.y_start as f64;
        let dx = (self.x_end - self.x_start) as f64;
        let dy = (self.y_end - self.y_start) as f64;

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        let boundaries = [
            (-dx, x0 + 1.0),
            (dx, width as f64 - x0),
            (-dy, y0 + 1.0),
            (dy, height as f64 - y0),
        ];
        for (p, q) in boundaries {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
        if t0 > t1 {
            return None;
        }
        if t0 == 0.0 && t1 == 1.0 {
            return Some(*self);
        }

        Some(LineSpan {
            x_start: (x0 + dx * t0).round() as i64,
            y_start: (y0 + dy * t0).round() as i64,
            x_end: (x0 + dx * t1).round() as i64,
            y_end: (y0 + dy * t1).round() as i64,
            t_start: t0 as f32,
            t_end: t1 as f32,
        })
    }
}

// Keeps integer stepping free of overflow.
fn to_pixel_coordinate(v: f32) -> Option<i64> {
    if v.is_finite() && v.abs() <= i32::MAX as f32 {
        Some(v as i64)
    } else {
        None
    }
}

/// Point on a cubic Bezier curve, evaluated with the Bernstein basis.
pub fn bezier_point(
    p0: &Vector2<f32>,
    p1: &Vector2<f32>,
    p2: &Vector2<f32>,
    p3: &Vector2<f32>,
    t: f32,
) -> Vector2<f32> {
    let oot = 1.0 - t;
    let p = scale(p0, oot * oot * oot);
    let p = mad(&p, p1, 3.0 * oot * oot * t);
    let p = mad(&p, p2, 3.0 * oot * t * t);
    mad(&p, p3, t * t * t)
}

// ===== Rasterizer =====

/// Pixel level scan conversion into a [`FrameBuffer`].
///
/// The target buffer is passed to every call. The only state carried between
/// calls is the count of pixels that fell outside their buffer: those writes are
/// skipped with a warning and the rasterizer remembers that the image is
/// incomplete until [`Rasterizer::reset`].
#[derive(Debug, Default, Clone)]
pub struct Rasterizer {
    skipped_pixels: usize,
    skipped_primitives: usize,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels that could not be painted since the last reset.
    pub fn skipped_pixels(&self) -> usize {
        self.skipped_pixels
    }

    /// Primitives dropped because a vertex was not a finite pixel coordinate.
    pub fn skipped_primitives(&self) -> usize {
        self.skipped_primitives
    }

    /// Sticky error flag: false once any pixel or primitive was skipped.
    pub fn all_pixels_painted(&self) -> bool {
        self.skipped_pixels == 0 && self.skipped_primitives == 0
    }

    pub fn reset(&mut self) {
        self.skipped_pixels = 0;
        self.skipped_primitives = 0;
    }

    /// Rounds (x, y) to the nearest pixel and writes `color` there.
    ///
    /// Valid pixels are `[0, width) x [0, height)`. Anything else, including
    /// NaN or infinite coordinates, leaves the buffer untouched, logs a warning
    /// and raises the error flag. Returns whether the pixel was written.
    pub fn set_pixel(&mut self, x: f32, y: f32, color: &Color, buffer: &mut FrameBuffer) -> bool {
        if self.put_pixel(x, y, color, buffer) {
            return true;
        }

        warn!(
            "Pixel at ({}, {}) with RGBA({}, {}, {}, {}) could not be painted because it is outside the buffer. \
             Valid x: 0 - {}, valid y: 0 - {}",
            x.round(),
            y.round(),
            color.x,
            color.y,
            color.z,
            color.w,
            buffer.width().saturating_sub(1),
            buffer.height().saturating_sub(1)
        );
        false
    }

    /// Same as [`Rasterizer::set_pixel`] but silent: a miss only raises the
    /// error flag. For callers that write many pixels and report misses once.
    pub fn put_pixel(&mut self, x: f32, y: f32, color: &Color, buffer: &mut FrameBuffer) -> bool {
        let x = x.round();
        let y = y.round();

        let inside = x.is_finite()
            && y.is_finite()
            && x >= 0.0
            && y >= 0.0
            && x < buffer.width() as f32
            && y < buffer.height() as f32;

        if !inside {
            self.skipped_pixels += 1;
            return false;
        }

        buffer.write_rgba(x as usize, y as usize, color_to_rgba8(color))
    }

    /// Fills every buffer pixel whose squared distance to the center is at most
    /// `radius²`. Brute force over the whole buffer.
    pub fn draw_circle(
        &mut self,
        x_center: f32,
        y_center: f32,
        radius: f32,
        color: &Color,
        buffer: &mut FrameBuffer,
    ) {
        let radius_squared = radius * radius;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let dx = x as f32 - x_center;
                let dy = y as f32 - y_center;
                if dx * dx + dy * dy <= radius_squared {
                    self.set_pixel(x as f32, y as f32, color, buffer);
                }
            }
        }
    }

    /// Integer incremental (Bresenham) line between the rounded endpoints.
    ///
    /// The first pixel gets `color_start`. With `color_already_interpolated`
    /// false every following pixel gets `color_start` blended toward
    /// `color_end` by `step / total_steps`; with it true the caller has already
    /// picked the color of this segment and `color_start` is used throughout.
    ///
    /// Lines longer than [`OVERHANG_SCAN_LIMIT`] steps are first clipped to the
    /// buffer, so a far away endpoint costs no more than the visible part.
    pub fn draw_line(
        &mut self,
        start: &Vector2<f32>,
        end: &Vector2<f32>,
        color_start: &Color,
        color_end: &Color,
        color_already_interpolated: bool,
        buffer: &mut FrameBuffer,
    ) {
        let endpoints = (
            to_pixel_coordinate(start.x.round()),
            to_pixel_coordinate(start.y.round()),
            to_pixel_coordinate(end.x.round()),
            to_pixel_coordinate(end.y.round()),
        );
        let (Some(x_start), Some(y_start), Some(x_end), Some(y_end)) = endpoints else {
            self.skipped_primitives += 1;
            warn!("Line from {:?} to {:?} has no valid pixel endpoints, skipped", start, end);
            return;
        };

        let mut span = LineSpan {
            x_start,
            y_start,
            x_end,
            y_end,
            t_start: 0.0,
            t_end: 1.0,
        };

        if span.total_steps() as u64 > OVERHANG_SCAN_LIMIT {
            match span.clipped_to(buffer.width(), buffer.height()) {
                None => {
                    self.skipped_primitives += 1;
                    warn!("Line from {:?} to {:?} lies outside the buffer, skipped", start, end);
                    return;
                }
                Some(clipped) if clipped.is_partial() => {
                    self.skipped_primitives += 1;
                    warn!(
                        "Line from {:?} to {:?} reaches far outside the buffer, only t in [{}, {}] is drawn",
                        start, end, clipped.t_start, clipped.t_end
                    );
                    span = clipped;
                }
                Some(_) => {}
            }
        }

        let missed = self.step_line(
            &span,
            color_start,
            color_end,
            color_already_interpolated,
            buffer,
        );
        if missed > 0 {
            warn!(
                "Line from {:?} to {:?}: {} pixel(s) outside the buffer. Valid x: 0 - {}, valid y: 0 - {}",
                start,
                end,
                missed,
                buffer.width().saturating_sub(1),
                buffer.height().saturating_sub(1)
            );
        }
    }

    // Bresenham stepping over one span; returns the number of pixels that
    // missed the buffer.
    fn step_line(
        &mut self,
        span: &LineSpan,
        color_start: &Color,
        color_end: &Color,
        color_already_interpolated: bool,
        buffer: &mut FrameBuffer,
    ) -> u64 {
        let delta_x = (span.x_end - span.x_start).abs();
        let delta_y = (span.y_end - span.y_start).abs();
        let horizontal_step = if span.x_start < span.x_end { 1 } else { -1 };
        let vertical_step = if span.y_start < span.y_end { 1 } else { -1 };

        let mut x = span.x_start;
        let mut y = span.y_start;
        let mut difference = delta_x - delta_y;
        let total_steps = span.total_steps();

        let color_at = |step: i64| -> Color {
            if color_already_interpolated {
                return *color_start;
            }
            let local = if total_steps == 0 {
                0.0
            } else {
                step as f32 / total_steps as f32
            };
            lerp(
                color_start,
                color_end,
                span.t_start + (span.t_end - span.t_start) * local,
            )
        };

        let mut missed = 0;
        if !self.put_pixel(x as f32, y as f32, &color_at(0), buffer) {
            missed += 1;
        }

        for step in 1..=total_steps {
            let double_difference = 2 * difference;
            if double_difference > -delta_y {
                difference -= delta_y;
                x += horizontal_step;
            }
            if double_difference < delta_x {
                difference += delta_x;
                y += vertical_step;
            }

            if !self.put_pixel(x as f32, y as f32, &color_at(step), buffer) {
                missed += 1;
            }
        }
        missed
    }

    /// Fills a triangle given in buffer coordinates, blending the vertex colors
    /// with barycentric weights.
    ///
    /// Every integer pixel of the bounding box is tested against the three
    /// edges; the triangle's own winding decides which side counts as inside,
    /// so both vertex orders fill the same pixels. Pixels on an edge are
    /// painted. Degenerate (zero area) triangles paint nothing.
    ///
    /// When the box overhangs the buffer by more than [`OVERHANG_SCAN_LIMIT`]
    /// pixels only its visible part is scanned.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle_filled(
        &mut self,
        a: &Vector2<f32>,
        b: &Vector2<f32>,
        c: &Vector2<f32>,
        color_a: &Color,
        color_b: &Color,
        color_c: &Color,
        buffer: &mut FrameBuffer,
    ) {
        let area = signed_triangle_area(a, b, c);
        if area.is_nan() || area.abs() < EPSILON {
            debug!("Degenerate triangle {:?} {:?} {:?} skipped", a, b, c);
            return;
        }

        let Some(bbox) = BoundingBox::of_triangle(a, b, c) else {
            self.skipped_primitives += 1;
            warn!(
                "Triangle {:?} {:?} {:?} has no valid pixel bounds, skipped",
                a, b, c
            );
            return;
        };

        let visible = bbox.clamped_to(buffer.width(), buffer.height());
        let overhang = bbox
            .area()
            .saturating_sub(visible.map_or(0, |v| v.area()));

        let scan = if overhang <= OVERHANG_SCAN_LIMIT {
            bbox
        } else {
            self.skipped_primitives += 1;
            warn!(
                "Triangle {:?} {:?} {:?} reaches far outside the buffer, only the visible part is drawn",
                a, b, c
            );
            match visible {
                Some(visible) => visible,
                None => return,
            }
        };

        let winding = match orientation(a, b, c) {
            Orientation::CounterClockwise => 1.0,
            Orientation::Clockwise | Orientation::Collinear => -1.0,
        };

        let mut missed = 0u64;
        for y in scan.min_y..=scan.max_y {
            for x in scan.min_x..=scan.max_x {
                let p = Vector2::new(x as f32, y as f32);

                let area_ab = signed_triangle_area(&p, a, b);
                let area_bc = signed_triangle_area(&p, b, c);
                let area_ca = signed_triangle_area(&p, c, a);

                if winding * area_ab >= 0.0 && winding * area_bc >= 0.0 && winding * area_ca >= 0.0
                {
                    let alpha = area_bc / area;
                    let beta = area_ca / area;
                    let gamma = 1.0 - alpha - beta;

                    let color = color_a * alpha + color_b * beta + color_c * gamma;
                    if !self.put_pixel(p.x, p.y, &color, buffer) {
                        missed += 1;
                    }
                }
            }
        }

        if missed > 0 {
            warn!(
                "Triangle {:?} {:?} {:?}: {} pixel(s) outside the buffer. Valid x: 0 - {}, valid y: 0 - {}",
                a,
                b,
                c,
                missed,
                buffer.width().saturating_sub(1),
                buffer.height().saturating_sub(1)
            );
        }
    }

    /// Flattens a cubic Bezier curve into `num_samples` line segments.
    ///
    /// The curve and a linear color ramp are sampled at `t = i / num_samples`;
    /// each segment is drawn with the color of its first sample.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bezier(
        &mut self,
        p0: &Vector2<f32>,
        p1: &Vector2<f32>,
        p2: &Vector2<f32>,
        p3: &Vector2<f32>,
        color_start: &Color,
        color_end: &Color,
        num_samples: usize,
        buffer: &mut FrameBuffer,
    ) {
        if num_samples == 0 {
            debug!("Bezier curve with zero samples skipped");
            return;
        }

        let samples: Vec<(Vector2<f32>, Color)> = (0..=num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                (
                    bezier_point(p0, p1, p2, p3, t),
                    lerp(color_start, color_end, t),
                )
            })
            .collect();

        for segment in samples.windows(2) {
            let (from, from_color) = &segment[0];
            let (to, to_color) = &segment[1];
            self.draw_line(from, to, from_color, to_color, true, buffer);
        }
    }
}
