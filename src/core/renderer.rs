use crate::core::frame_buffer::FrameBuffer;
use crate::core::rasterizer::Rasterizer;
use crate::geometry::projection::Projector;
use crate::geometry::vector::lerp;
use crate::scene::mesh::{Mesh, PrimitiveKind};
use crate::utils::color_utils::Color;
use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};
use std::time::Instant;

/// Decides what gets drawn: walks the meshes, projects their vertices and
/// hands each primitive to the [`Rasterizer`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    projector: Projector,
}

/// One resolved vertex: model-space position plus its color.
struct VertexRef<'a> {
    position: &'a Vector3<f32>,
    color: &'a Color,
}

impl Renderer {
    pub fn new(projector: Projector) -> Self {
        Renderer { projector }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Draws every mesh into `buffer`. Later primitives overwrite earlier ones;
    /// there is no depth test.
    ///
    /// # Arguments
    /// * `meshes` - drawn in order
    /// * `rasterizer` - collects the skipped pixel and primitive counts
    /// * `buffer` - target, sized to the projector's logical canvas
    pub fn draw(&self, meshes: &[Mesh], rasterizer: &mut Rasterizer, buffer: &mut FrameBuffer) {
        let start_time = Instant::now();
        let skipped_before = rasterizer.skipped_pixels();

        for (mesh_index, mesh) in meshes.iter().enumerate() {
            debug!(
                "Drawing mesh {} ({} {} primitive(s))",
                mesh_index,
                mesh.primitive_count(),
                mesh.kind()
            );
            match mesh.kind() {
                PrimitiveKind::Point => self.draw_points(mesh_index, mesh, rasterizer, buffer),
                PrimitiveKind::Line => self.draw_lines(mesh_index, mesh, rasterizer, buffer),
                PrimitiveKind::Triangle => {
                    self.draw_triangles(mesh_index, mesh, rasterizer, buffer)
                }
            }
        }

        info!(
            "Drew {} mesh(es) in {:?}, {} pixel(s) outside the buffer",
            meshes.len(),
            start_time.elapsed(),
            rasterizer.skipped_pixels() - skipped_before
        );
    }

    fn draw_points(
        &self,
        mesh_index: usize,
        mesh: &Mesh,
        rasterizer: &mut Rasterizer,
        buffer: &mut FrameBuffer,
    ) {
        for &index in mesh.indices() {
            let Some(vertex) = resolve_vertex(mesh_index, mesh, index) else {
                continue;
            };
            let screen = self.projector.project(vertex.position);
            rasterizer.set_pixel(screen.x, screen.y, vertex.color, buffer);
        }
    }

    /// Samples each segment in model space at `t = i / scale` and projects
    /// every sample on its own, so one sample lands roughly every pixel.
    /// Under strong depth changes the spacing is not foreshortening exact;
    /// [`Rasterizer::draw_line`] is the screen-space alternative.
    fn draw_lines(
        &self,
        mesh_index: usize,
        mesh: &Mesh,
        rasterizer: &mut Rasterizer,
        buffer: &mut FrameBuffer,
    ) {
        let scale = self.projector.scale();
        let sample_count = scale.floor() as usize;

        for pair in mesh.indices().chunks_exact(2) {
            let (Some(a), Some(b)) = (
                resolve_vertex(mesh_index, mesh, pair[0]),
                resolve_vertex(mesh_index, mesh, pair[1]),
            ) else {
                continue;
            };

            let mut missed = 0usize;
            for i in 0..=sample_count {
                let t = i as f32 / scale;
                let sample = lerp(a.position, b.position, t);
                let screen = self.projector.project(&sample);
                let color = if mesh.has_uniform_color() {
                    *a.color
                } else {
                    lerp(a.color, b.color, t)
                };
                if !rasterizer.put_pixel(screen.x, screen.y, &color, buffer) {
                    missed += 1;
                }
            }

            if missed > 0 {
                warn!(
                    "Mesh {} line {} -> {}: {} of {} sample(s) outside the buffer",
                    mesh_index,
                    pair[0],
                    pair[1],
                    missed,
                    sample_count + 1
                );
            }
        }
    }

    fn draw_triangles(
        &self,
        mesh_index: usize,
        mesh: &Mesh,
        rasterizer: &mut Rasterizer,
        buffer: &mut FrameBuffer,
    ) {
        for triangle in mesh.indices().chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                resolve_vertex(mesh_index, mesh, triangle[0]),
                resolve_vertex(mesh_index, mesh, triangle[1]),
                resolve_vertex(mesh_index, mesh, triangle[2]),
            ) else {
                continue;
            };

            let screen_a = self.project_2d(a.position);
            let screen_b = self.project_2d(b.position);
            let screen_c = self.project_2d(c.position);

            rasterizer.draw_triangle_filled(
                &screen_a, &screen_b, &screen_c, a.color, b.color, c.color, buffer,
            );
        }
    }

    fn project_2d(&self, position: &Vector3<f32>) -> Vector2<f32> {
        let projected = self.projector.project(position);
        Vector2::new(projected.x, projected.y)
    }
}

fn resolve_vertex(mesh_index: usize, mesh: &Mesh, index: u32) -> Option<VertexRef<'_>> {
    let vertex_index = index as usize;
    match (
        mesh.positions().get(vertex_index),
        mesh.vertex_color(vertex_index),
    ) {
        (Some(position), Some(color)) => Some(VertexRef { position, color }),
        _ => {
            warn!(
                "Mesh {} references missing vertex {}, primitive skipped",
                mesh_index, vertex_index
            );
            None
        }
    }
}
