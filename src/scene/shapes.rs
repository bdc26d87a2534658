use crate::core::frame_buffer::FrameBuffer;
use crate::core::rasterizer::Rasterizer;
use crate::utils::color_utils::Color;
use nalgebra::Vector2;

/// A primitive given directly in buffer pixel coordinates, drawn without
/// projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Vector2<f32>,
        radius: f32,
        color: Color,
    },
    Line {
        start: Vector2<f32>,
        end: Vector2<f32>,
        color_start: Color,
        color_end: Color,
    },
    Triangle {
        a: Vector2<f32>,
        b: Vector2<f32>,
        c: Vector2<f32>,
        color_a: Color,
        color_b: Color,
        color_c: Color,
    },
    Bezier {
        p0: Vector2<f32>,
        p1: Vector2<f32>,
        p2: Vector2<f32>,
        p3: Vector2<f32>,
        color_start: Color,
        color_end: Color,
        samples: usize,
    },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Line { .. } => "line",
            Shape::Triangle { .. } => "triangle",
            Shape::Bezier { .. } => "bezier",
        }
    }

    pub fn draw(&self, rasterizer: &mut Rasterizer, buffer: &mut FrameBuffer) {
        match self {
            Shape::Circle {
                center,
                radius,
                color,
            } => rasterizer.draw_circle(center.x, center.y, *radius, color, buffer),
            Shape::Line {
                start,
                end,
                color_start,
                color_end,
            } => rasterizer.draw_line(start, end, color_start, color_end, false, buffer),
            Shape::Triangle {
                a,
                b,
                c,
                color_a,
                color_b,
                color_c,
            } => rasterizer.draw_triangle_filled(a, b, c, color_a, color_b, color_c, buffer),
            Shape::Bezier {
                p0,
                p1,
                p2,
                p3,
                color_start,
                color_end,
                samples,
            } => rasterizer.draw_bezier(p0, p1, p2, p3, color_start, color_end, *samples, buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_dispatch_to_the_rasterizer() {
        let white = Color::new(255.0, 255.0, 255.0, 255.0);
        let shapes = [
            Shape::Circle {
                center: Vector2::new(2.0, 2.0),
                radius: 0.0,
                color: white,
            },
            Shape::Line {
                start: Vector2::new(0.0, 5.0),
                end: Vector2::new(3.0, 5.0),
                color_start: white,
                color_end: white,
            },
        ];

        let mut buffer = FrameBuffer::new(8, 8);
        let mut rasterizer = Rasterizer::new();
        for shape in &shapes {
            shape.draw(&mut rasterizer, &mut buffer);
        }

        // one pixel for the zero radius circle, four for the line
        assert_eq!(buffer.count_pixels_not([0, 0, 0, 0]), 5);
        assert_eq!(buffer.get_pixel(2, 2), Some([255, 255, 255, 255]));
        assert_eq!(shapes[1].name(), "line");
    }

    #[test]
    fn triangle_and_bezier_shapes_paint() {
        let color = Color::new(10.0, 20.0, 30.0, 255.0);
        let mut buffer = FrameBuffer::new(10, 10);
        let mut rasterizer = Rasterizer::new();

        Shape::Triangle {
            a: Vector2::new(0.0, 0.0),
            b: Vector2::new(2.0, 0.0),
            c: Vector2::new(0.0, 2.0),
            color_a: color,
            color_b: color,
            color_c: color,
        }
        .draw(&mut rasterizer, &mut buffer);
        assert_eq!(buffer.count_pixels_not([0, 0, 0, 0]), 6);

        Shape::Bezier {
            p0: Vector2::new(0.0, 9.0),
            p1: Vector2::new(3.0, 5.0),
            p2: Vector2::new(6.0, 5.0),
            p3: Vector2::new(9.0, 9.0),
            color_start: color,
            color_end: color,
            samples: 8,
        }
        .draw(&mut rasterizer, &mut buffer);
        assert_eq!(buffer.get_pixel(9, 9), Some([10, 20, 30, 255]));
        assert!(rasterizer.all_pixels_painted());
    }
}
