use crate::scene::mesh::{Mesh, PrimitiveKind};
use crate::utils::color_utils::{Color, error_color};
use nalgebra::Vector3;

/// Corners of an axis aligned unit cube centered on the origin.
/// Front face (z = +0.5) first, counter-clockwise from bottom left.
const CUBE_POSITIONS: [[f32; 3]; 8] = [
    // front
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
    // back
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
];

const POINT_INDICES: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

const LINE_INDICES: [u32; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // front
    4, 5, 5, 6, 6, 7, 7, 4, // back
    0, 4, 1, 5, 2, 6, 3, 7, // connecting edges
];

const TRIANGLE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0, // front
    1, 5, 6, 6, 2, 1, // right
    7, 6, 5, 5, 4, 7, // back
    4, 0, 3, 3, 7, 4, // left
    4, 5, 1, 1, 0, 4, // bottom
    3, 2, 6, 6, 7, 3, // top
];

const RGB_CORNER_COLORS: [[f32; 4]; 8] = [
    [0.0, 0.0, 0.0, 255.0],
    [255.0, 0.0, 0.0, 255.0],
    [255.0, 255.0, 0.0, 255.0],
    [0.0, 255.0, 0.0, 255.0],
    [0.0, 0.0, 255.0, 255.0],
    [255.0, 0.0, 255.0, 255.0],
    [255.0, 255.0, 255.0, 255.0],
    [0.0, 255.0, 255.0, 255.0],
];

fn cube_positions() -> Vec<Vector3<f32>> {
    CUBE_POSITIONS.iter().map(|p| Vector3::from(*p)).collect()
}

fn cube_indices(kind: PrimitiveKind) -> Vec<u32> {
    match kind {
        PrimitiveKind::Point => POINT_INDICES.to_vec(),
        PrimitiveKind::Line => LINE_INDICES.to_vec(),
        PrimitiveKind::Triangle => TRIANGLE_INDICES.to_vec(),
    }
}

/// Unit cube drawn as points, edges or faces in one color.
/// Without a color the cube is drawn in [`ERROR_COLOR`](crate::utils::color_utils::ERROR_COLOR).
pub fn default_cube(kind: PrimitiveKind, color: Option<Color>) -> Mesh {
    let color = color.unwrap_or_else(error_color);
    // The constant index tables always satisfy the arity rules.
    Mesh::new(kind, cube_positions(), cube_indices(kind), vec![color])
        .unwrap_or_else(|e| unreachable!("cube geometry is valid: {}", e))
}

/// Triangle cube with a distinct color at every corner.
pub fn rgb_cube() -> Mesh {
    let colors = RGB_CORNER_COLORS.iter().map(|c| Color::from(*c)).collect();
    Mesh::new(
        PrimitiveKind::Triangle,
        cube_positions(),
        TRIANGLE_INDICES.to_vec(),
        colors,
    )
    .unwrap_or_else(|e| unreachable!("cube geometry is valid: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cube_primitive_counts() {
        assert_eq!(default_cube(PrimitiveKind::Point, None).primitive_count(), 8);
        assert_eq!(default_cube(PrimitiveKind::Line, None).primitive_count(), 12);
        assert_eq!(default_cube(PrimitiveKind::Triangle, None).primitive_count(), 12);
    }

    #[test]
    fn default_cube_falls_back_to_error_color() {
        let cube = default_cube(PrimitiveKind::Line, None);
        assert_eq!(cube.colors(), &[error_color()]);

        let blue = Color::new(0.0, 0.0, 255.0, 255.0);
        let cube = default_cube(PrimitiveKind::Line, Some(blue));
        assert_eq!(cube.colors(), &[blue]);
    }

    #[test]
    fn rgb_cube_has_a_color_per_corner() {
        let cube = rgb_cube();
        assert_eq!(cube.kind(), PrimitiveKind::Triangle);
        assert_eq!(cube.colors().len(), cube.positions().len());
        assert_eq!(cube.vertex_color(1), Some(&Color::new(255.0, 0.0, 0.0, 255.0)));
    }

    #[test]
    fn every_index_references_a_corner() {
        for kind in [PrimitiveKind::Point, PrimitiveKind::Line, PrimitiveKind::Triangle] {
            let cube = default_cube(kind, None);
            assert!(cube.indices().iter().all(|&i| (i as usize) < cube.positions().len()));
        }
    }
}
