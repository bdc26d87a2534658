use nalgebra::{SMatrix, SVector, Vector2, Vector3, Vector4};
use rand::Rng;
use std::f32::consts::TAU;

/// Tolerance shared by every float comparison in the crate.
pub const EPSILON: f32 = 1e-5;

// ===== Componentwise operations, identical for 2, 3 and 4 components =====

/// a + b
#[inline]
pub fn add<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> SVector<f32, D> {
    a + b
}

/// a - b
#[inline]
pub fn subtract<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> SVector<f32, D> {
    a - b
}

/// v * s
#[inline]
pub fn scale<const D: usize>(v: &SVector<f32, D>, s: f32) -> SVector<f32, D> {
    v * s
}

/// Componentwise product.
#[inline]
pub fn hadamard<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> SVector<f32, D> {
    a.component_mul(b)
}

/// Multiply and add: `a + b * s`.
///
/// Shows up in every interpolation and projection path, so it gets its own entry point.
#[inline]
pub fn mad<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>, s: f32) -> SVector<f32, D> {
    a + b * s
}

#[inline]
pub fn dot<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> f32 {
    a.dot(b)
}

/// Euclidean length.
#[inline]
pub fn length<const D: usize>(v: &SVector<f32, D>) -> f32 {
    v.norm()
}

/// Euclidean distance between two points.
#[inline]
pub fn distance<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> f32 {
    (b - a).norm()
}

/// Scales `v` to unit length. A zero vector stays zero instead of producing NaN.
pub fn normalize<const D: usize>(v: &SVector<f32, D>) -> SVector<f32, D> {
    let length_squared = v.norm_squared();
    let inv_length = if length_squared > 0.0 {
        1.0 / length_squared.sqrt()
    } else {
        0.0
    };
    v * inv_length
}

/// Linear interpolation `a*(1-t) + b*t`. `t` is not clamped.
#[inline]
pub fn lerp<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>, t: f32) -> SVector<f32, D> {
    a * (1.0 - t) + b * t
}

/// Weighted blend of three points, weights taken from `uvw`.
pub fn barylerp<const D: usize>(
    a: &SVector<f32, D>,
    b: &SVector<f32, D>,
    c: &SVector<f32, D>,
    uvw: &Vector3<f32>,
) -> SVector<f32, D> {
    a * uvw.x + b * uvw.y + c * uvw.z
}

pub fn min<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> SVector<f32, D> {
    a.zip_map(b, f32::min)
}

pub fn max<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> SVector<f32, D> {
    a.zip_map(b, f32::max)
}

pub fn floor<const D: usize>(v: &SVector<f32, D>) -> SVector<f32, D> {
    v.map(f32::floor)
}

pub fn ceil<const D: usize>(v: &SVector<f32, D>) -> SVector<f32, D> {
    v.map(f32::ceil)
}

/// Multiplies `v` by a square matrix. nalgebra stores matrices column-major,
/// so a flat column-major array goes in through `SMatrix::from_column_slice`.
#[inline]
pub fn transform<const D: usize>(m: &SMatrix<f32, D, D>, v: &SVector<f32, D>) -> SVector<f32, D> {
    m * v
}

/// True when every component differs by less than [`EPSILON`].
pub fn equals<const D: usize>(a: &SVector<f32, D>, b: &SVector<f32, D>) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPSILON)
}

// ===== Dimension specific operations =====

#[inline]
pub fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

/// 2D "cross product": `a.x*b.y - a.y*b.x`.
#[inline]
pub fn determinant(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of the triangle (p, p1, p2).
/// Positive for counter-clockwise order in a y-up frame, zero when collinear.
#[inline]
pub fn signed_triangle_area(p: &Vector2<f32>, p1: &Vector2<f32>, p2: &Vector2<f32>) -> f32 {
    determinant(&(p1 - p), &(p2 - p))
}

/// Uniformly distributed direction on the unit circle, scaled by `scale`.
pub fn random2<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Vector2<f32> {
    let r = rng.random::<f32>() * TAU;
    Vector2::new(r.cos() * scale, r.sin() * scale)
}

/// Uniformly distributed direction on the unit sphere, scaled by `scale`.
pub fn random3<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Vector3<f32> {
    let r = rng.random::<f32>() * TAU;
    let z = rng.random::<f32>() * 2.0 - 1.0;
    let z_scale = (1.0 - z * z).sqrt() * scale;
    Vector3::new(r.cos() * z_scale, r.sin() * z_scale, z * scale)
}

/// Uniformly distributed point on the 4D unit hypersphere, scaled by `scale`.
///
/// Marsaglia (1972): two points are rejection-sampled inside the unit disk and
/// the second pair is stretched by `sqrt((1 - s1) / s2)`.
pub fn random4<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Vector4<f32> {
    let (v1, v2, s1) = sample_unit_disk(rng);
    let (v3, v4, s2) = sample_unit_disk(rng);

    let d = ((1.0 - s1) / s2).sqrt();
    Vector4::new(scale * v1, scale * v2, scale * v3 * d, scale * v4 * d)
}

// Rejects (0, 0) as well so the caller never divides by a zero norm.
fn sample_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32, f32) {
    loop {
        let a = rng.random::<f32>() * 2.0 - 1.0;
        let b = rng.random::<f32>() * 2.0 - 1.0;
        let s = a * a + b * b;
        if s < 1.0 && s > 0.0 {
            return (a, b, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix2, Matrix3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn normalize_yields_unit_length() {
        let v = Vector3::new(3.0, -4.0, 12.0);
        assert_relative_eq!(length(&normalize(&v)), 1.0, epsilon = EPSILON);

        let w = Vector4::new(0.1, 0.2, 0.3, 0.4);
        assert_relative_eq!(length(&normalize(&w)), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let n = normalize(&Vector2::<f32>::zeros());
        assert!(n.iter().all(|c| *c == 0.0));
        assert!(!n.x.is_nan());
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        let a = Vector4::new(255.0, 0.0, 10.0, 255.0);
        let b = Vector4::new(0.0, 255.0, 20.0, 128.0);
        assert!(equals(&lerp(&a, &b, 0.0), &a));
        assert!(equals(&lerp(&a, &b, 1.0), &b));
        assert!(equals(&lerp(&a, &b, 0.5), &Vector4::new(127.5, 127.5, 15.0, 191.5)));
    }

    #[test]
    fn lerp_extrapolates_outside_unit_interval() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(1.0, 2.0);
        assert!(equals(&lerp(&a, &b, 2.0), &Vector2::new(2.0, 4.0)));
        assert!(equals(&lerp(&a, &b, -1.0), &Vector2::new(-1.0, -2.0)));
    }

    #[test]
    fn mad_and_componentwise_ops() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert!(equals(&mad(&a, &b, 2.0), &Vector3::new(9.0, 12.0, 15.0)));
        assert!(equals(&hadamard(&a, &b), &Vector3::new(4.0, 10.0, 18.0)));
        assert!(equals(&subtract(&b, &a), &Vector3::new(3.0, 3.0, 3.0)));
        assert!(equals(&scale(&add(&a, &b), 0.5), &Vector3::new(2.5, 3.5, 4.5)));
        assert_relative_eq!(dot(&a, &b), 32.0);
        assert!(equals(&cross(&Vector3::x(), &Vector3::y()), &Vector3::z()));
    }

    #[test]
    fn min_max_floor_ceil() {
        let a = Vector2::new(1.5, -2.5);
        let b = Vector2::new(-0.5, 3.0);
        assert!(equals(&min(&a, &b), &Vector2::new(-0.5, -2.5)));
        assert!(equals(&max(&a, &b), &Vector2::new(1.5, 3.0)));
        assert!(equals(&floor(&a), &Vector2::new(1.0, -3.0)));
        assert!(equals(&ceil(&a), &Vector2::new(2.0, -2.0)));
    }

    #[test]
    fn signed_area_tracks_winding() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(4.0, 0.0);
        let c = Vector2::new(0.0, 4.0);
        assert_relative_eq!(signed_triangle_area(&a, &b, &c), 16.0);
        assert_relative_eq!(signed_triangle_area(&a, &c, &b), -16.0);
        assert_relative_eq!(signed_triangle_area(&a, &b, &Vector2::new(8.0, 0.0)), 0.0);
        assert_relative_eq!(determinant(&Vector2::x(), &Vector2::y()), 1.0);
    }

    #[test]
    fn transform_uses_column_major_layout() {
        // columns (1, 2) and (3, 4)
        let m = Matrix2::from_column_slice(&[1.0, 2.0, 3.0, 4.0]);
        let v = transform(&m, &Vector2::new(1.0, 1.0));
        assert!(equals(&v, &Vector2::new(4.0, 6.0)));

        let identity = Matrix3::identity();
        let p = Vector3::new(-1.0, 0.5, 7.0);
        assert!(equals(&transform(&identity, &p), &p));
    }

    #[test]
    fn equals_respects_epsilon() {
        let a = Vector2::new(1.0, 1.0);
        assert!(equals(&a, &Vector2::new(1.0 + EPSILON * 0.5, 1.0)));
        assert!(!equals(&a, &Vector2::new(1.0 + EPSILON * 2.0, 1.0)));
    }

    #[test]
    fn barylerp_blends_vertices() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 1.0, 0.0);
        let c = Vector3::new(0.0, 0.0, 1.0);
        let p = barylerp(&a, &b, &c, &Vector3::new(0.2, 0.3, 0.5));
        assert!(equals(&p, &Vector3::new(0.2, 0.3, 0.5)));
    }

    #[test]
    fn random_vectors_have_requested_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_relative_eq!(length(&random2(&mut rng, 1.0)), 1.0, epsilon = 1e-4);
            assert_relative_eq!(length(&random3(&mut rng, 2.0)), 2.0, epsilon = 1e-4);
            assert_relative_eq!(length(&random4(&mut rng, 3.0)), 3.0, epsilon = 1e-3);
        }
    }
}
