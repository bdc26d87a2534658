use crate::utils::color_utils::Color;
use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Geometric primitive a mesh's indices describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Point,
    Line,
    Triangle,
}

impl PrimitiveKind {
    /// Number of indices that make up one primitive.
    pub fn arity(self) -> usize {
        match self {
            PrimitiveKind::Point => 1,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Triangle => 3,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Point => "POINT",
            PrimitiveKind::Line => "LINE",
            PrimitiveKind::Triangle => "TRIANGLE",
        };
        f.write_str(name)
    }
}

/// Numeric codes 0, 1, 2 for point, line, triangle.
impl TryFrom<u32> for PrimitiveKind {
    type Error = MeshError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PrimitiveKind::Point),
            1 => Ok(PrimitiveKind::Line),
            2 => Ok(PrimitiveKind::Triangle),
            other => Err(MeshError::InvalidPrimitiveKind(other.to_string())),
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "point" | "points" => Ok(PrimitiveKind::Point),
            "line" | "lines" => Ok(PrimitiveKind::Line),
            "triangle" | "triangles" => Ok(PrimitiveKind::Triangle),
            _ => Err(MeshError::InvalidPrimitiveKind(s.to_string())),
        }
    }
}

/// Structural violations detected while building a [`Mesh`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("Unsupported primitive type: {0}")]
    InvalidPrimitiveKind(String),

    #[error("Number of indices ({count}) does not match primitive type {kind} (multiple of {arity})")]
    IndexArityMismatch {
        kind: PrimitiveKind,
        count: usize,
        arity: usize,
    },

    #[error("Number of positions ({positions}) and colors ({colors}) does not match")]
    ColorCountMismatch { positions: usize, colors: usize },
}

/// Immutable geometry: primitive kind, positions, indices into the positions
/// and either one uniform color or one color per position.
///
/// All invariants are checked once in [`Mesh::new`]; there is no way to get a
/// partially valid mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    kind: PrimitiveKind,
    positions: Vec<Vector3<f32>>,
    indices: Vec<u32>,
    colors: Vec<Color>,
}

impl Mesh {
    pub fn new(
        kind: PrimitiveKind,
        positions: Vec<Vector3<f32>>,
        indices: Vec<u32>,
        colors: Vec<Color>,
    ) -> Result<Self, MeshError> {
        let arity = kind.arity();
        if indices.len() % arity != 0 {
            return Err(MeshError::IndexArityMismatch {
                kind,
                count: indices.len(),
                arity,
            });
        }

        if colors.len() != 1 && colors.len() != positions.len() {
            return Err(MeshError::ColorCountMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }

        Ok(Self {
            kind,
            positions,
            indices,
            colors,
        })
    }

    /// Same as [`Mesh::new`] with the primitive kind given by its numeric code.
    pub fn from_kind_code(
        kind_code: u32,
        positions: Vec<Vector3<f32>>,
        indices: Vec<u32>,
        colors: Vec<Color>,
    ) -> Result<Self, MeshError> {
        let kind = PrimitiveKind::try_from(kind_code)?;
        Self::new(kind, positions, indices, colors)
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// True when one color applies to every vertex.
    pub fn has_uniform_color(&self) -> bool {
        self.colors.len() == 1
    }

    /// Color of the vertex at `vertex_index` (an index into the positions).
    pub fn vertex_color(&self, vertex_index: usize) -> Option<&Color> {
        if self.has_uniform_color() {
            self.colors.first()
        } else {
            self.colors.get(vertex_index)
        }
    }

    /// Number of points, lines or triangles.
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.kind.arity()
    }
}
