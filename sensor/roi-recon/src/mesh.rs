//! Renderable mesh handed to the presentation layer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Point3;

/// Vertex count above which indices switch from 16 to 32 bits.
pub const U16_VERTEX_LIMIT: usize = 65_000;

/// Triangle list indices in the narrowest width that addresses every vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexBuffer {
    /// 16-bit indices, used up to [`U16_VERTEX_LIMIT`] vertices.
    U16(Vec<u16>),
    /// 32-bit indices.
    U32(Vec<u32>),
}

impl Default for IndexBuffer {
    fn default() -> Self {
        Self::U16(Vec::new())
    }
}

impl IndexBuffer {
    /// Builds indices for `quad_count` quads of 4 private vertices each,
    /// two triangles `(0, 1, 2)` and `(0, 2, 3)` per quad.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_quads(quad_count: usize) -> Self {
        const QUAD: [usize; 6] = [0, 1, 2, 0, 2, 3];
        let indices = (0..quad_count).flat_map(|q| QUAD.map(|corner| q * 4 + corner));
        if quad_count * 4 > U16_VERTEX_LIMIT {
            Self::U32(indices.map(|i| i as u32).collect())
        } else {
            Self::U16(indices.map(|i| i as u16).collect())
        }
    }

    /// Number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    /// Returns `true` if there are no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for 32-bit indices.
    #[must_use]
    pub const fn is_u32(&self) -> bool {
        matches!(self, Self::U32(_))
    }

    /// Index at position `i`, widened to `u32`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::U16(v) => v.get(i).map(|&x| u32::from(x)),
            Self::U32(v) => v.get(i).copied(),
        }
    }

    /// All indices widened to `u32`.
    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        match self {
            Self::U16(v) => v.iter().map(|&x| u32::from(x)).collect(),
            Self::U32(v) => v.clone(),
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U16(v) => v.swap(a, b),
            Self::U32(v) => v.swap(a, b),
        }
    }
}

/// A triangle mesh built from boundary quads.
///
/// Every quad owns its four vertices; coincident corners of adjacent quads
/// are not shared.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructedMesh {
    /// World-space vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangle list, three indices per triangle.
    pub indices: IndexBuffer,
}

impl ReconstructedMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads (two triangles each).
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> Option<[Point3<f64>; 3]> {
        let corner = |k: usize| {
            let index = self.indices.get(i * 3 + k)?;
            self.vertices.get(usize::try_from(index).ok()?).copied()
        };
        Some([corner(0)?, corner(1)?, corner(2)?])
    }

    /// Reverses the winding of every triangle.
    pub fn flip_winding(&mut self) {
        for t in 0..self.triangle_count() {
            self.indices.swap(t * 3 + 1, t * 3 + 2);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_for_quads_u16() {
        let indices = IndexBuffer::for_quads(2);
        assert!(!indices.is_u32());
        assert_eq!(indices.to_u32_vec(), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_for_quads_width_switch() {
        // 16_250 quads is exactly 65_000 vertices.
        assert!(!IndexBuffer::for_quads(16_250).is_u32());
        let wide = IndexBuffer::for_quads(16_251);
        assert!(wide.is_u32());
        assert_eq!(wide.get(wide.len() - 1), Some(16_250 * 4 + 3));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = ReconstructedMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.triangle(0).is_none());
    }

    #[test]
    fn test_flip_winding() {
        let mut mesh = ReconstructedMesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            indices: IndexBuffer::for_quads(1),
        };
        mesh.flip_winding();
        assert_eq!(mesh.indices.to_u32_vec(), vec![0, 2, 1, 0, 3, 2]);
        assert_eq!(mesh.quad_count(), 1);
        let [a, b, _] = mesh.triangle(0).unwrap();
        assert_eq!(a, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(b, Point3::new(1.0, 1.0, 0.0));
    }
}
