//! Boundary-face mesh extraction from a solid voxel set.
//!
//! A quad is emitted for every face of a solid voxel whose neighbor across
//! that face is not solid. Neighbors outside the volume are never members,
//! so the volume boundary needs no special case.

use nalgebra::Vector3;
use tracing::debug;
use voxel_spatial::{VoxelCoord, VoxelLattice, VoxelSet};

use crate::mesh::{IndexBuffer, ReconstructedMesh};

/// Outward unit normal of each face, in `+X, -X, +Y, -Y, +Z, -Z` order.
///
/// Matches the order of [`VoxelCoord::face_neighbors`].
pub const FACE_DIRECTIONS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Unit-cube corners of each face, counter-clockwise seen from outside.
///
/// Triangles are `(0, 1, 2)` and `(0, 2, 3)`; renderers depend on this
/// winding for front faces.
pub const FACE_CORNERS: [[[f64; 3]; 4]; 6] = [
    // +X
    [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
    // -X
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    // +Y
    [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
    // -Y
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    // +Z
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    // -Z
    [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
];

/// Builds the boundary mesh of `solid` on the given lattice.
///
/// Voxels are visited in sorted order so identical sets give identical
/// buffers. Cost is `O(|solid| × 6)` membership tests plus the sort.
///
/// # Example
///
/// ```
/// use roi_recon::extract_boundary_mesh;
/// use voxel_spatial::{VoxelCoord, VoxelLattice, VoxelSet};
///
/// let lattice = VoxelLattice::new(0.1).unwrap();
/// let solid: VoxelSet = [VoxelCoord::new(0, 0, 0)].into_iter().collect();
///
/// let mesh = extract_boundary_mesh(&solid, &lattice);
/// assert_eq!(mesh.quad_count(), 6);
/// assert_eq!(mesh.vertex_count(), 24);
/// ```
#[must_use]
pub fn extract_boundary_mesh(solid: &VoxelSet, lattice: &VoxelLattice) -> ReconstructedMesh {
    let size = lattice.voxel_size();
    let mut vertices = Vec::new();

    for coord in solid.to_sorted_vec() {
        let base = lattice.cell_min(coord);
        for (face, neighbor) in coord.face_neighbors().into_iter().enumerate() {
            if solid.contains(neighbor) {
                continue;
            }
            vertices.extend(
                FACE_CORNERS[face]
                    .iter()
                    .map(|&[x, y, z]| base + Vector3::new(x, y, z) * size),
            );
        }
    }

    let quad_count = vertices.len() / 4;
    let indices = IndexBuffer::for_quads(quad_count);
    debug!(
        solid = solid.len(),
        quads = quad_count,
        vertices = vertices.len(),
        wide_indices = indices.is_u32(),
        "Extracted boundary mesh"
    );

    ReconstructedMesh { vertices, indices }
}

/// Counts the exposed faces of one voxel without building geometry.
#[must_use]
pub fn exposed_faces(solid: &VoxelSet, coord: VoxelCoord) -> usize {
    coord
        .face_neighbors()
        .into_iter()
        .filter(|&n| !solid.contains(n))
        .count()
}
