//! Cuboid Index Generator
//!
//! Produces the 12 triangles of one cuboid, addressing the axis-major vertex
//! layout from [`super::cuboid`]. Every index is `block + corner + ordinal * 8`.
//! Winding is counter-clockwise seen from outside the box.

use super::corner::{Axis, Corner};
use super::faces::Face;

/// Largest number of cuboids a model can render. Sizes the GPU vertex and
/// index buffers.
pub const MAX_CUBES: usize = 8192;

/// Indices emitted per cuboid (2 triangles per face, 6 faces).
pub const INDICES_PER_CUBE: usize = 36;

/// Index offset added per cube ordinal.
pub const ORDINAL_STRIDE: u32 = 8;

/// Two triangles per face, corners listed counter-clockwise from outside.
const FACE_TRIANGLES: [(Face, [Corner; 6]); 6] = [
    (
        Face::NegX,
        [
            Corner::WEST_TOP_NORTH,
            Corner::WEST_BOTTOM_SOUTH,
            Corner::WEST_TOP_SOUTH,
            Corner::WEST_TOP_NORTH,
            Corner::WEST_BOTTOM_NORTH,
            Corner::WEST_BOTTOM_SOUTH,
        ],
    ),
    (
        Face::PosX,
        [
            Corner::EAST_TOP_SOUTH,
            Corner::EAST_BOTTOM_NORTH,
            Corner::EAST_TOP_NORTH,
            Corner::EAST_TOP_SOUTH,
            Corner::EAST_BOTTOM_SOUTH,
            Corner::EAST_BOTTOM_NORTH,
        ],
    ),
    (
        Face::NegY,
        [
            Corner::WEST_BOTTOM_SOUTH,
            Corner::EAST_BOTTOM_NORTH,
            Corner::EAST_BOTTOM_SOUTH,
            Corner::WEST_BOTTOM_SOUTH,
            Corner::WEST_BOTTOM_NORTH,
            Corner::EAST_BOTTOM_NORTH,
        ],
    ),
    (
        Face::PosY,
        [
            Corner::WEST_TOP_NORTH,
            Corner::EAST_TOP_SOUTH,
            Corner::EAST_TOP_NORTH,
            Corner::WEST_TOP_NORTH,
            Corner::WEST_TOP_SOUTH,
            Corner::EAST_TOP_SOUTH,
        ],
    ),
    (
        Face::NegZ,
        [
            Corner::EAST_TOP_NORTH,
            Corner::WEST_BOTTOM_NORTH,
            Corner::WEST_TOP_NORTH,
            Corner::EAST_TOP_NORTH,
            Corner::EAST_BOTTOM_NORTH,
            Corner::WEST_BOTTOM_NORTH,
        ],
    ),
    (
        Face::PosZ,
        [
            Corner::WEST_TOP_SOUTH,
            Corner::EAST_BOTTOM_SOUTH,
            Corner::EAST_TOP_SOUTH,
            Corner::WEST_TOP_SOUTH,
            Corner::WEST_BOTTOM_SOUTH,
            Corner::EAST_BOTTOM_SOUTH,
        ],
    ),
];

/// Local (ordinal 0) index of `corner` inside the block of `axis`.
fn local_index(axis: Axis, corner: Corner) -> u32 {
    axis.block_offset() + u32::from(corner.code())
}

/// The 36 indices for the cube at `ordinal` within its model.
///
/// Ordinals at or past [`MAX_CUBES`] do not fit the vertex buffer; they log
/// an error and yield no indices, so the cube is left out of the mesh.
pub fn cube_indices(ordinal: usize) -> Vec<u32> {
    if ordinal >= MAX_CUBES {
        log::error!(
            "[IndexGenerator] Cube ordinal {} out of range (max {}), cube will not be rendered",
            ordinal,
            MAX_CUBES
        );
        return Vec::new();
    }

    let offset = ordinal as u32 * ORDINAL_STRIDE;
    let mut indices = Vec::with_capacity(INDICES_PER_CUBE);
    for (face, corners) in &FACE_TRIANGLES {
        let axis = face.axis();
        indices.extend(corners.iter().map(|&c| local_index(axis, c) + offset));
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cuboid::CuboidSpec;
    use glam::Vec3;

    #[test]
    fn test_ordinal_zero_pattern() {
        let indices = cube_indices(0);
        assert_eq!(indices.len(), INDICES_PER_CUBE);
        // west face lives in the X block
        assert!(indices[0..6].iter().all(|&i| i < 8));
        // top face lives in the Y block
        assert!(indices[18..24].iter().all(|&i| (8..16).contains(&i)));
        // south face lives in the Z block
        assert!(indices[30..36].iter().all(|&i| (16..24).contains(&i)));
    }

    #[test]
    fn test_ordinal_offsets_by_eight() {
        let base = cube_indices(0);
        for k in [1usize, 2, 17, 1000, MAX_CUBES - 1] {
            let shifted = cube_indices(k);
            assert_eq!(shifted.len(), base.len());
            for (a, b) in base.iter().zip(&shifted) {
                assert_eq!(*b, *a + 8 * k as u32);
            }
        }
    }

    #[test]
    fn test_ordinal_out_of_range_is_empty() {
        assert!(cube_indices(MAX_CUBES).is_empty());
        assert!(cube_indices(MAX_CUBES + 100).is_empty());
    }

    #[test]
    fn test_indices_reference_their_face() {
        let vertices = CuboidSpec::from_size(Vec3::ONE).vertices();
        let indices = cube_indices(0);
        for (face_slot, tri) in indices.chunks(6).enumerate() {
            let face = Face::ALL[face_slot];
            for &i in tri {
                let normal = vertices[i as usize].normal;
                assert_eq!(normal, face.canonical_normal().to_array(), "{face:?}");
            }
        }
    }

    #[test]
    fn test_triangles_wind_counter_clockwise_from_outside() {
        let vertices = CuboidSpec::from_size(Vec3::ONE).vertices();
        let indices = cube_indices(0);
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(vertices[i as usize].position));
            let normal = Vec3::from_array(vertices[tri[0] as usize].normal);
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(normal) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn test_each_face_covers_its_four_corners() {
        let indices = cube_indices(0);
        for tri in indices.chunks(6) {
            let mut distinct = tri.to_vec();
            distinct.sort_unstable();
            distinct.dedup();
            assert_eq!(distinct.len(), 4);
        }
    }
}
