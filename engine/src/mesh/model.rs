//! Model Assembly
//!
//! A [`ModelSpec`] is an ordered list of cuboids. Assembly concatenates the
//! per-cuboid vertices and indices into the flat arrays uploaded to the GPU,
//! and is the one place the cube cap is enforced.

use std::sync::atomic::{AtomicU64, Ordering};

use super::cuboid::{CubeVertex, CuboidSpec, VERTICES_PER_CUBE};
use super::indices::{INDICES_PER_CUBE, MAX_CUBES, cube_indices};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`ModelSpec`]. Clones share it, new models never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered, immutable set of cuboids. Insertion order fixes each cube's
/// ordinal and therefore its place in the vertex/index buffers.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    id: ModelId,
    cubes: Vec<CuboidSpec>,
}

impl ModelSpec {
    pub fn new(cubes: Vec<CuboidSpec>) -> Self {
        Self {
            id: ModelId::next(),
            cubes,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn cubes(&self) -> &[CuboidSpec] {
        &self.cubes
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Build the flat vertex and index arrays for this model.
    pub fn assemble(&self) -> AssembledModel {
        assemble(&self.cubes)
    }
}

impl FromIterator<CuboidSpec> for ModelSpec {
    fn from_iter<I: IntoIterator<Item = CuboidSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// GPU-ready geometry of a whole model.
#[derive(Debug, Clone, Default)]
pub struct AssembledModel {
    pub vertices: Vec<CubeVertex>,
    pub indices: Vec<u32>,
    /// Cubes that made it into the arrays (input length capped at [`MAX_CUBES`]).
    pub cube_count: usize,
}

impl AssembledModel {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Concatenate mesh data for `cubes` in order.
///
/// Cubes past [`MAX_CUBES`] are dropped with a warning.
pub fn assemble(cubes: &[CuboidSpec]) -> AssembledModel {
    let cube_count = cubes.len().min(MAX_CUBES);
    if cubes.len() > MAX_CUBES {
        log::warn!(
            "[ModelAssembler] Model has {} cubes, only the first {} will be rendered",
            cubes.len(),
            MAX_CUBES
        );
    }

    let mut vertices = Vec::with_capacity(cube_count * VERTICES_PER_CUBE);
    let mut indices = Vec::with_capacity(cube_count * INDICES_PER_CUBE);
    for (ordinal, cube) in cubes.iter().take(cube_count).enumerate() {
        vertices.extend_from_slice(&cube.vertices());
        indices.extend(cube_indices(ordinal));
    }

    AssembledModel {
        vertices,
        indices,
        cube_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn cubes(n: usize) -> Vec<CuboidSpec> {
        (0..n)
            .map(|i| {
                CuboidSpec::from_size(Vec3::ONE)
                    .with_transform(Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
            })
            .collect()
    }

    #[test]
    fn test_assemble_counts() {
        for n in [0usize, 1, 3, 64] {
            let model = assemble(&cubes(n));
            assert_eq!(model.cube_count, n);
            assert_eq!(model.vertices.len(), 24 * n);
            assert_eq!(model.indices.len(), 36 * n);
        }
    }

    #[test]
    fn test_assemble_caps_cube_count() {
        let model = assemble(&cubes(MAX_CUBES + 5));
        assert_eq!(model.cube_count, MAX_CUBES);
        assert_eq!(model.vertices.len(), 24 * MAX_CUBES);
        assert_eq!(model.indices.len(), 36 * MAX_CUBES);
    }

    #[test]
    fn test_assemble_preserves_order() {
        let input = cubes(3);
        let model = assemble(&input);
        for (ordinal, cube) in input.iter().enumerate() {
            let block = &model.vertices[ordinal * 24..ordinal * 24 + 24];
            assert_eq!(block, &cube.vertices()[..]);
            let idx = &model.indices[ordinal * 36..ordinal * 36 + 36];
            assert_eq!(idx, &cube_indices(ordinal)[..]);
        }
    }

    #[test]
    fn test_model_identity() {
        let a = ModelSpec::new(cubes(2));
        let b = a.clone();
        let c = ModelSpec::new(cubes(2));
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.len(), 2);
        assert!(!a.is_empty());
    }
}
