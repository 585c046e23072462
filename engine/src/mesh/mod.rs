//! Mesh Module
//!
//! CPU-side geometry for cuboid models: per-cube vertex generation, the fixed
//! index pattern, and model assembly into flat GPU-ready arrays.

pub mod corner;
pub mod cuboid;
pub mod faces;
pub mod indices;
pub mod model;

pub use corner::{Axis, Corner, Direction, UvCorner};
pub use cuboid::{CubeVertex, CuboidSpec, VERTICES_PER_CUBE};
pub use faces::{Face, FaceSet};
pub use indices::{INDICES_PER_CUBE, MAX_CUBES, ORDINAL_STRIDE, cube_indices};
pub use model::{AssembledModel, ModelId, ModelSpec, assemble};
