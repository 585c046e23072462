//! Cuboid Mesh Builder
//!
//! Turns one [`CuboidSpec`] into the 24 vertices the icon pipeline draws.
//!
//! # Vertex layout
//!
//! The 24 vertices are three blocks of 8, one per axis. Within a block the
//! vertex at offset `i` is corner `i` (see [`Corner`]) shaded as part of the
//! face that corner lies on for that axis:
//!
//! ```text
//! [ 0.. 8) X block: west/east faces
//! [ 8..16) Y block: bottom/top faces
//! [16..24) Z block: north/south faces
//! ```
//!
//! [`super::indices::cube_indices`] addresses vertices by these fixed offsets.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use super::corner::{Axis, Corner};
use super::faces::{Face, FaceSet};

/// Vertices emitted per cuboid (4 per face, 6 faces).
pub const VERTICES_PER_CUBE: usize = 24;

/// GPU vertex for the icon pipeline.
///
/// Layout (36 bytes, tightly packed):
///   offset  0: position (vec3<f32>)
///   offset 12: normal (vec3<f32>)
///   offset 24: tex_coord (vec2<f32>)
///   offset 32: texture_index (u32)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub texture_index: u32,
}

static_assertions::assert_eq_size!(CubeVertex, [u8; 36]);

impl CubeVertex {
    /// Size of one vertex in the vertex buffer.
    pub const BYTE_SIZE: u64 = std::mem::size_of::<CubeVertex>() as u64;

    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Uint32,
    ];

    /// Vertex buffer layout matching `VertexInput` in `icon.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::BYTE_SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Declarative description of one textured box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuboidSpec {
    /// Half the edge length on each axis.
    pub half_extents: Vec3,
    /// Affine transform applied to the box corners (rotation, scale, shear, translation).
    pub transform: Mat4,
    /// Per face `[u0, v0, u1, v1]` texture rectangle.
    pub uvs: FaceSet<[f32; 4]>,
    /// Per face texture slot (0..6) of the render's input textures.
    pub texture_slots: FaceSet<u8>,
}

impl CuboidSpec {
    pub fn new(
        half_extents: Vec3,
        transform: Mat4,
        uvs: FaceSet<[f32; 4]>,
        texture_slots: FaceSet<u8>,
    ) -> Self {
        Self {
            half_extents,
            transform,
            uvs,
            texture_slots,
        }
    }

    /// Box with full edge lengths `size`, centered at the origin, identity
    /// transform, whole texture `0` on every face.
    pub fn from_size(size: Vec3) -> Self {
        Self::new(
            size / 2.0,
            Mat4::IDENTITY,
            FaceSet::splat([0.0, 0.0, 1.0, 1.0]),
            FaceSet::splat(0),
        )
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_uvs(mut self, uvs: FaceSet<[f32; 4]>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_texture_slots(mut self, texture_slots: FaceSet<u8>) -> Self {
        self.texture_slots = texture_slots;
        self
    }

    /// The 8 transformed corner positions, indexed by corner code.
    pub fn corner_positions(&self) -> [Vec3; 8] {
        Corner::ALL.map(|corner| {
            let local = Vec3::from_array(corner.signs()) * self.half_extents;
            self.transform.transform_point3(local)
        })
    }

    /// Outward face normals after the transform.
    ///
    /// Uses the inverse-transpose of the linear part. A singular transform
    /// keeps the canonical normals.
    pub fn face_normals(&self) -> FaceSet<Vec3> {
        let linear = Mat3::from_mat4(self.transform);
        let det = linear.determinant();
        let canonical = FaceSet::new(Face::ALL).map(|_, face| face.canonical_normal());
        if det == 0.0 || !det.is_finite() {
            return canonical;
        }

        let normal_matrix = linear.inverse().transpose();
        canonical.map(|_, n| {
            let transformed = (normal_matrix * *n).normalize_or_zero();
            if transformed == Vec3::ZERO {
                *n
            } else {
                transformed
            }
        })
    }

    /// Build the 24 vertices of this cuboid in axis-major order.
    pub fn vertices(&self) -> [CubeVertex; VERTICES_PER_CUBE] {
        let positions = self.corner_positions();
        let normals = self.face_normals();

        std::array::from_fn(|slot| {
            let axis = Axis::ALL[slot / 8];
            let corner = Corner::ALL[slot % 8];
            let face = corner.face_on(axis);

            CubeVertex {
                position: positions[slot % 8].to_array(),
                normal: normals[face].to_array(),
                tex_coord: corner.uv_corner(axis).select(self.uvs[face]),
                texture_index: u32::from(self.texture_slots[face]),
            }
        })
    }
}
