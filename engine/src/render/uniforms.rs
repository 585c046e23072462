//! Uniform Structs for GPU Shaders
//!
//! Contains the space/light uniform block consumed by `icon.wgsl`. The layout
//! must match the WGSL `SpaceUniforms` struct exactly.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Transforms and lighting for one render, packed for bind group 0.
///
/// WGSL uniform layout (304 bytes total):
///   offset   0: model (mat4x4<f32>)         = 64 bytes
///   offset  64: normal (mat4x4<f32>)        = 64 bytes (inverse-transpose of model)
///   offset 128: view (mat4x4<f32>)          = 64 bytes
///   offset 192: projection (mat4x4<f32>)    = 64 bytes
///   offset 256: light_direction (vec4<f32>) = 16 bytes (w unused)
///   offset 272: light_color (vec4<f32>)     = 16 bytes (w unused)
///   offset 288: ambient_color (vec4<f32>)   = 16 bytes (w unused)
///   Total: 304 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpaceUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

static_assertions::assert_eq_size!(SpaceUniforms, [u8; 304]);

impl SpaceUniforms {
    pub const BYTE_SIZE: u64 = std::mem::size_of::<SpaceUniforms>() as u64;
}

impl Default for SpaceUniforms {
    fn default() -> Self {
        SpaceConfig::default().to_uniforms()
    }
}

/// Camera and lighting setup for a render batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Applied to the whole model before the view transform
    pub model_transform: Mat4,
    pub view_transform: Mat4,
    pub projection_transform: Mat4,
    /// Direction the light travels (normalized on upload)
    pub light_direction: Vec3,
    /// Directional light color (RGB, linear)
    pub light_color: Vec3,
    /// Ambient term added to every face (RGB, linear)
    pub ambient_color: Vec3,
}

impl Default for SpaceConfig {
    /// Icon defaults: identity model/view, a 16x16 orthographic box 32 units
    /// deep, white light falling down and to the east, dim ambient.
    fn default() -> Self {
        Self {
            model_transform: Mat4::IDENTITY,
            view_transform: Mat4::IDENTITY,
            projection_transform: orthographic(16.0, 16.0, 0.0, 32.0),
            light_direction: Vec3::new(0.5, -1.0, 0.0).normalize(),
            light_color: Vec3::ONE,
            ambient_color: Vec3::splat(0.2),
        }
    }
}

impl SpaceConfig {
    /// Pack into the GPU uniform layout.
    pub fn to_uniforms(&self) -> SpaceUniforms {
        SpaceUniforms {
            model: self.model_transform.to_cols_array_2d(),
            normal: normal_matrix(self.model_transform).to_cols_array_2d(),
            view: self.view_transform.to_cols_array_2d(),
            projection: self.projection_transform.to_cols_array_2d(),
            light_direction: self.light_direction.normalize_or_zero().extend(0.0).to_array(),
            light_color: self.light_color.extend(0.0).to_array(),
            ambient_color: self.ambient_color.extend(0.0).to_array(),
        }
    }
}

/// Inverse-transpose of the linear part of `model`, for transforming normals.
/// A singular matrix falls back to the linear part itself.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    let linear = Mat3::from_mat4(model);
    let det = linear.determinant();
    if det == 0.0 || !det.is_finite() {
        return Mat4::from_mat3(linear);
    }
    Mat4::from_mat3(linear.inverse().transpose())
}

/// Centered right-handed orthographic projection with a `[0, 1]` depth range.
pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh(
        -width / 2.0,
        width / 2.0,
        -height / 2.0,
        height / 2.0,
        near,
        far,
    )
}
