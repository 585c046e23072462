//! Render Batches
//!
//! A [`RenderBatch`] pairs one model with one camera/light setup and one
//! output size, and renders it against any number of texture sets. Batches
//! borrow their [`IconEnvironment`] mutably, so renders are strictly ordered
//! and the returned pixels cannot outlive the next render.

use std::cell::OnceCell;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use crate::mesh::ModelSpec;

use super::environment::{BYTES_PER_PIXEL, IconEnvironment, OutputTarget};
use super::error::{RenderError, RenderResult};
use super::uniforms::{SpaceConfig, SpaceUniforms, orthographic};

/// Default icon edge length in pixels.
pub const DEFAULT_OUTPUT_SIZE: u32 = 256;

/// One RGBA8 input texture, tightly packed, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// A single-color texture.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self::new(width, height, color.repeat(pixels))
    }

    /// Byte length a `width` x `height` RGBA8 image must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL as usize
    }

    /// Check the dimensions and byte length, reporting `slot` on failure.
    pub fn validate(&self, slot: usize) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyTexture { slot });
        }
        if self.rgba.len() != self.expected_len() {
            return Err(RenderError::TextureSize {
                slot,
                width: self.width,
                height: self.height,
                expected: self.expected_len(),
                actual: self.rgba.len(),
            });
        }
        Ok(())
    }
}

/// Output size of a batch. The shared target is resolved on first render.
#[derive(Debug)]
pub struct RenderTargetSpec {
    pub width: u32,
    pub height: u32,
    resolved: OnceCell<Rc<OutputTarget>>,
}

impl RenderTargetSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resolved: OnceCell::new(),
        }
    }

    /// Bytes returned by each render of this size.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL as usize
    }

    fn resolve(&self, env: &mut IconEnvironment) -> RenderResult<Rc<OutputTarget>> {
        if let Some(target) = self.resolved.get() {
            return Ok(Rc::clone(target));
        }
        let target = env.output_target(self.width, self.height)?;
        let _ = self.resolved.set(Rc::clone(&target));
        Ok(target)
    }
}

/// A model, a space setup and an output size, bound to an environment.
pub struct RenderBatch<'env> {
    env: &'env mut IconEnvironment,
    model: ModelSpec,
    uniforms: SpaceUniforms,
    target: RenderTargetSpec,
}

impl<'env> RenderBatch<'env> {
    pub fn new(
        env: &'env mut IconEnvironment,
        model: ModelSpec,
        space: &SpaceConfig,
        target: RenderTargetSpec,
    ) -> RenderResult<Self> {
        if env.is_disposed() {
            return Err(RenderError::Disposed);
        }
        if target.width == 0 || target.height == 0 {
            return Err(RenderError::EmptyTarget {
                width: target.width,
                height: target.height,
            });
        }
        Ok(Self {
            env,
            model,
            uniforms: space.to_uniforms(),
            target,
        })
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn target(&self) -> &RenderTargetSpec {
        &self.target
    }

    /// Render with `textures` bound to slots 0.. and return
    /// `width * height * 4` RGBA bytes.
    pub fn render(&mut self, textures: &[TextureData]) -> RenderResult<&[u8]> {
        let target = self.target.resolve(self.env)?;
        self.env
            .render(&self.model, &self.uniforms, &target, textures)
    }

    /// End the batch. Pooled resources stay in the environment.
    pub fn dispose(self) {
        log::debug!(
            "[RenderBatch] Disposed {}x{} batch ({} cubes)",
            self.target.width,
            self.target.height,
            self.model.len()
        );
    }
}

/// Fluent setup of a [`RenderBatch`] with icon defaults.
pub struct RenderBatchBuilder<'env> {
    env: &'env mut IconEnvironment,
    model: Option<ModelSpec>,
    width: u32,
    height: u32,
    space: SpaceConfig,
}

impl<'env> RenderBatchBuilder<'env> {
    pub fn new(env: &'env mut IconEnvironment) -> Self {
        Self {
            env,
            model: None,
            width: DEFAULT_OUTPUT_SIZE,
            height: DEFAULT_OUTPUT_SIZE,
            space: SpaceConfig::default(),
        }
    }

    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_model_transform(mut self, transform: Mat4) -> Self {
        self.space.model_transform = transform;
        self
    }

    pub fn with_view_transform(mut self, transform: Mat4) -> Self {
        self.space.view_transform = transform;
        self
    }

    /// Centered orthographic box `width` x `height`, depth `near..far`.
    pub fn with_orthographic_projection(mut self, width: f32, height: f32, near: f32, far: f32) -> Self {
        self.space.projection_transform = orthographic(width, height, near, far);
        self
    }

    /// Perspective projection; `fov_y` in radians.
    pub fn with_perspective_projection(mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        self.space.projection_transform = Mat4::perspective_rh(fov_y, aspect, near, far);
        self
    }

    pub fn with_light_direction(mut self, direction: Vec3) -> Self {
        self.space.light_direction = direction;
        self
    }

    /// Light pointing down -Z, rotated by `ry` about Y and then `rx` about X
    /// (radians).
    pub fn with_light_rotation(mut self, rx: f32, ry: f32) -> Self {
        self.space.light_direction = light_direction_from_rotation(rx, ry);
        self
    }

    pub fn with_light_color(mut self, color: Vec3) -> Self {
        self.space.light_color = color;
        self
    }

    pub fn with_ambient_light_color(mut self, color: Vec3) -> Self {
        self.space.ambient_color = color;
        self
    }

    /// Replace all transforms and lighting at once.
    pub fn with_space(mut self, space: SpaceConfig) -> Self {
        self.space = space;
        self
    }

    pub fn space(&self) -> &SpaceConfig {
        &self.space
    }

    pub fn build(self) -> RenderResult<RenderBatch<'env>> {
        if self.env.is_disposed() {
            return Err(RenderError::Disposed);
        }
        let model = self.model.ok_or(RenderError::MissingModel)?;
        RenderBatch::new(
            self.env,
            model,
            &self.space,
            RenderTargetSpec::new(self.width, self.height),
        )
    }
}

/// -Z rotated about Y by `ry`, then about X by `rx`.
pub fn light_direction_from_rotation(rx: f32, ry: f32) -> Vec3 {
    Quat::from_rotation_x(rx) * (Quat::from_rotation_y(ry) * Vec3::NEG_Z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_texture_validation() {
        assert!(TextureData::solid(4, 2, [1, 2, 3, 4]).validate(0).is_ok());
        assert!(matches!(
            TextureData::new(0, 4, Vec::new()).validate(3),
            Err(RenderError::EmptyTexture { slot: 3 })
        ));
        assert!(matches!(
            TextureData::new(2, 2, vec![0; 12]).validate(0),
            Err(RenderError::TextureSize { expected: 16, actual: 12, .. })
        ));
    }

    #[test]
    fn test_solid_texture_layout() {
        let tex = TextureData::solid(2, 1, [10, 20, 30, 40]);
        assert_eq!(tex.rgba, vec![10, 20, 30, 40, 10, 20, 30, 40]);
    }

    #[test]
    fn test_target_byte_len() {
        assert_eq!(RenderTargetSpec::new(16, 16).byte_len(), 1024);
        assert_eq!(RenderTargetSpec::new(256, 256).byte_len(), 262_144);
    }

    #[test]
    fn test_light_rotation_identity() {
        assert!(approx(light_direction_from_rotation(0.0, 0.0), Vec3::NEG_Z));
    }

    #[test]
    fn test_light_rotation_yaw_then_pitch() {
        // -Z about Y by 90 degrees points down -X; the X rotation leaves it there
        assert!(approx(light_direction_from_rotation(0.0, FRAC_PI_2), Vec3::NEG_X));
        assert!(approx(
            light_direction_from_rotation(FRAC_PI_2, FRAC_PI_2),
            Vec3::NEG_X
        ));
        // -Z about X by +90 degrees points up, by -90 degrees down
        assert!(approx(light_direction_from_rotation(FRAC_PI_2, 0.0), Vec3::Y));
        assert!(approx(light_direction_from_rotation(-FRAC_PI_2, 0.0), Vec3::NEG_Y));
    }
}
