//! Icon Configuration
//!
//! Camera, lighting, output and adapter settings for icon generation, in one
//! place so the look of generated icons can be tuned without touching code.
//! Loaded from JSON; every field is optional and falls back to the default.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::{CuboidSpec, ModelSpec};
use crate::render::{GpuContextConfig, SpaceConfig, light_direction_from_rotation, orthographic};

/// Errors raised while loading an [`IconConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Settings for rendering block icons.
///
/// The default camera looks at the origin from the upper south-east, so a
/// block shows its top, east and south faces with three distinct shades.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    // Output
    /// Icon width in pixels
    pub output_width: u32,
    /// Icon height in pixels
    pub output_height: u32,

    // Model
    /// Edge length of the rendered block in model units
    pub block_size: f32,

    // Camera
    /// Width of the orthographic view volume in model units
    pub ortho_width: f32,
    /// Height of the orthographic view volume in model units
    pub ortho_height: f32,
    pub near: f32,
    pub far: f32,
    /// Rotation of the eye around +Y, 0 = looking from +Z
    pub camera_yaw_degrees: f32,
    /// Elevation of the eye above the horizon
    pub camera_pitch_degrees: f32,
    /// Eye distance from the origin
    pub camera_distance: f32,

    // Lighting
    /// Light rotation about X, applied after the Y rotation
    pub light_pitch_degrees: f32,
    /// Light rotation about Y
    pub light_yaw_degrees: f32,
    /// Directional light color (RGB, linear)
    pub light_color: Vec3,
    /// Ambient light color (RGB, linear)
    pub ambient_color: Vec3,

    // Adapter
    pub high_performance: bool,
    pub force_fallback_adapter: bool,
    /// WGSL file replacing the embedded icon shader
    pub shader_path: Option<PathBuf>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            output_width: 256,
            output_height: 256,

            block_size: 16.0,

            // Covers the projected silhouette of a 16-unit block at any yaw
            ortho_width: 28.0,
            ortho_height: 28.0,
            near: 0.1,
            far: 64.0,
            camera_yaw_degrees: 45.0,
            camera_pitch_degrees: 30.0,
            camera_distance: 32.0,

            light_pitch_degrees: -50.0,
            light_yaw_degrees: 25.0,
            light_color: Vec3::splat(0.6),
            ambient_color: Vec3::splat(0.4),

            high_performance: true,
            force_fallback_adapter: false,
            shader_path: None,
        }
    }
}

impl IconConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: IconConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("[IconConfig] Loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "output size must be non-zero, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        if !(self.ortho_width > 0.0 && self.ortho_height > 0.0) {
            return Err(ConfigError::Invalid(
                "orthographic extents must be positive".to_string(),
            ));
        }
        if !(self.near < self.far) {
            return Err(ConfigError::Invalid(format!(
                "near ({}) must be less than far ({})",
                self.near, self.far
            )));
        }
        if !(self.block_size > 0.0) {
            return Err(ConfigError::Invalid("block size must be positive".to_string()));
        }
        Ok(())
    }

    /// Eye position for the configured yaw, pitch and distance.
    pub fn eye_position(&self) -> Vec3 {
        let yaw = self.camera_yaw_degrees.to_radians();
        let pitch = self.camera_pitch_degrees.to_radians();
        Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        ) * self.camera_distance
    }

    pub fn view_transform(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), Vec3::ZERO, Vec3::Y)
    }

    /// Transforms and lighting for a render batch.
    pub fn space(&self) -> SpaceConfig {
        SpaceConfig {
            model_transform: Mat4::IDENTITY,
            view_transform: self.view_transform(),
            projection_transform: orthographic(
                self.ortho_width,
                self.ortho_height,
                self.near,
                self.far,
            ),
            light_direction: light_direction_from_rotation(
                self.light_pitch_degrees.to_radians(),
                self.light_yaw_degrees.to_radians(),
            ),
            light_color: self.light_color,
            ambient_color: self.ambient_color,
        }
    }

    pub fn gpu_config(&self) -> GpuContextConfig {
        GpuContextConfig {
            high_performance: self.high_performance,
            force_fallback_adapter: self.force_fallback_adapter,
            ..Default::default()
        }
    }

    /// A full block centered at the origin with texture slot 0 on every face.
    pub fn block_model(&self) -> ModelSpec {
        ModelSpec::new(vec![CuboidSpec::from_size(Vec3::splat(self.block_size))])
    }
}
