//! Cuboid Icon Renderer
//!
//! Offscreen rendering of block-style models (lists of textured cuboids) into
//! RGBA images, for inventory icons and previews. Rendering is headless and
//! synchronous: each call blocks until the pixels are back on the CPU.
//!
//! # Modules
//!
//! - [`mesh`] - Cuboid vertex generation, index pattern, model assembly
//! - [`render`] - wgpu environment, resource pooling, render batches
//! - [`config`] - JSON icon settings (camera, lighting, output)
//! - [`texture_io`] - PNG textures in, PNG icons out
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use mcmod_icon_engine::mesh::{CuboidSpec, ModelSpec};
//! use mcmod_icon_engine::render::{
//!     GpuContextConfig, IconEnvironment, RenderBatchBuilder, TextureData,
//! };
//!
//! let mut env = IconEnvironment::new(&GpuContextConfig::default())?;
//! let model = ModelSpec::new(vec![CuboidSpec::from_size(Vec3::splat(16.0))]);
//!
//! let mut batch = RenderBatchBuilder::new(&mut env)
//!     .with_model(model)
//!     .with_output_size(64, 64)
//!     .with_light_rotation(-0.9, 0.4)
//!     .build()?;
//!
//! let stone = TextureData::solid(16, 16, [128, 128, 128, 255]);
//! let pixels: &[u8] = batch.render(&[stone])?; // 64 * 64 * 4 bytes
//! batch.dispose();
//! ```

pub mod config;
pub mod mesh;
pub mod render;
pub mod texture_io;

pub use config::{ConfigError, IconConfig};
pub use mesh::{CubeVertex, CuboidSpec, Face, FaceSet, ModelSpec};
pub use render::{
    IconEnvironment, RenderBatch, RenderBatchBuilder, RenderError, RenderResult, SpaceConfig,
    TextureData,
};
