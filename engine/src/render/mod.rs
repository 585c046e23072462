//! Render Module
//!
//! Headless wgpu rendering of cuboid models into RGBA icon images.
//! An [`IconEnvironment`] owns the device and all pooled GPU objects;
//! [`RenderBatch`]es borrow it to render one model at one size.

pub mod batch;
pub mod binding_validator;
pub mod environment;
pub mod error;
pub mod gpu_context;
pub mod pipeline;
pub mod resource_pool;
pub mod shader_loader;
pub mod state_cache;
pub mod uniforms;

pub use batch::{
    DEFAULT_OUTPUT_SIZE, RenderBatch, RenderBatchBuilder, RenderTargetSpec, TextureData,
    light_direction_from_rotation,
};
pub use environment::{IconEnvironment, OutputTarget, RenderStats, padded_bytes_per_row};
pub use error::{RenderError, RenderResult};
pub use gpu_context::{GpuContext, GpuContextConfig};
pub use pipeline::{COLOR_FORMAT, DEPTH_FORMAT, IconPipeline, MAX_TEXTURES};
pub use shader_loader::{ShaderSource, create_shader_module, load_shader_file};
pub use state_cache::{RenderStateCache, ResidentModel};
pub use uniforms::{SpaceConfig, SpaceUniforms, orthographic};
