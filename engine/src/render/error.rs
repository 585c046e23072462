//! Render Errors

use thiserror::Error;

/// Errors raised by the icon renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The environment was torn down with [`super::IconEnvironment::dispose`].
    #[error("render environment has been disposed")]
    Disposed,

    /// A batch was built without calling `with_model`.
    #[error("render batch requires a model")]
    MissingModel,

    #[error("expected 1 to {max} input textures, got {count}")]
    TextureCount { count: usize, max: usize },

    #[error("texture {slot} is {width}x{height} but carries {actual} bytes (expected {expected})")]
    TextureSize {
        slot: usize,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("texture {slot} has zero size")]
    EmptyTexture { slot: usize },

    #[error("output size must be non-zero, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },

    #[error("no suitable GPU adapter found: {0}")]
    AdapterNotFound(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("device poll failed: {0}")]
    DevicePoll(#[from] wgpu::PollError),

    #[error("readback channel closed before the GPU finished")]
    ReadbackLost,

    #[error("failed to read shader {path}: {source}")]
    ShaderLoad {
        path: String,
        source: std::io::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
