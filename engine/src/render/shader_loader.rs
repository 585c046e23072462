//! Shader Loading Utilities
//!
//! The icon shader is embedded at compile time. A runtime file can replace it
//! (see `IconConfig::shader_path`) for iterating on shading without a rebuild.

use std::path::Path;

use super::error::RenderError;

/// Shader source that can be either embedded at compile time or loaded at runtime.
pub enum ShaderSource {
    /// Embedded shader source (no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }

    /// The embedded source, or the file at `path` when one is given.
    pub fn icon_or_file(path: Option<&Path>) -> Result<ShaderSource, RenderError> {
        match path {
            Some(path) => load_shader_file(path),
            None => Ok(ShaderSource::Embedded(embedded::ICON)),
        }
    }
}

/// Load a WGSL shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, RenderError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| RenderError::ShaderLoad {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("[ShaderLoader] Loaded shader override from {}", path.display());
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &ShaderSource,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}

/// Shaders compiled into the binary.
pub mod embedded {
    /// Textured, directionally lit cuboid shader.
    pub const ICON: &str = include_str!("../../../shaders/icon.wgsl");
}
