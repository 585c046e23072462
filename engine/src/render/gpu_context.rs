//! GPU Context
//!
//! Headless GPU resource management for the icon renderer.
//! Centralizes device, queue, and the buffer helpers the environment uses.
//! No surface is created; every render goes to an offscreen texture.

use std::sync::mpsc;

use wgpu::util::DeviceExt;

use super::error::{RenderError, RenderResult};

/// Shared GPU resources
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

/// Configuration for GPU context creation
#[derive(Clone, Debug)]
pub struct GpuContextConfig {
    /// Prefer high-performance GPU
    pub high_performance: bool,
    /// Enable debug validation
    pub debug: bool,
    /// Ask for the software/fallback adapter (CI machines without a GPU)
    pub force_fallback_adapter: bool,
}

impl Default for GpuContextConfig {
    fn default() -> Self {
        Self {
            high_performance: true,
            debug: cfg!(debug_assertions),
            force_fallback_adapter: false,
        }
    }
}

/// Adapter names that indicate a CPU rasterizer.
fn is_software_adapter(name: &str, device_type: wgpu::DeviceType) -> bool {
    let name_lower = name.to_lowercase();
    name_lower.contains("llvmpipe")
        || name_lower.contains("lavapipe")
        || name_lower.contains("swiftshader")
        || name_lower.contains("warp")
        || device_type == wgpu::DeviceType::Cpu
}

impl GpuContext {
    /// Create a headless GPU context.
    pub fn new(config: &GpuContextConfig) -> RenderResult<Self> {
        let flags = if config.debug {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::empty()
        };
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: if config.high_performance {
                wgpu::PowerPreference::HighPerformance
            } else {
                wgpu::PowerPreference::LowPower
            },
            compatible_surface: None,
            force_fallback_adapter: config.force_fallback_adapter,
        }))?;

        let adapter_info = adapter.get_info();
        if is_software_adapter(&adapter_info.name, adapter_info.device_type) {
            log::info!(
                "[GpuContext] Software renderer detected ({}, {:?})",
                adapter_info.name,
                adapter_info.backend
            );
        } else {
            log::info!(
                "[GpuContext] GPU detected ({}, {:?})",
                adapter_info.name,
                adapter_info.backend
            );
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Icon Renderer Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            ..Default::default()
        }))?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Whether the adapter is a CPU rasterizer.
    pub fn is_software(&self) -> bool {
        is_software_adapter(&self.adapter_info.name, self.adapter_info.device_type)
    }

    /// Create a uniform buffer with initial data
    pub fn create_uniform_buffer<T: bytemuck::Pod>(&self, label: &str, data: &T) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Create a dynamic vertex buffer (can be updated)
    pub fn create_dynamic_vertex_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a dynamic index buffer (can be updated)
    pub fn create_dynamic_index_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a CPU-readable buffer that texture copies can land in.
    pub fn create_readback_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Write data to a buffer
    pub fn write_buffer<T: bytemuck::Pod>(&self, buffer: &wgpu::Buffer, data: &[T]) {
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(data));
    }

    /// Map `buffer` for reading, block until the GPU has written it, and hand
    /// the mapped bytes to `read`. The buffer is unmapped afterwards.
    pub fn read_buffer<R>(
        &self,
        buffer: &wgpu::Buffer,
        read: impl FnOnce(&[u8]) -> R,
    ) -> RenderResult<R> {
        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        if let Err(e) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
            // Cancel the pending map so the buffer can be mapped again
            buffer.unmap();
            return Err(e.into());
        }
        receiver.recv().map_err(|_| RenderError::ReadbackLost)??;

        let output = {
            let view = slice.get_mapped_range();
            let bytes: &[u8] = &view;
            read(bytes)
        };
        buffer.unmap();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_adapter_detection() {
        assert!(is_software_adapter(
            "llvmpipe (LLVM 15.0.7, 256 bits)",
            wgpu::DeviceType::Other
        ));
        assert!(is_software_adapter("Some Device", wgpu::DeviceType::Cpu));
        assert!(!is_software_adapter(
            "NVIDIA GeForce RTX 3070",
            wgpu::DeviceType::DiscreteGpu
        ));
    }

    #[test]
    fn test_default_config_prefers_hardware() {
        let config = GpuContextConfig::default();
        assert!(config.high_performance);
        assert!(!config.force_fallback_adapter);
    }

    /// Hardware adapter first, then the fallback rasterizer.
    fn try_context() -> Option<GpuContext> {
        let hardware = GpuContextConfig::default();
        let software = GpuContextConfig {
            force_fallback_adapter: true,
            ..hardware.clone()
        };
        let context = GpuContext::new(&hardware).or_else(|_| GpuContext::new(&software));
        match context {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                eprintln!("skipping GPU test, no adapter: {e}");
                None
            }
        }
    }

    #[test]
    fn test_read_buffer_blocks_until_written_and_can_repeat() {
        let Some(ctx) = try_context() else {
            return;
        };
        let buffer = ctx.create_readback_buffer("Test Readback", 16);

        for value in [7u32, 9] {
            ctx.write_buffer(&buffer, &[value; 4]);
            ctx.queue.submit(std::iter::empty());
            let read: Vec<u32> = ctx
                .read_buffer(&buffer, |bytes| bytemuck::cast_slice(bytes).to_vec())
                .unwrap();
            assert_eq!(read, vec![value; 4]);
        }
    }
}
