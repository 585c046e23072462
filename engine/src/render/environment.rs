//! Icon Environment
//!
//! Owns the headless device, the icon pipeline, fixed-capacity geometry
//! buffers and every pool/cache shared by render batches. One environment
//! serves any number of batches; it stays on the thread that created it.
//!
//! Render flow (see [`IconEnvironment::render`]):
//! 1. Validate input textures and lease pooled GPU textures for them
//! 2. Fetch or build the texture bind group
//! 3. Upload geometry/uniforms only when they differ from what is resident
//! 4. Draw each cube, copy the color target into its staging buffer
//! 5. Block until the copy is mapped and strip row padding

use std::rc::Rc;

use crate::mesh::{CubeVertex, INDICES_PER_CUBE, MAX_CUBES, ModelSpec, VERTICES_PER_CUBE};

use super::batch::TextureData;
use super::error::{RenderError, RenderResult};
use super::gpu_context::{GpuContext, GpuContextConfig};
use super::pipeline::{
    COLOR_FORMAT, DEPTH_FORMAT, IconPipeline, MAX_TEXTURES, SAMPLER_BINDING, TEXTURE_FORMAT,
    create_icon_sampler,
};
use super::resource_pool::{BindingCache, Lease, ResourcePool, SizeKey, TargetCache};
use super::shader_loader::ShaderSource;
use super::state_cache::RenderStateCache;
use super::uniforms::SpaceUniforms;

/// Bytes per pixel of input textures and output targets.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Vertex buffer capacity in bytes.
pub const VERTEX_BUFFER_SIZE: u64 = (MAX_CUBES * VERTICES_PER_CUBE) as u64 * CubeVertex::BYTE_SIZE;
/// Index buffer capacity in bytes (`u32` indices).
pub const INDEX_BUFFER_SIZE: u64 =
    (MAX_CUBES * INDICES_PER_CUBE) as u64 * std::mem::size_of::<u32>() as u64;

/// `base_vertex` step per cube ordinal. Indices already carry `8 * ordinal`,
/// so the effective vertex is `24 * ordinal + local`.
const BASE_VERTEX_STRIDE: i32 = 16;

/// Row pitch of a `width`-pixel RGBA row in a texture-to-buffer copy.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copy `height` rows of `width` RGBA pixels out of a padded staging image.
fn strip_row_padding(padded: &[u8], out: &mut Vec<u8>, width: u32, height: u32) {
    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let pitch = padded_bytes_per_row(width) as usize;
    out.clear();
    out.reserve(row_bytes * height as usize);
    for row in padded.chunks(pitch).take(height as usize) {
        out.extend_from_slice(&row[..row_bytes]);
    }
}

/// Counters for resource reuse, cumulative over the environment's life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub textures_allocated: usize,
    pub targets_created: usize,
    pub geometry_uploads: usize,
    pub uniform_uploads: usize,
    pub bind_groups_built: usize,
    pub bind_groups_reused: usize,
    pub renders: usize,
}

/// A pooled input texture. `id` keys the single-texture bind group cache.
pub struct PooledTexture {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Color + depth attachments of one output size, plus the staging buffer the
/// color image is copied into for readback.
pub struct OutputTarget {
    pub width: u32,
    pub height: u32,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    staging: wgpu::Buffer,
}

impl OutputTarget {
    fn new(gpu: &GpuContext, (width, height): SizeKey) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Icon Color Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Icon Depth Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let staging = gpu.create_readback_buffer(
            "Icon Readback Buffer",
            padded_bytes_per_row(width) as u64 * height as u64,
        );

        log::debug!("[IconEnvironment] Created {}x{} output target", width, height);

        Self {
            width,
            height,
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            staging,
        }
    }

    /// Bytes of a tightly packed RGBA image of this target.
    pub fn byte_len(&self) -> usize {
        (self.width * self.height * BYTES_PER_PIXEL) as usize
    }
}

impl std::fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputTarget")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Everything that is released by [`IconEnvironment::dispose`].
struct EnvironmentResources {
    gpu: GpuContext,
    pipeline: IconPipeline,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    space_bind_group: wgpu::BindGroup,
    textures: ResourcePool<PooledTexture>,
    targets: TargetCache<OutputTarget>,
    single_texture_groups: BindingCache<u64, wgpu::BindGroup>,
    state: RenderStateCache,
    next_texture_id: u64,
    readback: Vec<u8>,
}

/// Shared GPU state for icon rendering.
pub struct IconEnvironment {
    resources: Option<EnvironmentResources>,
    stats: RenderStats,
}

impl IconEnvironment {
    /// Create an environment with the embedded icon shader.
    pub fn new(config: &GpuContextConfig) -> RenderResult<Self> {
        Self::with_shader(config, &ShaderSource::icon_or_file(None)?)
    }

    /// Create an environment with an explicit shader source.
    pub fn with_shader(config: &GpuContextConfig, shader: &ShaderSource) -> RenderResult<Self> {
        let gpu = GpuContext::new(config)?;
        let pipeline = IconPipeline::new(&gpu.device, shader);
        let sampler = create_icon_sampler(&gpu.device);

        let vertex_buffer = gpu.create_dynamic_vertex_buffer("Icon Vertex Buffer", VERTEX_BUFFER_SIZE);
        let index_buffer = gpu.create_dynamic_index_buffer("Icon Index Buffer", INDEX_BUFFER_SIZE);
        let uniform_buffer = gpu.create_uniform_buffer("Icon Space Uniforms", &SpaceUniforms::default());

        let space_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Icon Space Bind Group"),
            layout: &pipeline.space_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "[IconEnvironment] Ready: {} KB vertex buffer, {} KB index buffer",
            VERTEX_BUFFER_SIZE / 1024,
            INDEX_BUFFER_SIZE / 1024
        );

        Ok(Self {
            resources: Some(EnvironmentResources {
                gpu,
                pipeline,
                sampler,
                vertex_buffer,
                index_buffer,
                uniform_buffer,
                space_bind_group,
                textures: ResourcePool::new(),
                targets: TargetCache::new(),
                single_texture_groups: BindingCache::new(),
                state: RenderStateCache::new(),
                next_texture_id: 0,
                readback: Vec::new(),
            }),
            stats: RenderStats::default(),
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.resources.is_none()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Name and backend of the adapter in use.
    pub fn adapter_info(&self) -> RenderResult<&wgpu::AdapterInfo> {
        Ok(&self.resources()?.gpu.adapter_info)
    }

    /// Release every GPU object. Later operations fail with [`RenderError::Disposed`].
    pub fn dispose(&mut self) {
        if let Some(resources) = self.resources.take() {
            log::debug!(
                "[IconEnvironment] Disposing ({} renders, {} textures, {} targets)",
                self.stats.renders,
                self.stats.textures_allocated,
                self.stats.targets_created
            );
            drop(resources);
        }
    }

    fn resources(&self) -> RenderResult<&EnvironmentResources> {
        self.resources.as_ref().ok_or(RenderError::Disposed)
    }

    /// Shared output target for `width` x `height`, created on first use.
    pub fn output_target(&mut self, width: u32, height: u32) -> RenderResult<Rc<OutputTarget>> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTarget { width, height });
        }
        let res = self.resources.as_mut().ok_or(RenderError::Disposed)?;
        let EnvironmentResources { gpu, targets, .. } = res;
        let gpu: &GpuContext = gpu;
        let before = targets.creations();
        let target = targets.get_or_create((width, height), |size| OutputTarget::new(gpu, size));
        self.stats.targets_created += targets.creations() - before;
        Ok(target)
    }

    /// Render `model` into `target` and return its RGBA pixels.
    ///
    /// The returned slice borrows the environment's readback buffer and is
    /// overwritten by the next render.
    pub fn render(
        &mut self,
        model: &ModelSpec,
        uniforms: &SpaceUniforms,
        target: &OutputTarget,
        textures: &[TextureData],
    ) -> RenderResult<&[u8]> {
        validate_textures(textures)?;

        let stats = &mut self.stats;
        let res = self.resources.as_mut().ok_or(RenderError::Disposed)?;
        let EnvironmentResources {
            gpu,
            pipeline,
            sampler,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            space_bind_group,
            textures: texture_pool,
            single_texture_groups,
            state,
            next_texture_id,
            readback,
            ..
        } = res;
        let gpu: &GpuContext = gpu;

        // Leases go back to the pool when this function returns, on any path
        let leases: Vec<Lease<PooledTexture>> = textures
            .iter()
            .map(|data| {
                let lease = texture_pool.acquire_with((data.width, data.height), |size| {
                    stats.textures_allocated += 1;
                    *next_texture_id += 1;
                    create_pooled_texture(gpu, *next_texture_id, size)
                });
                upload_texture(gpu, &lease, data);
                lease
            })
            .collect();

        let texture_group = if let [only] = leases.as_slice() {
            let mut built = false;
            let group = single_texture_groups.get_or_build(only.id, || {
                built = true;
                build_texture_bind_group(gpu, pipeline, sampler, &[&only.view])
            });
            if built {
                stats.bind_groups_built += 1;
            } else {
                stats.bind_groups_reused += 1;
            }
            group
        } else {
            let views: Vec<&wgpu::TextureView> = leases.iter().map(|lease| &lease.view).collect();
            stats.bind_groups_built += 1;
            Rc::new(build_texture_bind_group(gpu, pipeline, sampler, &views))
        };

        let (resident, geometry_uploaded) = state.sync_model(model, |assembled| {
            if !assembled.vertices.is_empty() {
                gpu.write_buffer(vertex_buffer, &assembled.vertices);
                gpu.write_buffer(index_buffer, &assembled.indices);
            }
        });
        if geometry_uploaded {
            stats.geometry_uploads += 1;
            log::debug!(
                "[IconEnvironment] Uploaded geometry: {} cubes, {} indices",
                resident.cube_count,
                resident.index_count
            );
        }
        if state.sync_space(uniforms, |block| gpu.write_buffer(uniform_buffer, &[*block])) {
            stats.uniform_uploads += 1;
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Icon Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Icon Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &*space_bind_group, &[]);
            pass.set_bind_group(1, &*texture_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.set_viewport(0.0, 0.0, target.width as f32, target.height as f32, 0.0, 1.0);

            // Indices step 8 per cube but vertices step 24, so each cube needs its own base_vertex
            for ordinal in 0..resident.cube_count as u32 {
                let first = ordinal * INDICES_PER_CUBE as u32;
                pass.draw_indexed(
                    first..first + INDICES_PER_CUBE as u32,
                    BASE_VERTEX_STRIDE * ordinal as i32,
                    0..1,
                );
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(target.width)),
                    rows_per_image: Some(target.height),
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        gpu.read_buffer(&target.staging, |padded| {
            strip_row_padding(padded, readback, target.width, target.height)
        })?;
        drop(leases);

        stats.renders += 1;
        Ok(&readback[..target.byte_len()])
    }
}

impl Drop for IconEnvironment {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Reject texture sets the pipeline cannot bind.
fn validate_textures(textures: &[TextureData]) -> RenderResult<()> {
    if textures.is_empty() || textures.len() > MAX_TEXTURES {
        return Err(RenderError::TextureCount {
            count: textures.len(),
            max: MAX_TEXTURES,
        });
    }
    for (slot, data) in textures.iter().enumerate() {
        data.validate(slot)?;
    }
    Ok(())
}

fn create_pooled_texture(gpu: &GpuContext, id: u64, (width, height): SizeKey) -> PooledTexture {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Icon Input Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    log::debug!("[IconEnvironment] Allocated {}x{} input texture #{}", width, height, id);
    PooledTexture { id, texture, view }
}

/// Pixels are written on every acquire; pooled textures carry no content.
fn upload_texture(gpu: &GpuContext, pooled: &PooledTexture, data: &TextureData) {
    gpu.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &pooled.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(BYTES_PER_PIXEL * data.width),
            rows_per_image: Some(data.height),
        },
        wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        },
    );
}

/// Bind `views` to texture slots 0.. in order. Unused slots repeat the first
/// view so every binding stays valid.
fn build_texture_bind_group(
    gpu: &GpuContext,
    pipeline: &IconPipeline,
    sampler: &wgpu::Sampler,
    views: &[&wgpu::TextureView],
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry> = (0..MAX_TEXTURES)
        .map(|slot| wgpu::BindGroupEntry {
            binding: slot as u32,
            resource: wgpu::BindingResource::TextureView(views.get(slot).unwrap_or(&views[0])),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: SAMPLER_BINDING,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Icon Texture Bind Group"),
        layout: &pipeline.texture_layout,
        entries: &entries,
    })
}
