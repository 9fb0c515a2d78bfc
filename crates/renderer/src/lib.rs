//! Renderer-side texture storage behind the asset manager's upload seam.
//! `WgpuTextures` owns a headless wgpu device; `CpuTextures` keeps pixels in
//! memory for tools and machines without a usable adapter.

use std::collections::HashMap;

use asset::{GpuTextures, TextureHandle};
use thiserror::Error;
use wgpu::{
    Backends, Device, DeviceDescriptor, Extent3d, Features, Instance, InstanceDescriptor, Limits,
    Origin3d, PowerPreference, Queue, RequestAdapterOptions, TexelCopyBufferLayout,
    TexelCopyTextureInfo, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages,
};

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("request_device failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Decoded textures kept in host memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct CpuTextures {
    next: u64,
    textures: HashMap<TextureHandle, CpuTexture>,
}

impl CpuTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&CpuTexture> {
        self.textures.get(&handle)
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl GpuTextures for CpuTextures {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
        self.next += 1;
        let handle = TextureHandle(self.next);
        self.textures.insert(
            handle,
            CpuTexture {
                width,
                height,
                rgba: rgba.to_vec(),
            },
        );
        handle
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_none() {
            log::warn!("Deleting unknown texture {handle:?}");
        }
    }
}

/// Textures uploaded to a wgpu device.
pub struct WgpuTextures {
    device: Device,
    queue: Queue,
    next: u64,
    textures: HashMap<TextureHandle, wgpu::Texture>,
}

impl WgpuTextures {
    /// Create a device without a surface on one of `backends`.
    pub async fn new(backends: Backends) -> Result<Self, RendererError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Ember3D Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        Ok(Self {
            device,
            queue,
            next: 0,
            textures: HashMap::new(),
        })
    }

    pub fn new_blocking(backends: Backends) -> Result<Self, RendererError> {
        pollster::block_on(Self::new(backends))
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl GpuTextures for WgpuTextures {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
        let size = Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("Asset texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if width > 0 && height > 0 {
            self.queue.write_texture(
                TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: Origin3d::ZERO,
                    aspect: TextureAspect::All,
                },
                rgba,
                TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );
        }

        self.next += 1;
        let handle = TextureHandle(self.next);
        self.textures.insert(handle, texture);
        log::debug!("Uploaded texture {handle:?} {width}x{height}");
        handle
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        match self.textures.remove(&handle) {
            Some(texture) => texture.destroy(),
            None => log::warn!("Deleting unknown texture {handle:?}"),
        }
    }
}
