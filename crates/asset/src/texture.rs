//! Texture decoding and the GPU upload seam.
//! Images are always expanded to RGBA8, whatever the source channel count.

use crate::error::{AssetError, AssetResult};

/// Decoded pixels, tightly packed RGBA8 rows, ready for upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Decode an image file into RGBA8.
    pub fn decode(path: &str) -> AssetResult<Self> {
        log::debug!("Decoding image {path}");

        let img = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_owned(),
            source,
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::debug!("Decoded {path}: {width}x{height}, {} bytes", data.len());

        Ok(Self { data, width, height })
    }
}

/// Opaque id of a graphics-resident texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Graphics-side storage the asset manager uploads decoded images into.
pub trait GpuTextures {
    /// Upload `rgba` (tightly packed, 4 bytes per pixel).
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;
    fn delete_texture(&mut self, handle: TextureHandle);
}

/// A cached, uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}
