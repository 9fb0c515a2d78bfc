//! Asset loading/parsers (models, materials, textures, fonts).
//! OBJ/MTL parsing on top of the `lexer` tokenizer, RGBA8 texture decoding,
//! and a path-keyed cache with hot-reload support.

pub mod error;
pub mod manager;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod path;
pub mod reload;
mod stream;
pub mod texture;

pub use error::{AssetError, AssetResult, FormatError};
pub use manager::{AssetKind, AssetManager, Font, ReloadOutcome};
pub use mesh::{Material, MaterialLibrary, Mesh, Model};
pub use obj::{FsMaterials, MaterialSource, load_obj_from_path, parse_obj};
pub use reload::{ChangeSource, ReloadPolicy};
pub use texture::{GpuTextures, Texture, TextureData, TextureHandle};

pub(crate) fn read_source(path: &str) -> AssetResult<String> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_owned(),
        source,
    })
}
