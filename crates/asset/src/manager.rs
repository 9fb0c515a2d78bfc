//! Path-keyed cache of loaded assets with load-or-replace semantics.
//!
//! Loading a path that is already cached reloads it from disk and replaces
//! the entry; a failed load leaves the cached entry untouched. Textures are
//! the only entries holding GPU resources, and the previous one is released
//! before its replacement is created.

use std::{collections::HashMap, fs, sync::Arc};

use crate::{
    error::{AssetError, AssetResult},
    mesh::{MaterialLibrary, Model},
    obj::{self, FsMaterials, MaterialSource},
    read_source,
    reload::{ChangeSource, ReloadPolicy},
    texture::{GpuTextures, Texture, TextureData},
};

/// Raw font file contents. Rasterization happens elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Font {
    pub data: Vec<u8>,
}

/// Which cache a path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Texture,
    Model,
    MaterialLibrary,
    Font,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded {
        kind: AssetKind,
        attempts: u32,
        /// Models using a reloaded material library that failed to reload
        /// and still hold the previous materials, sorted by path.
        stale_models: Vec<String>,
    },
    NotTracked,
}

#[derive(Default)]
pub struct AssetManager {
    textures: HashMap<String, Texture>,
    models: HashMap<String, Model>,
    materials: HashMap<String, Arc<MaterialLibrary>>,
    fonts: HashMap<String, Font>,
    policy: ReloadPolicy,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ReloadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Decode `path` and upload it, replacing any texture cached under it.
    pub fn load_image(&mut self, gpu: &mut dyn GpuTextures, path: &str) -> AssetResult<&Texture> {
        let data = TextureData::decode(path)
            .inspect_err(|e| log::error!("Failed to load texture: {e}"))?;

        if let Some(old) = self.textures.get(path) {
            log::info!("Replacing texture {path}");
            gpu.delete_texture(old.handle);
        }
        let texture = Texture {
            handle: gpu.create_texture(data.width, data.height, &data.data),
            width: data.width,
            height: data.height,
        };
        self.textures.insert(path.to_owned(), texture);
        Ok(&self.textures[path])
    }

    /// Parse `path` as OBJ, replacing any model cached under it. Material
    /// libraries it references are re-read and enter the library cache only
    /// if the whole model parses.
    pub fn load_model(&mut self, path: &str) -> AssetResult<&Model> {
        let src = read_source(path).inspect_err(|e| log::error!("Failed to load model: {e}"))?;
        let mut staged = StagedMaterials::default();
        let model = obj::parse_obj(&src, path, &mut staged)
            .inspect_err(|e| log::error!("Failed to load model: {e}"))?;
        self.materials.extend(staged.loaded);

        log::info!(
            "Loaded model {path}: {} mesh(es), {} triangle(s)",
            model.meshes.len(),
            model.triangle_count()
        );
        if self.models.insert(path.to_owned(), model).is_some() {
            log::info!("Replaced cached model {path}");
        }
        Ok(&self.models[path])
    }

    /// Parse `path` as a material library, replacing any cached under it.
    pub fn load_material_library(&mut self, path: &str) -> AssetResult<&Arc<MaterialLibrary>> {
        let library = FsMaterials
            .material_library(path)
            .inspect_err(|e| log::error!("Failed to load material library: {e}"))?;
        log::info!("Loaded material library {path}: {} material(s)", library.len());
        self.materials.insert(path.to_owned(), library);
        Ok(&self.materials[path])
    }

    pub fn load_font(&mut self, path: &str) -> AssetResult<&Font> {
        let data = fs::read(path)
            .map_err(|source| AssetError::Io {
                path: path.to_owned(),
                source,
            })
            .inspect_err(|e| log::error!("Failed to load font: {e}"))?;
        log::info!("Loaded font {path} ({} bytes)", data.len());
        self.fonts.insert(path.to_owned(), Font { data });
        Ok(&self.fonts[path])
    }

    pub fn texture(&self, path: &str) -> Option<&Texture> {
        self.textures.get(path)
    }

    pub fn model(&self, path: &str) -> Option<&Model> {
        self.models.get(path)
    }

    pub fn material_library(&self, path: &str) -> Option<&Arc<MaterialLibrary>> {
        self.materials.get(path)
    }

    pub fn font(&self, path: &str) -> Option<&Font> {
        self.fonts.get(path)
    }

    pub fn kind_of(&self, path: &str) -> Option<AssetKind> {
        if self.textures.contains_key(path) {
            Some(AssetKind::Texture)
        } else if self.models.contains_key(path) {
            Some(AssetKind::Model)
        } else if self.materials.contains_key(path) {
            Some(AssetKind::MaterialLibrary)
        } else if self.fonts.contains_key(path) {
            Some(AssetKind::Font)
        } else {
            None
        }
    }

    /// Drop a cached texture and release its GPU resource.
    pub fn unload_texture(&mut self, gpu: &mut dyn GpuTextures, path: &str) -> bool {
        match self.textures.remove(path) {
            Some(texture) => {
                gpu.delete_texture(texture.handle);
                true
            }
            None => false,
        }
    }

    /// Empty every cache, releasing all GPU textures.
    pub fn release_all(&mut self, gpu: &mut dyn GpuTextures) {
        for (_, texture) in self.textures.drain() {
            gpu.delete_texture(texture.handle);
        }
        self.models.clear();
        self.materials.clear();
        self.fonts.clear();
    }

    /// Reload whatever is cached under `path`, retrying transient failures
    /// per the reload policy. A changed material library also reloads every
    /// model that uses it; a dependent that fails keeps its previous entry and
    /// is listed in the outcome instead of failing the call.
    pub fn handle_change(&mut self, gpu: &mut dyn GpuTextures, path: &str) -> AssetResult<ReloadOutcome> {
        let Some(kind) = self.kind_of(path) else {
            log::debug!("No cached asset for {path}");
            return Ok(ReloadOutcome::NotTracked);
        };
        log::info!("Reloading {path}");

        let policy = self.policy.clone();
        let ((), attempts) = policy.run(path, || match kind {
            AssetKind::Texture => self.load_image(gpu, path).map(|_| ()),
            AssetKind::Model => self.load_model(path).map(|_| ()),
            AssetKind::MaterialLibrary => self.load_material_library(path).map(|_| ()),
            AssetKind::Font => self.load_font(path).map(|_| ()),
        })?;

        let mut stale_models = Vec::new();
        if kind == AssetKind::MaterialLibrary {
            let mut dependents: Vec<String> = self
                .models
                .iter()
                .filter(|(_, model)| model.material_library.as_deref() == Some(path))
                .map(|(model_path, _)| model_path.clone())
                .collect();
            dependents.sort();
            for model_path in dependents {
                if let Err(e) = policy.run(&model_path, || self.load_model(&model_path).map(|_| ())) {
                    log::error!("Keeping previous {model_path} after {path} changed: {e}");
                    stale_models.push(model_path);
                }
            }
        }

        Ok(ReloadOutcome::Reloaded {
            kind,
            attempts,
            stale_models,
        })
    }

    /// Apply every pending notification from `changes`. Failures are logged
    /// and leave the affected entries as they were. Returns how many assets
    /// were reloaded.
    pub fn process_changes(&mut self, gpu: &mut dyn GpuTextures, changes: &mut dyn ChangeSource) -> usize {
        let mut reloaded = 0;
        for path in changes.poll_changes() {
            match self.handle_change(gpu, &path) {
                Ok(ReloadOutcome::Reloaded { .. }) => reloaded += 1,
                Ok(ReloadOutcome::NotTracked) => {}
                Err(e) => log::error!("Giving up on reload of {path}: {e}"),
            }
        }
        reloaded
    }
}

/// Libraries read while parsing one model, held back until the parse succeeds.
#[derive(Default)]
struct StagedMaterials {
    loaded: HashMap<String, Arc<MaterialLibrary>>,
}

impl MaterialSource for StagedMaterials {
    fn material_library(&mut self, path: &str) -> AssetResult<Arc<MaterialLibrary>> {
        let library = FsMaterials.material_library(path)?;
        log::info!("Loaded material library {path}: {} material(s)", library.len());
        self.loaded.insert(path.to_owned(), Arc::clone(&library));
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use corelib::Color;

    use super::*;
    use crate::texture::TextureHandle;

    #[derive(Default)]
    struct RecordingGpu {
        next: u64,
        created: Vec<TextureHandle>,
        deleted: Vec<TextureHandle>,
    }

    impl GpuTextures for RecordingGpu {
        fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
            assert_eq!(rgba.len(), (width * height * 4) as usize);
            self.next += 1;
            let handle = TextureHandle(self.next);
            self.created.push(handle);
            handle
        }

        fn delete_texture(&mut self, handle: TextureHandle) {
            self.deleted.push(handle);
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write fixture");
        path.to_str().expect("utf-8 path").to_owned()
    }

    fn write_png(dir: &Path, name: &str, size: u32) -> String {
        let path = dir.join(name);
        image::RgbaImage::new(size, size).save(&path).expect("write png");
        path.to_str().expect("utf-8 path").to_owned()
    }

    const MTL: &str = "newmtl Red\nKd 1.0 0.0 0.0\n";
    const OBJ: &str = "mtllib scene.mtl\no Tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nusemtl Red\nf 1//1 2//1 3//1\n";

    #[test]
    fn texture_reload_releases_previous_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_png(dir.path(), "a.png", 2);
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::new();

        let first = *assets.load_image(&mut gpu, &path).expect("first load");
        assert!(gpu.deleted.is_empty());

        write_png(dir.path(), "a.png", 4);
        let second = *assets.load_image(&mut gpu, &path).expect("second load");

        assert_eq!(gpu.deleted, vec![first.handle]);
        assert_eq!(gpu.created.len(), 2);
        assert_ne!(first.handle, second.handle);
        assert_eq!((second.width, second.height), (4, 4));
        assert_eq!(assets.texture(&path), Some(&second));
    }

    #[test]
    fn failed_texture_load_keeps_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_png(dir.path(), "a.png", 2);
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::new();
        let original = *assets.load_image(&mut gpu, &path).expect("load");

        fs::write(&path, b"garbage").expect("corrupt");
        assert!(assets.load_image(&mut gpu, &path).is_err());
        assert_eq!(assets.texture(&path), Some(&original));
        assert!(gpu.deleted.is_empty());
        assert_eq!(gpu.created.len(), 1);
    }

    #[test]
    fn model_load_resolves_sibling_library_and_caches_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mtl_path = write(dir.path(), "scene.mtl", MTL);
        let obj_path = write(dir.path(), "scene.obj", OBJ);
        let mut assets = AssetManager::new();

        let model = assets.load_model(&obj_path).expect("load model");
        let material = model.meshes[0].material.clone().expect("material");
        assert_eq!(material.diffuse, Color::new(1.0, 0.0, 0.0));
        assert_eq!(model.material_library.as_deref(), Some(mtl_path.as_str()));

        let cached = assets.material_library(&mtl_path).expect("library cached");
        assert!(Arc::ptr_eq(&material, cached.get("Red").expect("Red")));
    }

    #[test]
    fn model_reload_replaces_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "scene.mtl", MTL);
        let obj_path = write(dir.path(), "scene.obj", OBJ);
        let mut assets = AssetManager::new();
        assets.load_model(&obj_path).expect("first");

        write(
            dir.path(),
            "scene.obj",
            "o Other\nv 0 0 0\nvn 0 0 1\nf 1//1 1//1 1//1\nf 1//1 1//1 1//1\n",
        );
        assets.load_model(&obj_path).expect("second");

        let model = assets.model(&obj_path).expect("cached");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].name, "Other");
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn failed_model_load_keeps_previous_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "scene.mtl", MTL);
        let obj_path = write(dir.path(), "scene.obj", OBJ);
        let mut assets = AssetManager::new();
        let before = assets.load_model(&obj_path).expect("first").clone();

        write(dir.path(), "scene.obj", "o Tri\nusemtl Missing\n");
        let err = assets.load_model(&obj_path).unwrap_err();
        assert_eq!(err.path(), obj_path);
        assert_eq!(assets.model(&obj_path), Some(&before));

        let missing = dir.path().join("nope.obj");
        let missing = missing.to_str().expect("utf-8 path");
        assert!(matches!(assets.load_model(missing), Err(AssetError::Io { .. })));
        assert!(assets.model(missing).is_none());
    }

    #[test]
    fn failed_model_load_keeps_library_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mtl_path = write(dir.path(), "scene.mtl", MTL);
        let obj_path = write(dir.path(), "scene.obj", OBJ);
        let mut assets = AssetManager::new();
        assets.load_model(&obj_path).expect("first");
        let library = Arc::clone(assets.material_library(&mtl_path).expect("cached"));

        write(dir.path(), "scene.mtl", "newmtl Blue\nKd 0.0 0.0 1.0\n");
        let err = assets.load_model(&obj_path).unwrap_err();
        assert!(matches!(err, AssetError::Format { .. }));

        let cached = assets.material_library(&mtl_path).expect("still cached");
        assert!(Arc::ptr_eq(cached, &library));
        assert!(cached.get("Blue").is_none());
        let material = assets.model(&obj_path).expect("model").meshes[0]
            .material
            .as_ref()
            .expect("material");
        assert!(Arc::ptr_eq(material, cached.get("Red").expect("Red")));
    }

    #[test]
    fn library_change_reloads_dependent_models() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mtl_path = write(dir.path(), "scene.mtl", MTL);
        let obj_path = write(dir.path(), "scene.obj", OBJ);
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::with_policy(ReloadPolicy::immediate(1));
        assets.load_model(&obj_path).expect("load");

        write(dir.path(), "scene.mtl", "newmtl Red\nKd 0.0 0.0 1.0\n");
        let outcome = assets.handle_change(&mut gpu, &mtl_path).expect("reload");
        assert_eq!(
            outcome,
            ReloadOutcome::Reloaded {
                kind: AssetKind::MaterialLibrary,
                attempts: 1,
                stale_models: Vec::new(),
            }
        );
        let material = assets.model(&obj_path).expect("model").meshes[0]
            .material
            .clone()
            .expect("material");
        assert_eq!(material.diffuse, Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn library_change_reloads_every_healthy_dependent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mtl_path = write(
            dir.path(),
            "scene.mtl",
            "newmtl Red\nKd 1.0 0.0 0.0\nnewmtl Green\nKd 0.0 1.0 0.0\n",
        );
        let a = write(dir.path(), "a.obj", OBJ);
        let b = write(dir.path(), "b.obj", OBJ.replace("usemtl Red", "usemtl Green").as_str());
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::with_policy(ReloadPolicy::immediate(1));
        assets.load_model(&a).expect("load a");
        assets.load_model(&b).expect("load b");

        write(dir.path(), "scene.mtl", "newmtl Red\nKd 0.0 0.0 1.0\n");
        let outcome = assets.handle_change(&mut gpu, &mtl_path).expect("library reloaded");
        assert_eq!(
            outcome,
            ReloadOutcome::Reloaded {
                kind: AssetKind::MaterialLibrary,
                attempts: 1,
                stale_models: vec![b.clone()],
            }
        );

        let red = assets.model(&a).expect("a").meshes[0].material.clone().expect("Red");
        assert_eq!(red.diffuse, Color::new(0.0, 0.0, 1.0));
        let green = assets.model(&b).expect("b").meshes[0].material.clone().expect("Green");
        assert_eq!(green.diffuse, Color::new(0.0, 1.0, 0.0));
        assert!(assets.material_library(&mtl_path).expect("lib").get("Green").is_none());
    }

    #[test]
    fn untracked_change_is_ignored() {
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::new();
        assert_eq!(
            assets.handle_change(&mut gpu, "assets/unknown.png").expect("ok"),
            ReloadOutcome::NotTracked
        );
    }

    #[test]
    fn fonts_and_release_all() {
        let dir = tempfile::tempdir().expect("tempdir");
        let font_path = write(dir.path(), "f.ttf", "fontbytes");
        let png = write_png(dir.path(), "a.png", 1);
        let mut gpu = RecordingGpu::default();
        let mut assets = AssetManager::new();

        assert_eq!(assets.load_font(&font_path).expect("font").data, b"fontbytes");
        assets.load_image(&mut gpu, &png).expect("png");
        assert_eq!(assets.kind_of(&font_path), Some(AssetKind::Font));
        assert_eq!(assets.kind_of(&png), Some(AssetKind::Texture));

        assets.release_all(&mut gpu);
        assert_eq!(gpu.deleted, gpu.created);
        assert!(assets.texture(&png).is_none());
        assert!(assets.font(&font_path).is_none());
        assert!(!assets.unload_texture(&mut gpu, &png));
    }
}
