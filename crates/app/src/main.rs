//! Entry point for Ember3D.
//! Loads the assets named on the command line, prints what was loaded and,
//! with `--watch-stdin`, applies change notifications read one path per line.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use asset::{AssetManager, ChangeSource, GpuTextures, Model, ReloadPolicy};
use renderer::{CpuTextures, WgpuTextures};

/// `None` selects the CPU texture store.
fn parse_backend_arg() -> Option<wgpu::Backends> {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl|cpu
    let mut backends = Some(wgpu::Backends::all()); // default = auto
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => Some(wgpu::Backends::all()),
                "vulkan" | "vk" => Some(wgpu::Backends::VULKAN),
                "dx12" | "d3d12" => Some(wgpu::Backends::DX12),
                "metal" | "mtl" => Some(wgpu::Backends::METAL),
                "gl" | "opengl" | "gles" => Some(wgpu::Backends::GL),
                "cpu" | "none" => None,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    Some(wgpu::Backends::all())
                }
            };
        }
    }
    backends
}

fn parse_reload_policy() -> ReloadPolicy {
    let mut policy = ReloadPolicy::default();
    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--reload-attempts=") {
            match v.parse::<u32>() {
                Ok(n) => policy.max_attempts = n.max(1),
                Err(_) => log::warn!("Ignoring invalid --reload-attempts '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--reload-backoff-ms=") {
            match v.parse::<u64>() {
                Ok(ms) => policy.initial_backoff = std::time::Duration::from_millis(ms),
                Err(_) => log::warn!("Ignoring invalid --reload-backoff-ms '{}'", v),
            }
        }
    }
    policy
}

/// Every value given for `--<name>=`.
fn parse_path_args(name: &str) -> Vec<String> {
    let prefix = format!("--{name}=");
    std::env::args()
        .filter_map(|arg| arg.strip_prefix(&prefix).map(str::to_owned))
        .collect()
}

fn parse_flag(name: &str) -> bool {
    std::env::args().any(|arg| arg == name)
}

fn create_texture_store(backends: Option<wgpu::Backends>) -> Box<dyn GpuTextures> {
    match backends {
        Some(backends) => match WgpuTextures::new_blocking(backends) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("GPU unavailable ({e}); keeping textures in memory.");
                Box::new(CpuTextures::new())
            }
        },
        None => Box::new(CpuTextures::new()),
    }
}

fn print_model(path: &str, model: &Model) {
    println!(
        "Model {}: {} mesh(es), {} triangle(s)",
        path,
        model.meshes.len(),
        model.triangle_count()
    );
    for mesh in &model.meshes {
        let material = mesh
            .material
            .as_ref()
            .map_or("none", |material| material.name.as_str());
        println!(
            " - {}: {} triangle(s), material {}",
            mesh.name,
            mesh.triangle_count(),
            material
        );
    }
}

/// One changed path per stdin line; empty lines are skipped.
struct StdinChanges {
    done: bool,
}

impl ChangeSource for StdinChanges {
    fn poll_changes(&mut self) -> Vec<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                self.done = true;
                Vec::new()
            }
            Ok(_) => {
                let path = line.trim();
                if path.is_empty() {
                    Vec::new()
                } else {
                    vec![path.to_owned()]
                }
            }
            Err(e) => {
                log::error!("Reading change notifications failed: {e}");
                self.done = true;
                Vec::new()
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let backends = parse_backend_arg();
    let policy = parse_reload_policy();
    let models = parse_path_args("model");
    let textures = parse_path_args("texture");
    let fonts = parse_path_args("font");
    let watch = parse_flag("--watch-stdin");
    log::info!(
        "Starting Ember3D. Backend: {:?}, reload={:?}, watch_stdin={}",
        backends,
        policy,
        watch
    );

    let mut gpu = create_texture_store(backends);
    let mut assets = AssetManager::with_policy(policy);

    for path in &models {
        let model = assets
            .load_model(path)
            .with_context(|| format!("loading model {path}"))?;
        print_model(path, model);
    }
    for path in &textures {
        let texture = assets
            .load_image(gpu.as_mut(), path)
            .with_context(|| format!("loading texture {path}"))?;
        println!("Texture {}: {}x{}", path, texture.width, texture.height);
    }
    for path in &fonts {
        let font = assets
            .load_font(path)
            .with_context(|| format!("loading font {path}"))?;
        println!("Font {}: {} bytes", path, font.data.len());
    }

    if watch {
        let mut changes = StdinChanges { done: false };
        while !changes.done {
            let reloaded = assets.process_changes(gpu.as_mut(), &mut changes);
            if reloaded > 0 {
                println!("Reloaded {} asset(s)", reloaded);
            }
        }
    }

    assets.release_all(gpu.as_mut());
    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
