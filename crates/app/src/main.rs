//! Entry point for Obsidian3D.
//! Logging + CLI flags, then hand off to the platform loop.

use std::path::PathBuf;

use anyhow::Result;
use platform::RunConfig;

fn parse_backend(val: &str) -> wgpu::Backends {
    // Accept: auto|vulkan|dx12|metal|gl
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> RunConfig {
    let mut config = RunConfig::default();
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--gpu-backend=") {
            config.backends = parse_backend(v);
        } else if arg == "--show-fps" {
            config.show_fps = true;
        } else if let Some(v) = arg.strip_prefix("--show-fps=") {
            config.show_fps = parse_flag(v);
        } else if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        } else if let Some(v) = arg.strip_prefix("--model=") {
            config.model = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--texture=") {
            config.texture = Some(PathBuf::from(v));
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }

    config.width = w.unwrap_or(config.width).max(1);
    config.height = h.unwrap_or(config.height).max(1);
    config
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = parse_args(std::env::args().skip(1));
    log::info!(
        "Starting Obsidian3D. Backend: {:?}, show_fps={}, window_size={}x{}, model={:?}",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.model
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let config = parse_args(Vec::new());
        assert_eq!(config.backends, wgpu::Backends::all());
        assert_eq!((config.width, config.height), (1280, 720));
    }

    #[test]
    fn size_and_backend_flags() {
        let config = parse_args(args(&["--size=800X600", "--gpu-backend=VK", "--show-fps=on"]));
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.backends, wgpu::Backends::VULKAN);
        assert!(config.show_fps);

        let config = parse_args(args(&["--width=0", "--height=abc"]));
        assert_eq!((config.width, config.height), (1, 720));
    }

    #[test]
    fn model_and_texture_paths() {
        let config = parse_args(args(&["--model=assets/models/cube.obj", "--texture=t.png"]));
        assert_eq!(config.model, Some(PathBuf::from("assets/models/cube.obj")));
        assert_eq!(config.texture, Some(PathBuf::from("t.png")));
    }
}
