use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::fmt::SubscriberBuilder;

use alpenglow_core::arrangement::RenderPath;
use alpenglow_core::config::RasterConfig;
use alpenglow_core::pipeline::{rasterize, Layer};
use alpenglow_core::program::RenderProgram;
use alpenglow_core::raster::output::ColorSpace;

#[derive(Parser)]
#[command(name = "alpenglow")]
#[command(about = "Rasterizes a scene file through the constructive-area-geometry pipeline")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Rasterize a scene file to a PNG
    Render {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 20)]
        grid_bits: u32,
    },
    /// Print a scene's parsed layer count and output dimensions without rendering
    Inspect {
        #[arg(long)]
        scene: PathBuf,
    },
}

/// One scene layer: the path that bounds it and the program that colors its
/// interior (§6.6).
#[derive(Deserialize)]
struct SceneLayer {
    path: RenderPath,
    program: RenderProgram,
}

#[derive(Deserialize)]
struct OutputSpec {
    width: u32,
    height: u32,
    #[serde(default = "default_color_space")]
    color_space: ColorSpace,
}

fn default_color_space() -> ColorSpace {
    ColorSpace::Srgb
}

#[derive(Deserialize)]
struct Scene {
    layers: Vec<SceneLayer>,
    output: OutputSpec,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Render { scene, out, grid_bits } => render(scene, out, grid_bits),
        Action::Inspect { scene } => inspect(scene),
    }
}

fn load_scene(path: &PathBuf) -> Result<Scene> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading scene file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scene file {}", path.display()))
}

fn render(scene_path: PathBuf, out: PathBuf, grid_bits: u32) -> Result<()> {
    let scene = load_scene(&scene_path)?;
    tracing::info!(scene = %scene_path.display(), layers = scene.layers.len(), width = scene.output.width, height = scene.output.height, "render");

    let layers: Vec<Layer> = scene
        .layers
        .into_iter()
        .map(|l| Layer { path: l.path, program: Rc::new(l.program) })
        .collect();

    let config = RasterConfig { grid_bits, color_space: scene.output.color_space, ..RasterConfig::default() };
    let image_bytes = rasterize(&layers, scene.output.width, scene.output.height, &config)
        .with_context(|| "rasterizing scene")?;

    let buffer = image::RgbaImage::from_raw(scene.output.width, scene.output.height, image_bytes)
        .context("resolved raster buffer did not match its declared dimensions")?;
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    buffer.save(&out).with_context(|| format!("writing PNG to {}", out.display()))?;
    tracing::info!(out = %out.display(), "wrote PNG");
    Ok(())
}

fn inspect(scene_path: PathBuf) -> Result<()> {
    let scene = load_scene(&scene_path)?;
    println!(
        "{}",
        serde_json::json!({
            "layers": scene.layers.len(),
            "width": scene.output.width,
            "height": scene.output.height,
        })
    );
    Ok(())
}
