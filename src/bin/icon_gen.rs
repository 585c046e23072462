//! Block Icon Generator
//!
//! Run with: `cargo run --bin icon_gen -- <texture.png | texture_dir>`
//!
//! Renders a full block with the given texture on all six faces and writes
//! `<stem>_icon.png`. A directory renders every PNG inside it with one
//! shared environment. `--test` renders a built-in checkerboard block.
//!
//! Logging: `RUST_LOG=debug` shows pool and upload activity.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use mcmod_icon_engine::{IconConfig, ModelSpec};
use mcmod_icon_engine::render::{
    IconEnvironment, RenderBatch, RenderTargetSpec, ShaderSource, TextureData,
};
use mcmod_icon_engine::texture_io::{
    checker_texture, find_textures, icon_output_path, load_texture, save_icon,
};

/// Render block icons from PNG textures.
#[derive(Parser, Debug)]
#[command(name = "icon_gen", version, about)]
struct Args {
    /// PNG texture or directory of PNG textures
    input: Option<PathBuf>,

    /// Render the built-in self-test block to self_test.png
    #[arg(short = 't', long = "test", hide = true)]
    test: bool,

    /// Directory for generated icons (defaults to next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON icon configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Square icon size in pixels, overrides the config
    #[arg(short, long)]
    size: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => IconConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IconConfig::default(),
    };
    if let Some(size) = args.size {
        config.output_width = size;
        config.output_height = size;
        config.validate().context("invalid --size")?;
    }

    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    if args.test {
        let mut env = create_environment(&config)?;
        let out = args
            .output
            .as_deref()
            .unwrap_or(Path::new("."))
            .join("self_test.png");
        let texture = checker_texture(16, 4, [200, 60, 60, 255], [240, 240, 240, 255]);
        render_icon(&mut env, &config, &config.block_model(), &texture, &out)?;
        log::info!("[IconGen] Self test finished");
        return Ok(());
    }

    let Some(input) = args.input else {
        println!("Usage: icon_gen <texture.png | texture_dir> [--output DIR] [--config FILE] [--size N]");
        return Ok(());
    };

    if !input.exists() {
        println!("Input path does not exist: {}", input.display());
        return Ok(());
    }

    let textures = if input.is_dir() {
        let found = find_textures(&input)?;
        if found.is_empty() {
            println!("No PNG textures found in {}", input.display());
            return Ok(());
        }
        found
    } else {
        vec![input]
    };

    let mut env = create_environment(&config)?;
    // One model for every icon, so geometry is uploaded once
    let block = config.block_model();
    let mut failures = 0usize;
    for path in &textures {
        let out = icon_output_path(path, args.output.as_deref());
        let result = load_texture(path)
            .map_err(anyhow::Error::from)
            .and_then(|texture| render_icon(&mut env, &config, &block, &texture, &out));
        if let Err(e) = result {
            log::error!("[IconGen] {}: {:#}", path.display(), e);
            failures += 1;
        }
    }

    let stats = env.stats();
    log::info!(
        "[IconGen] {} icon(s) written, {} failed ({} textures allocated, {} geometry uploads)",
        textures.len() - failures,
        failures,
        stats.textures_allocated,
        stats.geometry_uploads
    );
    env.dispose();

    if failures > 0 {
        anyhow::bail!("{failures} of {} icon(s) failed", textures.len());
    }
    Ok(())
}

fn create_environment(config: &IconConfig) -> Result<IconEnvironment> {
    let shader = ShaderSource::icon_or_file(config.shader_path.as_deref())?;
    let env = IconEnvironment::with_shader(&config.gpu_config(), &shader)
        .context("creating GPU render environment")?;
    Ok(env)
}

/// Render one block icon with `texture` on all faces and save it as PNG.
fn render_icon(
    env: &mut IconEnvironment,
    config: &IconConfig,
    model: &ModelSpec,
    texture: &TextureData,
    out: &Path,
) -> Result<()> {
    let (width, height) = (config.output_width, config.output_height);
    let mut batch = RenderBatch::new(
        env,
        model.clone(),
        &config.space(),
        RenderTargetSpec::new(width, height),
    )?;
    let pixels = batch.render(std::slice::from_ref(texture))?;
    save_icon(out, width, height, pixels)?;
    batch.dispose();
    Ok(())
}
