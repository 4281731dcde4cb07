mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use panorama_engine::assets::DirAssets;
use panorama_engine::core::SurfaceRenderer;
use panorama_engine::driver::HeadlessDriver;
use panorama_engine::logging::{init_logging, LoggingConfig};
use panorama_engine::render::{
    AttribPolicy, FrameRenderer, RendererConfig, ShaderOrigin, ViewportPolicy,
};
use panorama_engine::window::{RenderMode, Runtime, RuntimeConfig};

use cli::{Cli, Mode};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let renderer = FrameRenderer::new(renderer_config(&cli));

    match cli.headless {
        Some(frames) => run_headless(renderer, frames),
        None => Runtime::run(runtime_config(&cli), renderer),
    }
}

fn renderer_config(cli: &Cli) -> RendererConfig {
    let shader_origin = if cli.inline {
        ShaderOrigin::Inline
    } else {
        let assets = DirAssets::new(cli.assets.clone().unwrap_or_else(bundled_assets_dir));
        log::info!("loading shaders from {}", assets.root().display());
        ShaderOrigin::assets(assets)
    };

    RendererConfig {
        shader_origin,
        viewport_policy: if cli.driver_viewport {
            ViewportPolicy::DriverDefault
        } else {
            ViewportPolicy::Track
        },
        attrib_policy: if cli.disable_attrib {
            AttribPolicy::DisableAfterDraw
        } else {
            AttribPolicy::LeaveEnabled
        },
        check_draw_errors: cli.strict,
        ..Default::default()
    }
}

fn runtime_config(cli: &Cli) -> RuntimeConfig {
    RuntimeConfig {
        title: "panorama player".to_string(),
        render_mode: match cli.render_mode {
            Mode::Continuous => RenderMode::Continuously,
            Mode::WhenDirty => RenderMode::WhenDirty,
        },
        ..Default::default()
    }
}

fn bundled_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// Runs the surface lifecycle against the recording driver and prints every call.
fn run_headless(mut renderer: FrameRenderer, frames: u32) -> Result<()> {
    let gl = HeadlessDriver::new();

    renderer
        .on_surface_created(&gl)
        .context("renderer failed on surface creation")?;
    renderer
        .on_surface_changed(&gl, 800, 600)
        .context("renderer failed on surface change")?;
    for _ in 0..frames {
        renderer
            .on_draw_frame(&gl)
            .context("renderer failed to draw frame")?;
    }

    for call in gl.calls() {
        println!("{call:?}");
    }

    anyhow::ensure!(
        renderer.program().is_some(),
        "shader program could not be built (see log)"
    );
    log::info!("{} of {frames} frame(s) drawn", renderer.frames_drawn());
    Ok(())
}
