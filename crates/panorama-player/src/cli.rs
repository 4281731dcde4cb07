use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "panorama-player")]
#[command(about = "Draws a flat-colored triangle through a GLSL program", long_about = None)]
pub struct Cli {
    /// Directory holding vertex_shader.glsl and fragment_shader.glsl
    #[arg(long, value_name = "DIR", conflicts_with = "inline")]
    pub assets: Option<PathBuf>,

    /// Use the built-in placeholder shaders instead of asset files
    #[arg(long)]
    pub inline: bool,

    #[arg(long, value_enum, default_value_t = Mode::Continuous)]
    pub render_mode: Mode,

    /// Keep the driver's initial viewport instead of tracking the window size
    #[arg(long)]
    pub driver_viewport: bool,

    /// Disable the position attribute array after each draw
    #[arg(long)]
    pub disable_attrib: bool,

    /// Check for driver errors after every draw
    #[arg(long)]
    pub strict: bool,

    /// Draw FRAMES frames against the recording driver and print its call log
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u32>,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Continuous,
    WhenDirty,
}
