//! Render a YAML scene to an image
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use whitted::{
    cameras::Camera,
    error::Result,
    render,
    scene::{Scene, SceneConfig},
    tracer::RayTracer,
    Color,
};

/// Log levels accepted on the command line
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "whitted", about = "Whitted-style recursive ray tracer")]
struct Args {
    /// Scene description
    #[arg(short, long)]
    config: PathBuf,

    /// Output image, the format follows the extension
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 500)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Overlay a white grid line every this many pixels
    #[arg(long)]
    grid: Option<u32>,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    info!("Loading {}", args.config.display());
    let config: SceneConfig = serde_yaml::from_str(&std::fs::read_to_string(&args.config)?)?;
    let camera = Camera::from_config(config.camera.clone())?;
    let scene = Scene::from_config(config)?;

    let mut img = render::render(&camera, &RayTracer::new(&scene), args.width, args.height)?;
    if let Some(interval) = args.grid {
        render::draw_grid(&mut img, interval, &Color::repeat(1.0));
    }
    render::write_image(&img, &args.output)
}
