// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use ikdao_camera::app::{CaptureMode, FilterType};
use ikdao_camera::backends::camera::types::{FacingMode, Resolution};
use ikdao_camera::config::Config;
use ikdao_camera::flash::TorchMode;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "ikdao-camera")]
#[command(about = "Camera controller with torch, capture sequencing and recording controls")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: <config dir>/ikdao-camera/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (renders camera to terminal)
    Terminal,

    /// List available cameras
    List,

    /// Take a photo
    Photo {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Filter applied to the photo (none, sepia, grayscale, blur, ...)
        #[arg(long, default_value = "none")]
        filter: FilterType,

        /// Capture mode (instant, delayed, continuous)
        #[arg(short, long)]
        mode: Option<CaptureMode>,
    },

    /// Record a video
    Video {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,
    },
}

#[derive(clap::Args)]
struct CaptureArgs {
    /// Camera to use (user/front or environment/rear)
    #[arg(long)]
    facing: Option<FacingMode>,

    /// Resolution as WIDTHxHEIGHT
    #[arg(short, long)]
    resolution: Option<Resolution>,

    /// Torch mode (off, on, auto)
    #[arg(long, default_value = "off")]
    torch: TorchMode,

    /// Output directory (default: ~/Downloads/ikdao-camera)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl From<CaptureArgs> for cli::CaptureOptions {
    fn from(args: CaptureArgs) -> Self {
        Self {
            facing: args.facing,
            resolution: args.resolution,
            torch: args.torch,
            output: args.output,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal));

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=ikdao_camera=debug, RUST_LOG=info
    init_logging(terminal_mode);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        None | Some(Commands::Terminal) => {
            let config_path = cli.config.clone().or_else(Config::default_path);
            ikdao_camera::terminal::run(config, config_path).await
        }
        Some(Commands::List) => cli::list_cameras().await,
        Some(Commands::Photo {
            capture,
            filter,
            mode,
        }) => {
            let mode = mode.unwrap_or(config.capture_mode);
            cli::take_photo(config, capture.into(), filter, mode).await
        }
        Some(Commands::Video { capture, duration }) => {
            cli::record_video(config, capture.into(), Duration::from_secs(duration)).await
        }
    }
}

/// Log to stderr, or to a file in the cache directory while the terminal
/// front end owns the screen
fn init_logging(terminal_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if terminal_mode && let Some(file) = open_log_file() {
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join("ikdao-camera");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("ikdao-camera.log"))
        .ok()
}
