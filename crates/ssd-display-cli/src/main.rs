//! SSD Display Control Tool
//!
//! Demo patterns, raw image upload and one-shot drawing commands for an
//! SSD display behind an FTDI USB-serial bridge.

mod config;
mod patterns;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ssd_display_hw::{
    Color565, DisplayConfig, DisplaySession, Line, PixelBuffer, Point, Rect, SerialTransport,
};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

type Session = DisplaySession<SerialTransport>;

#[derive(Parser)]
#[command(name = "ssddisplctl")]
#[command(about = "Control tool for SSD displays over FTDI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// USB vendor ID (overrides the configuration file)
    #[arg(long, value_parser = parse_u16)]
    vid: Option<u16>,

    /// USB product ID (overrides the configuration file)
    #[arg(long, value_parser = parse_u16)]
    pid: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the line, box and pixel transfer demo
    Demo {
        /// Delay multiplier (0 runs without pauses)
        #[arg(long, default_value = "1.0")]
        speed: f64,
    },
    /// Upload a raw RGB565 image file
    SendImg {
        /// File holding exactly width*height*2 bytes
        file: PathBuf,
    },
    /// Clear the display
    Clear,
    /// Draw a line
    Line {
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        /// Color in hex format (e.g., #FF0000 for red)
        #[arg(long, default_value = "#FF0000")]
        color: Color565,
    },
    /// Draw a filled box
    Box {
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        /// Border color in hex format
        #[arg(long, default_value = "#FFFFFF")]
        border: Color565,
        /// Fill color in hex format
        #[arg(long, default_value = "#000000")]
        fill: Color565,
    },
}

fn parse_u16(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid USB ID '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    let display = config.display_config()?;
    let vid = cli.vid.unwrap_or(config.device.vendor_id);
    let pid = cli.pid.unwrap_or(config.device.product_id);

    // Image data is validated before the device is touched
    let image = match &cli.command {
        Commands::SendImg { file } => Some(load_image(file, display)?),
        _ => None,
    };

    println!("Initializing SSD display");
    let mut session = DisplaySession::new(SerialTransport::new(config.serial_config()), display);
    session.open(vid, pid).map_err(|_| failure(&session))?;

    match cli.command {
        Commands::Demo { speed } => run_demo(&mut session, speed)?,
        Commands::SendImg { .. } => {
            if let Some(image) = image {
                send_frame_timed(&mut session, &image)?;
            }
        }
        Commands::Clear => session.clear_display().map_err(|_| failure(&session))?,
        Commands::Line {
            x0,
            y0,
            x1,
            y1,
            color,
        } => session
            .draw_line(Line::new(x0, y0, x1, y1), color)
            .map_err(|_| failure(&session))?,
        Commands::Box {
            x0,
            y0,
            x1,
            y1,
            border,
            fill,
        } => session
            .draw_box(Rect::new(x0, y0, x1, y1), border, fill)
            .map_err(|_| failure(&session))?,
    }

    println!("Releasing SSD display");
    session.free();
    Ok(())
}

/// Formats the session's last failure with its status code.
fn failure(session: &Session) -> anyhow::Error {
    match session.last_error() {
        Some(error) => anyhow!(
            "Operation failed: {}, {}",
            error.code(),
            session.last_error_string().unwrap_or_default()
        ),
        None => anyhow!("Operation failed"),
    }
}

/// Reads a raw frame. Extra trailing bytes are ignored.
fn load_image(path: &Path, display: DisplayConfig) -> Result<PixelBuffer> {
    println!("Reading data from file {}", path.display());
    let mut data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let frame_len = display.frame_len();
    if data.len() > frame_len {
        warn!(
            "{} holds {} bytes, using the first {}",
            path.display(),
            data.len(),
            frame_len
        );
        data.truncate(frame_len);
    }
    PixelBuffer::from_bytes(display, data)
        .with_context(|| format!("Not enough data in file {}", path.display()))
}

fn send_frame_timed(session: &mut Session, frame: &PixelBuffer) -> Result<()> {
    println!("Sending data");
    session.begin_pixel_transfer().map_err(|_| failure(session))?;
    let started = Instant::now();
    session.send_pixels(frame.as_bytes()).map_err(|_| failure(session))?;
    let elapsed = started.elapsed();
    session.end_transfer().map_err(|_| failure(session))?;
    println!("Batch transfer took {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn pause(speed: f64, millis: u64) {
    if speed > 0.0 {
        sleep(Duration::from_millis(millis).mul_f64(speed));
    }
}

fn run_demo(session: &mut Session, speed: f64) -> Result<()> {
    let display = session.config();

    info!("Sweeping lines");
    for i in 0..=display.max_y() {
        let (line, color) = patterns::sweep_line(&display, i);
        session.clear_display().map_err(|_| failure(session))?;
        session.draw_line(line, color).map_err(|_| failure(session))?;
        pause(speed, 100);
    }
    session.clear_display().map_err(|_| failure(session))?;
    pause(speed, 200);

    info!("Drawing boxes");
    for (rect, color) in patterns::columns(&display) {
        session.draw_box(rect, color, color).map_err(|_| failure(session))?;
        pause(speed, 2000);
    }
    session.clear_display().map_err(|_| failure(session))?;

    println!("Sending data");
    session.begin_pixel_transfer().map_err(|_| failure(session))?;
    for y in 0..=display.max_y() {
        for x in 0..=display.max_x() {
            let bytes = patterns::stripe_color(Point::new(x, y)).to_bytes();
            session.send_pixels(&bytes).map_err(|_| failure(session))?;
        }
    }
    session.end_transfer().map_err(|_| failure(session))?;
    session.clear_display().map_err(|_| failure(session))?;
    pause(speed, 2000);

    println!("Sending data in batch");
    let mut frame = PixelBuffer::new(display).context("Failed to allocate batch")?;
    frame.paint(patterns::stripe_color);
    send_frame_timed(session, &frame)
}
