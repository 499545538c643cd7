// In src/main.rs

use softfb::display::DisplaySurface;
use softfb::{Color, Config, HeadlessDisplayDriver, NamedColor, Rect};

use anyhow::Context;
use log::{error, info};

/// Frames rendered before the demo exits on its own.
const DEMO_FRAMES: u32 = 180;
const BOX_SIZE: u32 = 64;

/// Usage: `softfb [config.json] [screenshot.ppm]`
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let screenshot_path = args.next();

    // --- Configuration ---
    let config = match &config_path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path))?,
        None => Config::default(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str()))
        .format_timestamp_micros()
        .init();

    info!("Starting softfb demo...");
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path),
        None => info!("Configuration loaded (using default)."),
    }

    // --- Display ---
    let driver = HeadlessDisplayDriver::new();
    let mut surface = DisplaySurface::with_metrics_config(Box::new(driver), config.metrics.clone());
    surface
        .init(config.display.clone())
        .context("Failed to initialize display surface")?;
    info!(
        "Display initialized on {} backend: {:?}",
        surface.get_backend_info(),
        surface.get_info()?
    );

    // --- Main Loop ---
    let mut frame = 0u32;
    while frame < DEMO_FRAMES {
        match surface.handle_events() {
            Ok(true) => {}
            Ok(false) => {
                info!("Close requested. Exiting main loop.");
                break;
            }
            Err(e) => {
                error!("Error polling events: {}. Exiting.", e);
                break;
            }
        }
        draw_frame(&mut surface, frame).context("Failed to draw frame")?;
        surface.present().context("Failed to present frame")?;
        frame += 1;
    }

    let metrics = surface.get_metrics()?;
    info!(
        "Rendered {} frames at {:.1} fps ({:.2}ms per frame, {} bytes)",
        metrics.frame_count, metrics.fps, metrics.frame_time_ms, metrics.memory_usage_bytes
    );

    if let Some(path) = screenshot_path {
        surface
            .screenshot(&path)
            .with_context(|| format!("Failed to write screenshot {}", path))?;
        info!("Screenshot written to {}", path);
    }

    // --- Cleanup ---
    surface.shutdown();
    info!("softfb exited successfully.");
    Ok(())
}

/// Color bars along the top, a diagonal cross, and a box bouncing across the middle.
fn draw_frame(surface: &mut DisplaySurface, frame: u32) -> softfb::Result<()> {
    let (width, height) = surface.get_dimensions()?;
    surface.clear(Color::BLACK)?;

    let bar_height = (height / 8).max(1);
    let bar_width = (width / NamedColor::ALL.len() as u32).max(1);
    for (i, named) in NamedColor::ALL.iter().enumerate() {
        let bar = Rect::new(i as u32 * bar_width, 0, bar_width, bar_height);
        surface.fill_rect(&bar, named.to_color())?;
    }

    surface.draw_line(0, 0, width - 1, height - 1, Color::GRAY)?;
    surface.draw_line(width - 1, 0, 0, height - 1, Color::GRAY)?;

    let travel = width.saturating_sub(BOX_SIZE).max(1) * 2;
    let step = (frame * 4) % travel;
    let x = if step < travel / 2 { step } else { travel - step };
    let y = height.saturating_sub(BOX_SIZE) / 2;
    surface.fill_rect(&Rect::new(x, y, BOX_SIZE, BOX_SIZE), Color::from_hex(0xFF8800))?;
    Ok(())
}
