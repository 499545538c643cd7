// src/display/tests.rs

use super::*;
use crate::color::Color;
use crate::config::{DisplayConfig, MetricsConfig, PixelFormat};
use crate::error::DisplayError;
use crate::geometry::Rect;
use crate::keys::{KeySymbol, Modifiers};
use anyhow::Result;
use std::time::{Duration, Instant};
use test_log::test;

fn config(width: u32, height: u32) -> DisplayConfig {
    DisplayConfig::new(width, height).with_vsync(false)
}

fn initialized(width: u32, height: u32) -> Result<(DisplaySurface, HeadlessProbe)> {
    let (mut surface, probe) = DisplaySurface::headless();
    surface.init(config(width, height))?;
    Ok((surface, probe))
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("softfb-{}-{}", std::process::id(), name))
}

// --- Lifecycle ---

#[test]
fn new_surface_is_uninitialized() {
    let (surface, _probe) = DisplaySurface::headless();
    assert!(!surface.is_initialized());
    assert_eq!(surface.state(), SurfaceState::Uninitialized);
    assert_eq!(surface.get_backend_info(), surface::NO_BACKEND);
    assert!(!surface.should_close());
}

#[test]
fn every_stateful_call_fails_before_init() {
    let (mut surface, probe) = DisplaySurface::headless();
    let not_init = |r: std::result::Result<(), DisplayError>| {
        assert_eq!(r, Err(DisplayError::NotInitialized));
    };

    not_init(surface.clear(Color::RED));
    not_init(surface.set_pixel(0, 0, Color::RED));
    not_init(surface.fill_rect(&Rect::new(0, 0, 1, 1), Color::RED));
    not_init(surface.draw_line(0, 0, 1, 1, Color::RED));
    not_init(surface.blit(0, 0, 1, 1, &[0, 0, 0, 0], 4));
    not_init(surface.present());
    not_init(surface.reset_metrics());
    not_init(surface.set_brightness(0.5));
    not_init(surface.set_rotation(90));
    not_init(surface.set_vsync(true));
    not_init(surface.set_title("nope"));
    not_init(surface.set_debug_overlay(true));
    not_init(surface.screenshot(temp_path("never.ppm")));

    assert_eq!(surface.get_dimensions(), Err(DisplayError::NotInitialized));
    assert_eq!(surface.get_metrics(), Err(DisplayError::NotInitialized));
    assert_eq!(surface.get_brightness(), Err(DisplayError::NotInitialized));
    assert_eq!(surface.get_rotation(), Err(DisplayError::NotInitialized));
    assert_eq!(surface.get_pixel(0, 0), Err(DisplayError::NotInitialized));
    assert_eq!(surface.pitch(), Err(DisplayError::NotInitialized));
    assert!(surface.framebuffer().is_err());
    assert!(surface.handle_events().is_err());

    // Nothing reached the backend.
    assert_eq!(probe.presents(), 0);
    assert!(probe.config().is_none());
    assert!(probe.screenshots().is_empty());
}

#[test]
fn init_exposes_configured_dimensions() -> Result<()> {
    for (w, h) in [(640, 480), (1, 1), (3, 1000)] {
        let (surface, _probe) = initialized(w, h)?;
        assert!(surface.is_initialized());
        assert_eq!(surface.get_dimensions()?, (w, h));
        assert_eq!(surface.pitch()?, w * 4);
        assert_eq!(surface.framebuffer()?.len(), (w * 4 * h) as usize);
    }
    Ok(())
}

#[test]
fn invalid_config_is_rejected_without_state_change() -> Result<()> {
    let (mut surface, probe) = DisplaySurface::headless();
    assert!(matches!(
        surface.init(config(0, 10)),
        Err(DisplayError::InvalidDimensions { .. })
    ));
    assert!(!surface.is_initialized());
    assert!(probe.config().is_none());

    surface.init(config(10, 10))?;
    surface.clear(Color::RED)?;
    assert!(matches!(
        surface.init(config(10, 10).with_refresh_rate(0)),
        Err(DisplayError::InvalidParameter(_))
    ));
    assert_eq!(surface.get_pixel(5, 5)?, Color::RED);
    Ok(())
}

#[test]
fn reinit_reconfigures_instead_of_failing() -> Result<()> {
    let (mut surface, probe) = initialized(64, 48)?;
    surface.clear(Color::WHITE)?;
    surface.set_rotation(90)?;
    surface.init(config(32, 16).with_format(PixelFormat::Rgb565))?;

    assert_eq!(surface.get_dimensions()?, (32, 16));
    assert_eq!(surface.pixel_format()?, PixelFormat::Rgb565);
    assert_eq!(surface.pitch()?, 64);
    assert_eq!(surface.get_rotation()?, 0);
    assert_eq!(surface.get_pixel(0, 0)?, Color::BLACK);
    assert_eq!(probe.config().map(|c| c.width), Some(32));
    Ok(())
}

#[test]
fn shutdown_releases_and_is_idempotent() -> Result<()> {
    let (mut surface, probe) = initialized(8, 8)?;
    surface.shutdown();
    assert!(!surface.is_initialized());
    assert_eq!(probe.releases(), 1);
    assert_eq!(surface.clear(Color::RED), Err(DisplayError::NotInitialized));

    surface.shutdown();
    assert_eq!(probe.releases(), 1);

    surface.init(config(4, 4))?;
    assert_eq!(surface.get_dimensions()?, (4, 4));
    Ok(())
}

#[test]
fn dropping_an_initialized_surface_releases_the_backend() -> Result<()> {
    let (surface, probe) = initialized(8, 8)?;
    drop(surface);
    assert_eq!(probe.releases(), 1);
    Ok(())
}

#[test]
fn backend_init_failure_is_surfaced() {
    let (mut surface, probe) = DisplaySurface::headless();
    probe.fail_next(DisplayError::WindowCreationFailed("no display".into()));
    assert_eq!(
        surface.init(config(8, 8)),
        Err(DisplayError::WindowCreationFailed("no display".into()))
    );
    assert!(!surface.is_initialized());
}

#[test]
fn info_and_backend_come_from_the_driver() -> Result<()> {
    let (mut surface, _probe) = DisplaySurface::headless();
    surface.init(config(200, 100).with_format(PixelFormat::Rgb888).with_refresh_rate(75))?;
    let info = surface.get_info()?;
    assert_eq!((info.width, info.height), (200, 100));
    assert_eq!(info.color_depth, 24);
    assert_eq!(info.refresh_rate, 75.0);
    assert_eq!(info.density, 1.0);
    assert!(!info.hdr_supported);
    assert_eq!(surface.get_backend_info(), drivers::headless::BACKEND_NAME);
    Ok(())
}

// --- Drawing and presentation ---

#[test]
fn draw_then_present_scenario() -> Result<()> {
    let (mut surface, probe) = initialized(640, 480)?;
    surface.clear(Color::BLACK)?;
    surface.fill_rect(&Rect::new(10, 10, 50, 50), Color::RED)?;
    surface.present()?;

    assert_eq!(surface.get_pixel(30, 30)?, Color::RED);
    assert_eq!(surface.get_pixel(0, 0)?, Color::BLACK);
    assert_eq!(surface.get_metrics()?.frame_count, 1);
    assert_eq!(probe.presents(), 1);
    Ok(())
}

#[test]
fn present_hands_over_the_frame_without_changing_it() -> Result<()> {
    let (mut surface, probe) = initialized(4, 2)?;
    probe.capture_pixels(true);
    surface.set_pixel(1, 1, Color::GREEN)?;
    surface.set_brightness(0.25)?;
    let before = surface.framebuffer()?.to_vec();
    surface.present()?;

    let frame = probe.last_frame().expect("frame presented");
    assert_eq!(frame.frame_number, 1);
    assert_eq!((frame.width, frame.height), (4, 2));
    assert_eq!(frame.brightness, 0.25);
    assert_eq!(frame.pixels.as_deref(), Some(&before[..]));
    assert_eq!(surface.framebuffer()?, &before[..]);
    Ok(())
}

#[test]
fn backend_applies_brightness_at_scanout_only() -> Result<()> {
    let (mut surface, probe) = initialized(3, 2)?;
    probe.capture_pixels(true);
    let color = Color::from_rgba(200, 100, 50, 255);
    surface.clear(color)?;
    surface.set_brightness(0.5)?;
    surface.present()?;

    let frame = probe.last_frame().expect("frame presented");
    let dimmed = Color::from_rgba(100, 50, 25, 255);
    assert_eq!(frame.scanout, Some(vec![dimmed; 6]));
    // Stored pixels stay at full brightness.
    assert_eq!(frame.pixels.as_deref().map(|p| &p[..4]), Some(&[200, 100, 50, 255][..]));
    assert_eq!(surface.get_pixel(2, 1)?, color);

    surface.set_brightness(1.0)?;
    surface.present()?;
    let frame = probe.last_frame().expect("frame presented");
    assert_eq!(frame.scanout, Some(vec![color; 6]));
    Ok(())
}

#[test]
fn scanout_is_not_captured_by_default() -> Result<()> {
    let (mut surface, probe) = initialized(2, 2)?;
    surface.present()?;
    let frame = probe.last_frame().expect("frame presented");
    assert!(frame.scanout.is_none());
    assert!(frame.pixels.is_none());
    Ok(())
}

#[test]
fn failed_present_keeps_the_buffer() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    surface.clear(Color::BLUE)?;
    probe.fail_next(DisplayError::DeviceNotAvailable("unplugged".into()));
    assert_eq!(
        surface.present(),
        Err(DisplayError::DeviceNotAvailable("unplugged".into()))
    );
    assert_eq!(surface.get_pixel(2, 2)?, Color::BLUE);
    surface.present()?;
    Ok(())
}

#[test]
fn buffer_lost_by_driver_is_reallocated() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    surface.clear(Color::BLUE)?;
    probe.drop_frame_on_failure(true);
    probe.fail_next(DisplayError::DeviceNotAvailable("lost".into()));
    assert!(surface.present().is_err());

    assert_eq!(surface.get_dimensions()?, (4, 4));
    assert_eq!(surface.get_pixel(2, 2)?, Color::TRANSPARENT);
    surface.clear(Color::RED)?;
    Ok(())
}

#[test]
fn blit_through_the_surface_validates_source() -> Result<()> {
    let (mut surface, _probe) = initialized(4, 4)?;
    surface.blit(1, 1, 1, 1, &[9, 8, 7, 6], 4)?;
    assert_eq!(surface.get_pixel(1, 1)?, Color::from_rgba(9, 8, 7, 6));
    assert!(matches!(
        surface.blit(0, 0, 2, 2, &[0; 4], 8),
        Err(DisplayError::InvalidParameter(_))
    ));
    Ok(())
}

#[test]
fn framebuffer_mut_writes_are_visible() -> Result<()> {
    let (mut surface, _probe) = initialized(2, 2)?;
    let pitch = surface.pitch()? as usize;
    surface.framebuffer_mut()?[pitch..pitch + 4].copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(surface.get_pixel(0, 1)?, Color::from_rgba(1, 2, 3, 4));
    Ok(())
}

#[test]
fn vsync_paces_back_to_back_presents() -> Result<()> {
    let (mut surface, probe) = DisplaySurface::headless();
    surface.init(DisplayConfig::new(4, 4).with_vsync(true).with_refresh_rate(50))?;
    assert!(probe.vsync());

    let start = Instant::now();
    surface.present()?;
    surface.present()?;
    surface.present()?;
    // Two paced intervals of 20ms each.
    assert!(start.elapsed() >= Duration::from_millis(38), "{:?}", start.elapsed());

    surface.set_vsync(false)?;
    assert!(!surface.vsync()?);
    assert!(!probe.vsync());
    assert!(surface.config()?.vsync);
    let start = Instant::now();
    for _ in 0..5 {
        surface.present()?;
    }
    assert!(start.elapsed() < Duration::from_millis(100));
    Ok(())
}

// --- Metrics ---

#[test]
fn metrics_count_presents_and_reset() -> Result<()> {
    let (mut surface, _probe) = initialized(16, 16)?;
    for _ in 0..3 {
        surface.clear(Color::GRAY)?;
        surface.present()?;
    }
    let m = surface.get_metrics()?;
    assert_eq!(m.frame_count, 3);
    assert!(m.memory_usage_bytes >= 16 * 16 * 4);

    surface.fill_rect(&Rect::new(0, 0, 4, 4), Color::RED)?;
    surface.reset_metrics()?;
    let m = surface.get_metrics()?;
    assert_eq!(m.frame_count, 0);
    assert_eq!(m.fps, 0.0);
    assert_eq!(m.render_time_ms, 0.0);
    // Drawing state survives the reset.
    assert_eq!(surface.get_pixel(1, 1)?, Color::RED);

    surface.present()?;
    assert_eq!(surface.get_metrics()?.frame_count, 1);
    Ok(())
}

#[test]
fn debug_overlay_attaches_metrics_to_frames() -> Result<()> {
    let (driver, probe) = {
        let driver = HeadlessDisplayDriver::new();
        let probe = driver.probe();
        (driver, probe)
    };
    let metrics = MetricsConfig {
        window_size: 4,
        overlay_log_interval: 1,
    };
    let mut surface = DisplaySurface::with_metrics_config(Box::new(driver), metrics);
    surface.init(config(8, 8))?;

    surface.present()?;
    assert!(probe.last_frame().and_then(|f| f.overlay).is_none());

    surface.set_debug_overlay(true)?;
    assert!(probe.debug_overlay());
    assert!(surface.debug_overlay()?);
    surface.present()?;
    let overlay = probe.last_frame().and_then(|f| f.overlay);
    assert_eq!(overlay.map(|m| m.frame_count), Some(2));
    Ok(())
}

// --- Configuration setters ---

#[test]
fn brightness_is_clamped() -> Result<()> {
    let (mut surface, _probe) = initialized(4, 4)?;
    assert_eq!(surface.get_brightness()?, 1.0);
    surface.set_brightness(-0.5)?;
    assert_eq!(surface.get_brightness()?, 0.0);
    surface.set_brightness(2.0)?;
    assert_eq!(surface.get_brightness()?, 1.0);
    surface.set_brightness(0.3)?;
    assert_eq!(surface.get_brightness()?, 0.3);
    assert!(matches!(
        surface.set_brightness(f32::NAN),
        Err(DisplayError::InvalidParameter(_))
    ));
    assert_eq!(surface.get_brightness()?, 0.3);
    Ok(())
}

#[test]
fn invalid_rotation_leaves_state_unchanged() -> Result<()> {
    let (mut surface, _probe) = initialized(40, 30)?;
    surface.set_rotation(180)?;
    assert!(matches!(
        surface.set_rotation(45),
        Err(DisplayError::InvalidParameter(_))
    ));
    assert_eq!(surface.get_rotation()?, 180);
    assert_eq!(surface.get_dimensions()?, (40, 30));
    Ok(())
}

#[test]
fn quarter_rotations_swap_logical_dimensions() -> Result<()> {
    let (mut surface, _probe) = initialized(640, 480)?;
    surface.set_rotation(90)?;
    assert_eq!(surface.get_dimensions()?, (480, 640));
    assert_eq!(surface.get_info()?.width, 480);
    surface.set_rotation(270)?;
    assert_eq!(surface.get_dimensions()?, (480, 640));
    surface.set_rotation(180)?;
    assert_eq!(surface.get_dimensions()?, (640, 480));
    surface.set_rotation(0)?;
    assert_eq!(surface.get_dimensions()?, (640, 480));
    // Physical configuration is unaffected.
    assert_eq!((surface.config()?.width, surface.config()?.height), (640, 480));
    Ok(())
}

#[test]
fn rotation_preserves_the_physical_image() -> Result<()> {
    let (mut surface, probe) = initialized(4, 2)?;
    surface.set_pixel(0, 0, Color::RED)?;
    surface.set_rotation(90)?;
    // Under a clockwise quarter turn, physical top-left is logical bottom-left.
    assert_eq!(surface.get_pixel(0, 3)?, Color::RED);
    surface.set_rotation(0)?;
    assert_eq!(surface.get_pixel(0, 0)?, Color::RED);

    surface.present()?;
    assert_eq!(probe.last_frame().map(|f| f.rotation), Some(crate::config::Rotation::Deg0));
    Ok(())
}

#[test]
fn title_is_forwarded_and_stored() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    surface.set_title("frame loop")?;
    assert_eq!(surface.config()?.title, "frame loop");
    assert_eq!(probe.config().map(|c| c.title), Some("frame loop".to_string()));
    Ok(())
}

// --- Events ---

#[test]
fn close_request_ends_the_loop_and_latches() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    assert!(surface.handle_events()?);
    assert!(!surface.should_close());

    probe.push_event(DisplayEvent::CloseRequested);
    assert!(!surface.handle_events()?);
    assert!(surface.should_close());
    assert!(surface.should_close());
    assert!(!surface.handle_events()?);
    Ok(())
}

#[test]
fn escape_key_requests_close() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    probe.push_event(DisplayEvent::Key {
        symbol: KeySymbol::Escape,
        modifiers: Modifiers::empty(),
        text: None,
    });
    assert!(!surface.handle_events()?);
    assert_eq!(surface.take_events().len(), 1);
    Ok(())
}

#[test]
fn reinit_clears_the_close_latch() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    probe.push_event(DisplayEvent::CloseRequested);
    surface.handle_events()?;
    assert!(surface.should_close());
    surface.init(config(4, 4))?;
    assert!(!surface.should_close());
    Ok(())
}

#[test]
fn resize_reallocates_before_next_present() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    surface.clear(Color::GREEN)?;
    probe.push_event(DisplayEvent::Resize {
        width_px: 8,
        height_px: 2,
    });
    assert!(surface.handle_events()?);
    assert_eq!(surface.get_dimensions()?, (8, 2));
    assert_eq!(surface.framebuffer()?.len(), 8 * 2 * 4);
    assert_eq!(surface.get_pixel(3, 1)?, Color::GREEN);
    assert_eq!(surface.get_pixel(6, 1)?, Color::TRANSPARENT);

    surface.present()?;
    assert_eq!(probe.last_frame().map(|f| (f.width, f.height)), Some((8, 2)));
    Ok(())
}

#[test]
fn resize_respects_rotation() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    surface.set_rotation(90)?;
    probe.push_event(DisplayEvent::Resize {
        width_px: 10,
        height_px: 6,
    });
    surface.handle_events()?;
    assert_eq!(surface.get_dimensions()?, (6, 10));
    Ok(())
}

#[test]
fn posted_events_are_drained_by_handle_events() -> Result<()> {
    let (mut surface, _probe) = initialized(4, 4)?;
    let sender = surface.event_sender();
    let poster = std::thread::spawn(move || {
        sender.post(DisplayEvent::FocusLost)?;
        sender.post(DisplayEvent::CloseRequested)
    });
    poster
        .join()
        .map_err(|_| anyhow::anyhow!("poster thread panicked"))??;

    assert!(!surface.handle_events()?);
    assert_eq!(surface.take_events(), vec![DisplayEvent::FocusLost]);
    Ok(())
}

#[test]
fn input_events_are_kept_for_the_application() -> Result<()> {
    let (mut surface, probe) = initialized(4, 4)?;
    let click = DisplayEvent::MouseButtonPress {
        button: 1,
        x: 2,
        y: 3,
        modifiers: Modifiers::SHIFT,
    };
    probe.push_event(click.clone());
    probe.push_event(DisplayEvent::FocusGained);
    surface.handle_events()?;
    assert_eq!(surface.take_events(), vec![click, DisplayEvent::FocusGained]);
    assert!(surface.take_events().is_empty());
    Ok(())
}

// --- Screenshots ---

#[test]
fn screenshot_writes_ppm_through_the_backend() -> Result<()> {
    let (mut surface, probe) = initialized(3, 2)?;
    surface.clear(Color::BLUE)?;
    surface.set_pixel(0, 0, Color::from_rgba(10, 20, 30, 0))?;
    let path = temp_path("shot.ppm");
    surface.screenshot(&path)?;

    let bytes = std::fs::read(&path)?;
    let header = b"P6\n3 2\n255\n";
    assert_eq!(&bytes[..header.len()], header);
    assert_eq!(bytes.len(), header.len() + 3 * 2 * 3);
    assert_eq!(&bytes[header.len()..header.len() + 6], &[10, 20, 30, 0, 0, 255]);
    assert_eq!(probe.screenshots(), vec![path.clone()]);
    // The buffer came back.
    assert_eq!(surface.get_pixel(2, 1)?, Color::BLUE);
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn screenshot_to_unwritable_path_fails_and_keeps_buffer() -> Result<()> {
    let (mut surface, _probe) = initialized(2, 2)?;
    surface.clear(Color::YELLOW)?;
    let path = temp_path("missing-dir").join("nested").join("shot.ppm");
    assert!(matches!(
        surface.screenshot(&path),
        Err(DisplayError::ScreenshotFailed(_))
    ));
    assert_eq!(surface.get_pixel(1, 1)?, Color::YELLOW);
    Ok(())
}
