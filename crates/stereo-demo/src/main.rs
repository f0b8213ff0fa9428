//! Hello Rift: a color cube at eye height, rendered per eye and mirrored to a window.
//!
//! Keys: `V` toggles vsync, `P` toggles low persistence, `R` recenters, `-`/`=` scale the
//! eye targets, `Esc` quits.

mod cube;

use anyhow::{Context, Result};

use stereo_engine::device::{GpuInit, MirrorCompositor, WgpuTargets};
use stereo_engine::hmd::{DEFAULT_EYE_HEIGHT, HmdSession, SessionConfig, TrackingSource};
use stereo_engine::logging::{LoggingConfig, init_logging};
use stereo_engine::stereo::{FrameSubmitter, LoopControl, LoopSummary, StereoConfig, StereoLoop};
use stereo_engine::window::{KeyCode, LogicalSize, RuntimeConfig, WinitSurface};

use crate::cube::CubeScene;

type HelloRift = StereoLoop<WinitSurface, HmdSession, WgpuTargets, MirrorCompositor, CubeScene>;

/// The mirror window is a quarter of the panel resolution.
const MIRROR_SCALE: f64 = 0.25;

const DENSITY_STEP: f32 = 0.25;
const DENSITY_RANGE: (f32, f32) = (0.25, 2.0);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let session_config = SessionConfig::default();
    let session = HmdSession::open(&session_config).context("failed to open HMD session")?;
    let desc = session.description().clone();
    let caps = session.caps();
    log::info!("hmd: {} ({}x{})", desc.product_name, desc.resolution.width, desc.resolution.height);

    let runtime = RuntimeConfig {
        title: format!("Hello Rift - {}", desc.product_name),
        initial_size: LogicalSize::new(
            desc.resolution.width as f64 * MIRROR_SCALE,
            desc.resolution.height as f64 * MIRROR_SCALE,
        ),
    };
    let gpu_init = GpuInit {
        present_mode: if caps.no_vsync {
            wgpu::PresentMode::Immediate
        } else {
            wgpu::PresentMode::Fifo
        },
        ..GpuInit::default()
    };

    let mut surface = WinitSurface::open(runtime, gpu_init)?;
    let gpu = surface
        .take_presentation()
        .context("window surface has no presenter")?;
    let ctx = gpu.context();
    let compositor = MirrorCompositor::new(gpu);

    let submitter = FrameSubmitter::new(&desc, StereoConfig::default(), WgpuTargets::new(ctx.clone()))?;
    let scene = CubeScene::new(&ctx, session_config.ipd, DEFAULT_EYE_HEIGHT);

    let mut app = StereoLoop::new(surface, session, submitter, compositor, scene);
    let result = run(&mut app);

    let (surface, session, compositor, _scene) = app.into_parts();
    if compositor.dropped_frames() > 0 {
        log::info!("mirror dropped {} frames", compositor.dropped_frames());
    }
    drop(compositor);
    drop(surface);
    session.shutdown();

    let summary = result?;
    log::info!(
        "exiting after {} frames ({} untracked)",
        summary.frames,
        summary.untracked_frames
    );
    Ok(())
}

fn run(app: &mut HelloRift) -> Result<LoopSummary> {
    loop {
        if app.step()? == LoopControl::Exit {
            return Ok(app.summary());
        }
        handle_input(app);
    }
}

fn handle_input(app: &mut HelloRift) {
    for key in app.surface_mut().drain_keys() {
        match key {
            KeyCode::KeyV => {
                let caps = app.tracking_mut().update_caps(|c| c.no_vsync = !c.no_vsync);
                app.compositor_mut().set_vsync(!caps.no_vsync);
                log::info!("vsync {}", if caps.no_vsync { "off" } else { "on" });
            }
            KeyCode::KeyP => {
                let caps = app
                    .tracking_mut()
                    .update_caps(|c| c.low_persistence = !c.low_persistence);
                log::info!("low persistence {}", if caps.low_persistence { "on" } else { "off" });
            }
            KeyCode::KeyR => {
                app.tracking_mut().recenter();
                log::info!("view recentered");
            }
            KeyCode::Minus => scale_targets(app, -DENSITY_STEP),
            KeyCode::Equal => scale_targets(app, DENSITY_STEP),
            _ => {}
        }
    }

    if let Some(size) = app.surface_mut().take_resize() {
        app.compositor_mut().resize(size);
    }
}

fn scale_targets(app: &mut HelloRift, step: f32) {
    let current = app.submitter().config().pixel_density;
    let density = (current + step).clamp(DENSITY_RANGE.0, DENSITY_RANGE.1);
    if density == current {
        return;
    }
    if let Err(err) = app.submitter_mut().set_pixel_density(density) {
        log::warn!("pixel density {density} not applied: {err}");
    }
}
