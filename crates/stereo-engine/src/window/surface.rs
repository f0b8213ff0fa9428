use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::stereo::DisplaySurface;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "stereo".to_string(),
            initial_size: LogicalSize::new(960.0, 540.0),
        }
    }
}

/// Event state collected between polls.
struct SurfaceHandler {
    config: RuntimeConfig,
    window: Option<Arc<Window>>,
    init_error: Option<anyhow::Error>,
    close_requested: bool,
    pressed: Vec<KeyCode>,
    resized: Option<PhysicalSize<u32>>,
}

impl SurfaceHandler {
    fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            window: None,
            init_error: None,
            close_requested: false,
            pressed: Vec::new(),
            resized: None,
        }
    }
}

impl ApplicationHandler for SurfaceHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        match event_loop.create_window(attrs).context("failed to create window") {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,

            WindowEvent::Resized(size) => self.resized = Some(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.resized = Some(window.inner_size());
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape {
                        self.close_requested = true;
                    }
                    self.pressed.push(code);
                }
            }

            _ => {}
        }
    }
}

/// A winit window polled once per render-loop iteration.
///
/// Owns a [`Gpu`] presenter until a compositor takes it with
/// [`take_presentation`](Self::take_presentation); from then on
/// [`swap_buffers`](DisplaySurface::swap_buffers) does nothing.
pub struct WinitSurface {
    event_loop: EventLoop<()>,
    handler: SurfaceHandler,
    window: Arc<Window>,
    presenter: Option<Gpu>,
    warned_swap: bool,
}

impl WinitSurface {
    /// Creates the window and a GPU context bound to it.
    pub fn open(config: RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = SurfaceHandler::new(config);

        // The window can only be created from inside the event loop.
        let window = loop {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut handler);

            if let Some(err) = handler.init_error.take() {
                return Err(err);
            }
            if let Some(window) = &handler.window {
                break window.clone();
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited with code {code} before a window was created");
            }
        };

        let gpu = pollster::block_on(Gpu::new(window.clone(), gpu_init))
            .context("GPU initialization failed for window")?;

        log::info!(
            "window opened: {}x{} ({:?})",
            gpu.size().width,
            gpu.size().height,
            gpu.surface_format()
        );

        Ok(Self {
            event_loop,
            handler,
            window,
            presenter: Some(gpu),
            warned_swap: false,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Hands the window's GPU presenter to a compositor.
    pub fn take_presentation(&mut self) -> Option<Gpu> {
        let gpu = self.presenter.take();
        if gpu.is_some() {
            log::debug!("window presentation handed to compositor");
        }
        gpu
    }

    /// Keys pressed since the last call, in press order.
    pub fn drain_keys(&mut self) -> Vec<KeyCode> {
        std::mem::take(&mut self.handler.pressed)
    }

    /// Latest size change not yet applied to a presenter.
    pub fn take_resize(&mut self) -> Option<PhysicalSize<u32>> {
        self.handler.resized.take()
    }

}

impl DisplaySurface for WinitSurface {
    fn poll_events(&mut self) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if let PumpStatus::Exit(_) = status {
            self.handler.close_requested = true;
        }

        if let Some(gpu) = self.presenter.as_mut() {
            if let Some(size) = self.handler.resized.take() {
                gpu.resize(size);
            }
        }
    }

    fn should_close(&self) -> bool {
        self.handler.close_requested
    }

    fn swap_buffers(&mut self) {
        let Some(gpu) = self.presenter.as_mut() else {
            if !self.warned_swap {
                log::warn!("swap_buffers ignored: presentation is owned by the compositor");
                self.warned_swap = true;
            }
            return;
        };

        match gpu.begin_frame() {
            Ok(mut frame) => {
                {
                    let _clear = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("window clear pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &frame.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });
                }
                gpu.present(frame);
            }
            Err(err) => {
                let action = gpu.handle_surface_error(err);
                log::debug!("swap skipped: {action:?}");
            }
        }
    }
}
