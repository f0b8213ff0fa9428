/// Parameters for the window's GPU presenter.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Eye targets are sRGB; a matching mirror surface avoids a double gamma step.
    pub prefer_srgb: bool,

    /// Initial present mode. `Fifo` follows the HMD's vsync cap; `Immediate` is
    /// requested when vsync is off and falls back to `Fifo` if unsupported.
    pub present_mode: wgpu::PresentMode,

    /// `max_texture_dimension_2d` bounds the per-eye target size.
    pub required_limits: wgpu::Limits,

    /// Frames queued ahead of the display. One keeps motion-to-photon latency low.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 1,
        }
    }
}
