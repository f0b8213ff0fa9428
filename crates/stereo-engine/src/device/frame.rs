/// A surface texture acquired for presentation.
///
/// Short-lived: holding the surface texture prevents acquisition of the next one.
/// Presentation happens in [`Gpu::present`](super::Gpu::present).
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
