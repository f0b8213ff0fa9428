use crate::error::PipelineError;
use crate::hmd::{Eye, TargetSize};
use crate::stereo::{RenderTarget, TargetBackend};

use super::GpuContext;

/// Color format of eye targets. Sampled by the compositor.
pub const EYE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const EYE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Offscreen color + depth attachment pair for one eye.
///
/// The views keep their textures alive.
pub struct WgpuEyeTarget {
    size: TargetSize,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl WgpuEyeTarget {
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }
}

impl RenderTarget for WgpuEyeTarget {
    fn size(&self) -> TargetSize {
        self.size
    }
}

/// Recording state for one eye.
///
/// Holds its own encoder; the commands are submitted when the pass is deactivated.
pub struct WgpuEyePass {
    pub eye: Eye,
    pub size: TargetSize,
    ctx: GpuContext,
    encoder: wgpu::CommandEncoder,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl WgpuEyePass {
    pub fn queue(&self) -> &wgpu::Queue {
        &self.ctx.queue
    }

    /// Opens a render pass on the eye target, clearing color to `clear` and depth to 1.
    ///
    /// The viewport covers the whole target.
    pub fn begin_render_pass(&mut self, clear: wgpu::Color) -> wgpu::RenderPass<'_> {
        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(match self.eye {
                Eye::Left => "left eye pass",
                Eye::Right => "right eye pass",
            }),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(0.0, 0.0, self.size.width as f32, self.size.height as f32, 0.0, 1.0);
        rpass
    }
}

/// wgpu implementation of [`TargetBackend`].
pub struct WgpuTargets {
    ctx: GpuContext,
    max_dimension: u32,
}

impl WgpuTargets {
    pub fn new(ctx: GpuContext) -> Self {
        let max_dimension = ctx.device.limits().max_texture_dimension_2d;
        Self { ctx, max_dimension }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    fn create_texture(
        &self,
        eye: Eye,
        size: TargetSize,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        let label = match (eye, format == EYE_DEPTH_FORMAT) {
            (Eye::Left, false) => "left eye color",
            (Eye::Left, true) => "left eye depth",
            (Eye::Right, false) => "right eye color",
            (Eye::Right, true) => "right eye depth",
        };

        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
    }
}

fn check_target_size(eye: Eye, size: TargetSize, max_dimension: u32) -> Result<(), PipelineError> {
    let reason = if size.is_empty() {
        "empty extent".to_string()
    } else if size.width > max_dimension || size.height > max_dimension {
        format!("exceeds device limit of {max_dimension} pixels per side")
    } else {
        return Ok(());
    };

    Err(PipelineError::TargetAllocation { eye, size, reason })
}

/// Out-of-memory takes precedence over validation failures.
fn scoped_allocation_error(
    eye: Eye,
    size: TargetSize,
    out_of_memory: Option<wgpu::Error>,
    validation: Option<wgpu::Error>,
) -> Result<(), PipelineError> {
    match out_of_memory.or(validation) {
        None => Ok(()),
        Some(err) => Err(PipelineError::TargetAllocation { eye, size, reason: err.to_string() }),
    }
}

impl TargetBackend for WgpuTargets {
    type Target = WgpuEyeTarget;
    type Pass = WgpuEyePass;

    fn allocate(&mut self, eye: Eye, size: TargetSize) -> Result<WgpuEyeTarget, PipelineError> {
        check_target_size(eye, size, self.max_dimension)?;

        // Capture allocation failures instead of handing them to the uncaptured-error handler.
        let oom_scope = self.ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation_scope = self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let color = self.create_texture(
            eye,
            size,
            EYE_COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let depth = self.create_texture(eye, size, EYE_DEPTH_FORMAT, wgpu::TextureUsages::RENDER_ATTACHMENT);

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let validation = pollster::block_on(validation_scope.pop());
        let out_of_memory = pollster::block_on(oom_scope.pop());
        scoped_allocation_error(eye, size, out_of_memory, validation)?;

        Ok(WgpuEyeTarget { size, color_view, depth_view })
    }

    fn activate(&mut self, eye: Eye, target: &WgpuEyeTarget) -> WgpuEyePass {
        let encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("eye encoder"),
            });

        WgpuEyePass {
            eye,
            size: target.size,
            ctx: self.ctx.clone(),
            encoder,
            color_view: target.color_view.clone(),
            depth_view: target.depth_view.clone(),
        }
    }

    fn deactivate(&mut self, pass: WgpuEyePass) {
        self.ctx.queue.submit(std::iter::once(pass.encoder.finish()));
    }
}
