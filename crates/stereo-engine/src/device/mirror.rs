use winit::dpi::PhysicalSize;

use crate::error::PipelineError;
use crate::hmd::{Eye, PerEye, Pose, TargetSize};
use crate::stereo::{Compositor, RenderTarget};
use crate::time::FrameIndex;

use super::{Gpu, SurfaceErrorAction, WgpuEyeTarget};

/// Compositor that shows both eye targets side by side in the window.
///
/// Takes ownership of the window's [`Gpu`] and presents inside `end_frame`, so the
/// display surface never swaps on its own. Lens distortion is not applied.
pub struct MirrorCompositor {
    gpu: Gpu,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    open_frame: Option<FrameIndex>,
    dropped_frames: u64,
}

impl MirrorCompositor {
    pub fn new(gpu: Gpu) -> Self {
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirror shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mirror.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mirror bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirror pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mirror pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirror sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu,
            pipeline,
            bind_group_layout,
            sampler,
            open_frame: None,
            dropped_frames: 0,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Frames skipped because the surface was briefly unavailable.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Selects `Fifo` when `enabled`, `Immediate` otherwise (if supported).
    pub fn set_vsync(&mut self, enabled: bool) {
        let requested = if enabled {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::Immediate
        };

        let applied = self.gpu.set_present_mode(requested);
        if applied != requested {
            log::warn!("{requested:?} present mode unsupported; using {applied:?}");
        }
    }

    fn eye_bind_group(&self, eye: Eye, target: &WgpuEyeTarget) -> wgpu::BindGroup {
        self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(match eye {
                Eye::Left => "mirror left eye bind group",
                Eye::Right => "mirror right eye bind group",
            }),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(target.color_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

fn validate_frame(
    frame: FrameIndex,
    open_frame: Option<FrameIndex>,
    poses: &PerEye<Pose>,
    sizes: &PerEye<TargetSize>,
) -> Result<(), PipelineError> {
    if open_frame != Some(frame) {
        return Err(PipelineError::rejected(frame, "frame was not begun"));
    }

    for (eye, size) in sizes.iter() {
        if size.is_empty() {
            return Err(PipelineError::rejected(frame, format!("{eye} eye target is empty")));
        }
    }

    for (eye, pose) in poses.iter() {
        if !pose.is_finite() {
            return Err(PipelineError::rejected(frame, format!("{eye} eye pose is not finite")));
        }
    }

    Ok(())
}

impl Compositor<WgpuEyeTarget> for MirrorCompositor {
    fn begin_frame(&mut self, frame: FrameIndex) -> Result<(), PipelineError> {
        self.open_frame = Some(frame);
        Ok(())
    }

    fn end_frame(
        &mut self,
        frame: FrameIndex,
        poses: &PerEye<Pose>,
        targets: &PerEye<WgpuEyeTarget>,
    ) -> Result<(), PipelineError> {
        let sizes = targets.as_ref().map(|_, target| target.size());
        validate_frame(frame, self.open_frame.take(), poses, &sizes)?;

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized; the HMD view is still valid, only the mirror is hidden.
            return Ok(());
        }

        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(PipelineError::rejected(frame, "surface out of memory")),
                    action => {
                        self.dropped_frames += 1;
                        log::debug!("frame {frame} dropped ({action:?})");
                        Ok(())
                    }
                };
            }
        };

        let bind_groups = targets.as_ref().map(|eye, target| self.eye_bind_group(eye, target));
        let half_width = size.width as f32 * 0.5;

        {
            let mut rpass = gpu_frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mirror pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu_frame.view,
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

            rpass.set_pipeline(&self.pipeline);
            for (eye, bind_group) in bind_groups.iter() {
                let x = match eye {
                    Eye::Left => 0.0,
                    Eye::Right => half_width,
                };
                rpass.set_viewport(x, 0.0, half_width, size.height as f32, 0.0, 1.0);
                rpass.set_bind_group(0, bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
        }

        self.gpu.present(gpu_frame);
        Ok(())
    }
}
