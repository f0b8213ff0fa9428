use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use stereo_engine::device::{EYE_COLOR_FORMAT, EYE_DEPTH_FORMAT, GpuContext, WgpuEyePass};
use stereo_engine::hmd::{Eye, PerEye};
use stereo_engine::stereo::{EyeView, SceneRenderer};

/// Half extent of the floor, in meters.
const FLOOR_HALF_EXTENT: f32 = 10.0;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.1, g: 0.12, b: 0.18, a: 1.0 };

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
    checker: f32,
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // color
        2 => Float32    // checker
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// Cube faces as (outward normal, color). Positive faces are saturated, negative faces dim.
const FACES: [(Vec3, [f32; 3]); 6] = [
    (Vec3::X, [1.0, 0.0, 0.0]),
    (Vec3::NEG_X, [0.0, 1.0, 1.0]),
    (Vec3::Y, [0.0, 1.0, 0.0]),
    (Vec3::NEG_Y, [1.0, 0.0, 1.0]),
    (Vec3::Z, [0.0, 0.0, 1.0]),
    (Vec3::NEG_Z, [1.0, 1.0, 0.0]),
];

/// Unit color cube transformed by `model`, plus a checkered floor at y = 0.
fn build_mesh(model: Mat4) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(FACES.len() * 4 + 4);
    let mut indices = Vec::with_capacity(FACES.len() * 6 + 6);

    for (normal, color) in FACES {
        // Two axes spanning the face, ordered so the quad winds counter-clockwise
        // seen from outside.
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);
        let center = normal * 0.5;

        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = model.transform_point3(center + u * su + v * sv);
            vertices.push(Vertex { position: p.to_array(), color, checker: 0.0 });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let e = FLOOR_HALF_EXTENT;
    let base = vertices.len() as u16;
    for (x, z) in [(-e, e), (e, e), (e, -e), (-e, -e)] {
        vertices.push(Vertex { position: [x, 0.0, z], color: [0.7, 0.7, 0.7], checker: 1.0 });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

    (vertices, indices)
}

/// A color cube at eye height, scaled to the user's IPD, over a floor.
///
/// The camera sits `5 * ipd` behind the cube looking at it.
pub struct CubeScene {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    cameras: PerEye<(wgpu::Buffer, wgpu::BindGroup)>,
    base_view: Mat4,
}

impl CubeScene {
    pub fn new(ctx: &GpuContext, ipd: f32, eye_height: f32) -> Self {
        let device = &ctx.device;

        let model = Mat4::from_translation(Vec3::new(0.0, eye_height, 0.0)) * Mat4::from_scale(Vec3::splat(ipd));
        let (vertices, indices) = build_mesh(model);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube scene vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube scene ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube scene pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube scene pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: EYE_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: EYE_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // One uniform per eye: each eye's commands are submitted separately.
        let cameras = PerEye::from_fn(|eye| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(match eye {
                    Eye::Left => "left eye camera ubo",
                    Eye::Right => "right eye camera ubo",
                }),
                size: std::mem::size_of::<CameraUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("cube scene camera bind group"),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            (buffer, bind_group)
        });

        let eye = Vec3::new(0.0, eye_height, ipd * 5.0);
        let target = Vec3::new(0.0, eye_height, 0.0);

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            cameras,
            base_view: Mat4::look_at_rh(eye, target, Vec3::Y),
        }
    }
}

impl SceneRenderer<WgpuEyePass> for CubeScene {
    fn render(&mut self, pass: &mut WgpuEyePass, view: &EyeView) {
        let (camera, bind_group) = &self.cameras[view.eye];
        let uniform = CameraUniform {
            view_proj: view.view_projection().to_cols_array_2d(),
        };
        pass.queue().write_buffer(camera, 0, bytemuck::bytes_of(&uniform));

        let mut rpass = pass.begin_render_pass(CLEAR_COLOR);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn base_view(&self) -> Mat4 {
        self.base_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_indices_stay_in_range() {
        let (vertices, indices) = build_mesh(Mat4::IDENTITY);
        assert_eq!(vertices.len(), 28);
        assert_eq!(indices.len(), 42);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let (vertices, indices) = build_mesh(Mat4::IDENTITY);
        for (face, (normal, _)) in FACES.iter().enumerate() {
            let tri = &indices[face * 6..face * 6 + 3];
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(vertices[i as usize].position));
            let n = (b - a).cross(c - a).normalize();
            assert!(n.abs_diff_eq(*normal, 1e-5), "face {face}: {n} vs {normal}");
        }
    }

    #[test]
    fn model_places_cube_at_eye_height() {
        let model = Mat4::from_translation(Vec3::new(0.0, 1.675, 0.0)) * Mat4::from_scale(Vec3::splat(0.064));
        let (vertices, _) = build_mesh(model);
        let cube = &vertices[..24];
        let max_y = cube.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let min_y = cube.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((max_y - (1.675 + 0.032)).abs() < 1e-5);
        assert!((min_y - (1.675 - 0.032)).abs() < 1e-5);
    }

    #[test]
    fn floor_is_front_facing_from_above() {
        let (vertices, indices) = build_mesh(Mat4::IDENTITY);
        let tri = &indices[36..39];
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(vertices[i as usize].position));
        assert!((b - a).cross(c - a).y > 0.0);
    }
}
