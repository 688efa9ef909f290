//! GPU rendering for the cubelet grid.
//!
//! Draws all cubelets with one instanced call: a single unit-cube mesh with
//! per-face colours, and one model matrix per cubelet.

use iced::Size;
use iced::widget::shader::wgpu::{self, CommandEncoder, Device, Queue, TextureFormat, TextureView};
use nalgebra::{Matrix4, Vector4};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::cube::{CUBE_VERTICES, CubeGrid, FACE_COLORS, FACE_NORMALS};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 4],
}

/// Per-cubelet data uploaded for instanced drawing.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct InstanceRaw {
    model: [[f32; 4]; 4],
    tint: [f32; 4],
}

/// Unit cube mesh with each face in its sticker colour.
pub(crate) fn cube_vertices() -> Vec<Vertex> {
    CUBE_VERTICES
        .chunks(6)
        .zip(FACE_NORMALS.iter().zip(FACE_COLORS.iter()))
        .flat_map(|(face, (&normal, &color))| {
            let color: [f32; 4] = Vector4::from(color).into();
            face.iter().map(move |&position| Vertex {
                position,
                normal,
                color,
            })
        })
        .collect()
}

/// One instance per cubelet: world transform scaled from the [-1, 1] mesh.
pub(crate) fn generate_instances(grid: &CubeGrid) -> Vec<InstanceRaw> {
    let scale = Matrix4::new_scaling(grid.cubelet_size() * 0.5);
    grid.cubelets
        .iter()
        .map(|cubelet| InstanceRaw {
            model: (cubelet.world_transform(&grid.aggregate).to_homogeneous() * scale).into(),
            tint: [1.0; 4],
        })
        .collect()
}

#[derive(Debug)]
pub(crate) struct Renderer {
    /// Pipeline drawing the shared cube mesh once per instance
    render_pipeline: wgpu::RenderPipeline,
    /// Unit-cube mesh with per-face colours
    vertex_buffer: wgpu::Buffer,
    /// Vertices in the mesh (36)
    num_vertices: u32,
    /// One model matrix and tint per cubelet
    instance_buffer: wgpu::Buffer,
    /// Instances currently held by `instance_buffer`
    num_instances: u32,
    /// View-projection uniform
    camera_buffer: wgpu::Buffer,
    /// Binds `camera_buffer` at group 0
    camera_bind_group: wgpu::BindGroup,
    /// Depth attachment sized to the render target
    depth_texture: wgpu::Texture,
    /// View over `depth_texture` used by the render pass
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// Build the pipeline and buffers.
    ///
    /// Validation errors raised while creating the pipeline are logged rather
    /// than left to the device's uncaptured error handler.
    pub(crate) fn new(device: &Device, format: TextureFormat, target_size: Size<u32>) -> Self {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Camera Bind Group Layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cubelet Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("cube.wgsl").into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&camera_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x4,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertices = cube_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = create_instance_buffer(device, 0);
        let (depth_texture, depth_view) = create_depth_texture(device, target_size);

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            log::error!("cubelet pipeline failed validation: {error}");
        }

        Self {
            render_pipeline,
            vertex_buffer,
            num_vertices: vertices.len() as u32,
            instance_buffer,
            num_instances: 0,
            camera_buffer,
            camera_bind_group,
            depth_texture,
            depth_view,
        }
    }

    /// Keep the depth buffer the size of the render target.
    pub(crate) fn resize(&mut self, device: &Device, target_size: Size<u32>) {
        if target_size.width > 0
            && target_size.height > 0
            && (self.depth_texture.width() != target_size.width
                || self.depth_texture.height() != target_size.height)
        {
            let (texture, view) = create_depth_texture(device, target_size);
            self.depth_texture = texture;
            self.depth_view = view;
        }
    }

    pub(crate) fn update_camera(&mut self, queue: &Queue, camera_uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera_uniform]));
    }

    pub(crate) fn update_instances(&mut self, device: &Device, queue: &Queue, instances: &[InstanceRaw]) {
        let count = instances.len() as u32;
        if count != self.num_instances {
            self.instance_buffer = create_instance_buffer(device, instances.len());
            self.num_instances = count;
        }
        if count > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    /// Draw into the part of `target` covered by `clip_bounds`, on top of what is there.
    pub(crate) fn render(
        &self,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        clip_bounds: &iced::Rectangle<u32>,
    ) {
        if clip_bounds.width == 0 || clip_bounds.height == 0 || self.num_instances == 0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cubelet Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
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
        });

        render_pass.set_viewport(
            clip_bounds.x as f32,
            clip_bounds.y as f32,
            clip_bounds.width as f32,
            clip_bounds.height as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            clip_bounds.x,
            clip_bounds.y,
            clip_bounds.width,
            clip_bounds.height,
        );
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.draw(0..self.num_vertices, 0..self.num_instances);
    }
}

fn create_instance_buffer(device: &Device, count: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        // Zero-sized vertex buffers are rejected, so always keep room for one.
        size: (count.max(1) * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(device: &Device, size: Size<u32>) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
