use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use lightscene::PointLight;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

const SHADER_SOURCE: &str = include_str!("shaders/lighting.wgsl");

/// Fraction of the clip-space half extent the lights may occupy.
const VIEW_MARGIN: f32 = 0.9;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct LightingUniforms {
    resolution: [f32; 2],
    time: f32,
    dpi_scale: f32,
    view: [f32; 4],
    light_count: u32,
    _padding: [u32; 3],
}

impl LightingUniforms {
    pub(crate) fn new(light_count: u32, view: [f32; 4]) -> Self {
        Self {
            light_count,
            view,
            dpi_scale: 1.0,
            ..Self::default()
        }
    }

    pub(crate) fn set_frame(&mut self, size: PhysicalSize<u32>, time: f32, dpi_scale: f32) {
        self.resolution = [size.width.max(1) as f32, size.height.max(1) as f32];
        self.time = time;
        self.dpi_scale = dpi_scale;
    }
}

/// Light count as the shader sees it; the storage index is a `u32`.
pub(crate) fn shader_light_count(len: usize) -> Result<u32> {
    u32::try_from(len).with_context(|| format!("{len} point lights exceed the shader's u32 light count"))
}

/// Centre and scale that fit every light's XZ footprint into the view.
/// Returned as `[centre_x, centre_z, scale, 0]`.
pub(crate) fn scene_view(lights: &[PointLight]) -> [f32; 4] {
    let mut iter = lights.iter();
    let Some(first) = iter.next() else {
        return [0.0, 0.0, 1.0, 0.0];
    };

    let mut min = [first.position[0], first.position[2]];
    let mut max = min;
    for light in iter {
        let point = [light.position[0], light.position[2]];
        for axis in 0..2 {
            min[axis] = min[axis].min(point[axis]);
            max[axis] = max[axis].max(point[axis]);
        }
    }

    let centre = [(min[0] + max[0]) * 0.5, (min[1] + max[1]) * 0.5];
    let half_extent = ((max[0] - min[0]).max(max[1] - min[1])) * 0.5;
    let scale = if half_extent > f32::EPSILON {
        VIEW_MARGIN / half_extent
    } else {
        1.0
    };
    [centre[0], centre[1], scale, 0.0]
}

/// Full-screen pass that shades every point light; this is the workload the
/// profiler brackets each frame.
pub(crate) struct LightingPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    _light_buffer: wgpu::Buffer,
    uniforms: LightingUniforms,
}

impl LightingPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        lights: &[PointLight],
    ) -> Result<Self> {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lighting shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let uniforms = LightingUniforms::new(shader_light_count(lights.len())?, scene_view(lights));
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lighting uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Storage bindings cannot be empty.
        let placeholder = [PointLight::zeroed()];
        let light_data: &[PointLight] = if lights.is_empty() {
            &placeholder
        } else {
            lights
        };
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("point lights"),
            contents: bytemuck::cast_slice(light_data),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lighting pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lighting pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
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
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group,
            uniform_buffer,
            _light_buffer: light_buffer,
            uniforms,
        })
    }

    pub(crate) fn update(
        &mut self,
        queue: &wgpu::Queue,
        size: PhysicalSize<u32>,
        time: f32,
        dpi_scale: f32,
    ) {
        self.uniforms.set_frame(size, time, dpi_scale);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        timestamp_writes: Option<wgpu::RenderPassTimestampWrites<'_>>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lighting pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
