//! wgpu implementation of the figure renderer.
use std::num::NonZeroU64;

use iced::{
    Rectangle,
    wgpu::{util::DeviceExt, *},
};

use crate::{
    figure::Figure,
    line::Vertex,
    plot::PlotId,
    render::{Backend, FramePlan, GpuScene, MeshKey, RenderError, Topology},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ProjectionUniform {
    matrix: [[f32; 4]; 4],
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<ProjectionUniform>() as u64;

/// A vertex buffer owned by exactly one scene slot.
#[derive(Debug)]
pub(crate) struct WgpuMesh {
    buffer: Buffer,
    draw_count: u32,
}

impl Drop for WgpuMesh {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

pub(crate) struct WgpuBackend<'a> {
    device: &'a Device,
}

impl Backend for WgpuBackend<'_> {
    type Mesh = WgpuMesh;

    fn upload(
        &mut self,
        plot: PlotId,
        key: MeshKey,
        vertices: &[Vertex],
        topology: Topology,
    ) -> Result<WgpuMesh, RenderError> {
        if vertices.is_empty() {
            return Err(RenderError::EmptyMesh(key));
        }
        // No loop primitive in wgpu: close the outline and draw it as a strip.
        let closed;
        let data = if topology == Topology::LineLoop {
            closed = [vertices, &vertices[..1]].concat();
            closed.as_slice()
        } else {
            vertices
        };

        let label = format!("{plot} {key}");
        let buffer = self.device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::cast_slice(data),
            usage: BufferUsages::VERTEX,
        });
        Ok(WgpuMesh {
            buffer,
            draw_count: data.len() as u32,
        })
    }
}

/// Shader module and the two pipelines every figure draw goes through.
struct Program {
    bind_group_layout: BindGroupLayout,
    strip: RenderPipeline,
    list: RenderPipeline,
}

impl Program {
    fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(include_wgsl!("shaders/figure.wgsl"));
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("figure projection bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("figure layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let strip = line_pipeline(
            device,
            &layout,
            &shader,
            format,
            PrimitiveTopology::LineStrip,
            "figure line strip pipeline",
        );
        let list = line_pipeline(
            device,
            &layout,
            &shader,
            format,
            PrimitiveTopology::LineList,
            "figure line list pipeline",
        );

        Self {
            bind_group_layout,
            strip,
            list,
        }
    }

    fn pipeline(&self, topology: Topology) -> &RenderPipeline {
        match topology {
            Topology::LineList => &self.list,
            Topology::LineLoop | Topology::LineStrip => &self.strip,
        }
    }
}

fn line_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    format: TextureFormat,
    topology: PrimitiveTopology,
    label: &str,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: PipelineCompilationOptions::default(),
            buffers: &[VertexBufferLayout {
                // vec2<f32> position (8) + vec3<f32> color (12) = 20
                array_stride: Vertex::STRIDE,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: VertexFormat::Float32x2,
                    },
                    VertexAttribute {
                        offset: std::mem::size_of::<[f32; 2]>() as u64,
                        shader_location: 1,
                        format: VertexFormat::Float32x3,
                    },
                ],
            }],
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: PipelineCompilationOptions::default(),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
        }),
        primitive: PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// One projection matrix per plot pass, addressed with dynamic offsets.
struct ProjectionBuffer {
    buffer: Buffer,
    bind_group: BindGroup,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl ProjectionBuffer {
    const MIN_CAPACITY: usize = 4;

    fn new(device: &Device, layout: &BindGroupLayout, capacity: usize) -> Self {
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        let stride = UNIFORM_SIZE.div_ceil(align) * align;
        let capacity = capacity.max(Self::MIN_CAPACITY).next_power_of_two();
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some("figure projections"),
            size: stride * capacity as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("figure projections bg"),
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_SIZE),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn offset(&self, pass: usize) -> u32 {
        (pass as u64 * self.stride) as u32
    }

    /// Writes every pass' projection with a single queue write.
    fn upload(&mut self, device: &Device, queue: &Queue, layout: &BindGroupLayout, plan: &FramePlan) {
        let count = plan.passes.len();
        if count == 0 {
            return;
        }
        if count > self.capacity {
            *self = Self::new(device, layout, count);
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * count, 0);
        for (i, pass) in plan.passes.iter().enumerate() {
            let uniform = ProjectionUniform {
                matrix: pass.projection.to_cols_array_2d(),
            };
            let start = i * stride;
            self.staging[start..start + UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}

/// Owns all GPU state of a shown figure.
///
/// Fields drop in declaration order, so every mesh is released before the
/// projection buffer and the program.
pub(crate) struct FigureRenderer {
    scene: GpuScene<WgpuMesh>,
    plan: FramePlan,
    projections: ProjectionBuffer,
    program: Program,
}

impl FigureRenderer {
    pub(crate) fn new(device: &Device, format: TextureFormat) -> Self {
        let program = Program::new(device, format);
        let projections =
            ProjectionBuffer::new(device, &program.bind_group_layout, ProjectionBuffer::MIN_CAPACITY);
        tracing::debug!(?format, "figure renderer created");
        Self {
            scene: GpuScene::new(),
            plan: FramePlan::default(),
            projections,
            program,
        }
    }

    /// Uploads new geometry, plans the frame and writes the projections.
    pub(crate) fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        figure: &Figure,
        framebuffer: (u32, u32),
    ) {
        self.scene.sync(&mut WgpuBackend { device }, figure);
        self.plan = FramePlan::build(figure, &self.scene, framebuffer);
        self.projections
            .upload(device, queue, &self.program.bind_group_layout, &self.plan);
    }

    pub(crate) fn render(
        &self,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        let c = self.plan.clear_color;
        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("iced_figure frame"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: f64::from(c.r),
                        g: f64::from(c.g),
                        b: f64::from(c.b),
                        a: f64::from(c.a),
                    }),
                    store: StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let (_, fb_height) = self.plan.framebuffer;
        let clip_right = (clip_bounds.x + clip_bounds.width) as f32;
        let clip_bottom = (clip_bounds.y + clip_bounds.height) as f32;

        for (i, plot_pass) in self.plan.passes.iter().enumerate() {
            let Some(gpu) = self.scene.plot(plot_pass.plot) else {
                continue;
            };
            if plot_pass.viewport.is_empty() {
                continue;
            }

            // Plot viewports have a bottom-left origin; wgpu's is top-left.
            let (x, y) = plot_pass.viewport.top_left_origin(fb_height);
            let x = clip_bounds.x as f32 + x.max(0.0);
            let y = clip_bounds.y as f32 + y.max(0.0);
            let width = plot_pass.viewport.width.min(clip_right - x);
            let height = plot_pass.viewport.height.min(clip_bottom - y);
            if !(width >= 1.0 && height >= 1.0) {
                continue;
            }

            pass.set_viewport(x, y, width, height, 0.0, 1.0);
            pass.set_bind_group(0, &self.projections.bind_group, &[self.projections.offset(i)]);
            for draw in &plot_pass.draws {
                if let Some(mesh) = gpu.mesh(draw.mesh) {
                    pass.set_pipeline(self.program.pipeline(draw.topology));
                    pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                    pass.draw(0..mesh.draw_count, 0..1);
                }
            }
        }
    }
}

impl Drop for FigureRenderer {
    fn drop(&mut self) {
        tracing::debug!(plots = self.scene.len(), "figure renderer released");
    }
}
