//! The visible pass: lit, checker-textured objects over a reference grid.

use wgpu::util::DeviceExt;

use crate::error::HoverPickError;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::{checker_pixels, RenderTarget, SampledTexture};
use crate::mesh::{grid_lines, GridVertex, Vertex};
use crate::options::DisplayOptions;
use crate::scene::Scene;

/// Checker texture size in texels; one texel per cell.
const CHECKER_SIZE: (u32, u32) = (2, 2);

/// Pipelines and resources for drawing the scene to the screen.
pub struct ScenePass {
    mesh_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    depth: RenderTarget,
    checker_bind_group: wgpu::BindGroup,
    grid_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
}

impl ScenePass {
    /// Build both pipelines for the context's color format.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Shader`] if a shader fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        display: &DisplayOptions,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, HoverPickError> {
        let device = &context.device;
        let format = context.format();

        let texture_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Checker Bind Group Layout"),
                entries: &[
                    pipeline_helpers::texture_2d(0),
                    pipeline_helpers::filtering_sampler(1),
                ],
            });

        let [first, second] = display.checker_colors;
        let checker = SampledTexture::from_rgba8(
            device,
            &context.queue,
            "Checker Texture",
            CHECKER_SIZE,
            &checker_pixels(CHECKER_SIZE, (1, 1), first, second),
        );
        let checker_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Checker Bind Group"),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &checker.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(
                            &checker.sampler,
                        ),
                    },
                ],
            });

        let mesh_pipeline = create_mesh_pipeline(
            device,
            format,
            &[camera_layout, object_layout, &texture_layout],
            &shader_composer.compose(device, Shader::Scene)?,
        );
        let grid_pipeline = create_grid_pipeline(
            device,
            format,
            camera_layout,
            &shader_composer.compose(device, Shader::Grid)?,
        );

        let grid = grid_lines(display.grid_slices, display.grid_spacing);
        let grid_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Grid Vertex Buffer"),
                contents: bytemuck::cast_slice(&grid),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            mesh_pipeline,
            grid_pipeline,
            depth: RenderTarget::depth(device, "Scene Depth Texture", context.size()),
            checker_bind_group,
            grid_buffer,
            grid_vertex_count: grid.len() as u32,
        })
    }

    /// Recreate the depth target if the size changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.depth.size() {
            return;
        }
        self.depth =
            RenderTarget::depth(device, "Scene Depth Texture", (width, height));
    }

    /// Record the visible pass into `encoder`, drawing to `view`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        camera_bind_group: &wgpu::BindGroup,
        scene: &Scene,
        display: &DisplayOptions,
    ) {
        let mut render_pass =
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(
                    pipeline_helpers::clear_color_attachment(
                        view,
                        display.clear(),
                    ),
                )],
                depth_stencil_attachment: Some(
                    pipeline_helpers::clear_depth_attachment(&self.depth.view),
                ),
                ..Default::default()
            });

        render_pass.set_bind_group(0, camera_bind_group, &[]);

        if display.show_grid && self.grid_vertex_count > 0 {
            render_pass.set_pipeline(&self.grid_pipeline);
            render_pass.set_vertex_buffer(0, self.grid_buffer.slice(..));
            render_pass.draw(0..self.grid_vertex_count, 0..1);
        }

        render_pass.set_pipeline(&self.mesh_pipeline);
        render_pass.set_bind_group(2, &self.checker_bind_group, &[]);
        for object in scene.objects() {
            render_pass.set_bind_group(1, object.bind_group(), &[]);
            object.mesh().draw(&mut render_pass);
        }
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Mesh Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Mesh Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(pipeline_helpers::depth_stencil()),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_grid_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Grid Pipeline Layout"),
            bind_group_layouts: &[camera_layout],
            push_constant_ranges: &[],
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Grid Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[GridVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(pipeline_helpers::depth_stencil()),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
