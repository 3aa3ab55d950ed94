//! wgpu renderer for the backdrop scene.
//!
//! One shader module, three pipelines (filled triangles, line lists and
//! instanced point billboards). No depth buffer: everything is translucent
//! and blended back to front in draw order over a transparent clear.

use backdrop_core::scene::{Material, MaterialKind};
use backdrop_core::{DrawFrame, Mesh, NodeId, Topology};
use fnv::FnvHashMap;
use web_sys as web;

mod helpers;
mod uniforms;

use helpers::{PipelineDesc, NORMAL_ATTR, VEC3_ATTR};
pub use uniforms::{DrawUniforms, GlobalsUniforms};

/// CPU-side mesh waiting for (or handed to) the GPU.
#[derive(Clone, Debug)]
pub struct MeshUpload {
    pub node: NodeId,
    pub mesh: Mesh,
    pub material: Material,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pass {
    Fill,
    Lines,
    Points,
}

fn pass_for(mesh: &Mesh, material: &Material) -> Pass {
    match (material.kind, mesh.topology) {
        (MaterialKind::Points { .. }, _) | (_, Topology::Points) => Pass::Points,
        (MaterialKind::Wireframe, _) | (_, Topology::Lines) => Pass::Lines,
        (MaterialKind::Surface, Topology::Triangles) => Pass::Fill,
    }
}

struct GpuMesh {
    pass: Pass,
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: Option<(wgpu::Buffer, u32)>,
    vertex_count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,

    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,

    meshes: FnvHashMap<NodeId, GpuMesh>,
}

impl GpuState {
    pub async fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("backdrop_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {e:?}"))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // the page must show through wherever nothing is drawn
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            log::warn!("[gpu] premultiplied alpha unsupported; backdrop may be opaque");
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(backdrop_core::SCENE_WGSL.into()),
        });
        let globals_layout = helpers::uniform_layout(&device, "globals_bgl");
        let draw_layout = helpers::uniform_layout(&device, "draw_bgl");
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let mesh_buffers = [
            helpers::vec3_layout(&VEC3_ATTR, wgpu::VertexStepMode::Vertex),
            helpers::vec3_layout(&NORMAL_ATTR, wgpu::VertexStepMode::Vertex),
        ];
        let fill_pipeline = helpers::make_scene_pipeline(
            &device,
            &layout,
            &shader,
            format,
            PipelineDesc {
                label: "fill_pipeline",
                vs_entry: "vs_mesh",
                fs_entry: "fs_lit",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        );
        let line_pipeline = helpers::make_scene_pipeline(
            &device,
            &layout,
            &shader,
            format,
            PipelineDesc {
                label: "line_pipeline",
                vs_entry: "vs_mesh",
                fs_entry: "fs_lit",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
            },
        );
        let point_pipeline = helpers::make_scene_pipeline(
            &device,
            &layout,
            &shader,
            format,
            PipelineDesc {
                label: "point_pipeline",
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &[helpers::vec3_layout(&VEC3_ATTR, wgpu::VertexStepMode::Instance)],
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        );

        let globals_buffer = helpers::uniform_buffer(
            &device,
            "globals_uniforms",
            &<GlobalsUniforms as bytemuck::Zeroable>::zeroed(),
        );
        let globals_bind_group =
            helpers::bind_uniform(&device, "globals_bg", &globals_layout, &globals_buffer);

        log::info!("[gpu] ready: {width}x{height} {format:?} {alpha_mode:?}");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            fill_pipeline,
            line_pipeline,
            point_pipeline,
            meshes: FnvHashMap::default(),
        })
    }

    /// Create vertex, index and uniform buffers for every upload. Meshes
    /// already on the GPU are replaced.
    pub fn upload_all(&mut self, uploads: &[MeshUpload]) {
        for upload in uploads {
            if upload.mesh.vertex_count() == 0 {
                continue;
            }
            let mesh = self.create_mesh(upload);
            self.meshes.insert(upload.node, mesh);
        }
        log::info!("[gpu] {} meshes resident", self.meshes.len());
    }

    fn create_mesh(&self, upload: &MeshUpload) -> GpuMesh {
        let MeshUpload { mesh, material, .. } = upload;
        let pass = pass_for(mesh, material);
        let index_data = match pass {
            Pass::Fill => mesh.indices.clone(),
            Pass::Lines => mesh.wireframe_indices(),
            Pass::Points => Vec::new(),
        };
        let indices = (!index_data.is_empty()).then(|| {
            (
                helpers::index_buffer(&self.device, "mesh_indices", &index_data),
                index_data.len() as u32,
            )
        });
        let uniforms = helpers::uniform_buffer(
            &self.device,
            "draw_uniforms",
            &<DrawUniforms as bytemuck::Zeroable>::zeroed(),
        );
        let bind_group = helpers::bind_uniform(&self.device, "draw_bg", &self.draw_layout, &uniforms);
        GpuMesh {
            pass,
            positions: helpers::vertex_buffer(&self.device, "mesh_positions", &mesh.positions),
            normals: helpers::vertex_buffer(&self.device, "mesh_normals", &mesh.normals),
            indices,
            vertex_count: mesh.vertex_count() as u32,
            uniforms,
            bind_group,
        }
    }

    /// Overwrite the position buffer of a resident mesh. A length mismatch is
    /// ignored; buffers never grow after creation.
    pub fn write_positions(&self, node: NodeId, positions: &[[f32; 3]]) {
        if let Some(mesh) = self.meshes.get(&node) {
            if positions.len() == mesh.vertex_count as usize {
                self.queue
                    .write_buffer(&mesh.positions, 0, bytemuck::cast_slice(positions));
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn render(&mut self, frame: &DrawFrame<'_>) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&GlobalsUniforms::from_frame(frame)),
        );
        for item in frame.items {
            if let Some(mesh) = self.meshes.get(&item.node) {
                self.queue.write_buffer(
                    &mesh.uniforms,
                    0,
                    bytemuck::bytes_of(&DrawUniforms::from_item(item)),
                );
            }
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);

            for item in frame.items {
                let Some(mesh) = self.meshes.get(&item.node) else {
                    continue;
                };
                rpass.set_bind_group(1, &mesh.bind_group, &[]);
                match mesh.pass {
                    Pass::Points => {
                        rpass.set_pipeline(&self.point_pipeline);
                        rpass.set_vertex_buffer(0, mesh.positions.slice(..));
                        rpass.draw(0..6, 0..mesh.vertex_count);
                    }
                    Pass::Fill | Pass::Lines => {
                        let pipeline = if mesh.pass == Pass::Fill {
                            &self.fill_pipeline
                        } else {
                            &self.line_pipeline
                        };
                        rpass.set_pipeline(pipeline);
                        rpass.set_vertex_buffer(0, mesh.positions.slice(..));
                        rpass.set_vertex_buffer(1, mesh.normals.slice(..));
                        match &mesh.indices {
                            Some((buffer, count)) => {
                                rpass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                                rpass.draw_indexed(0..*count, 0, 0..1);
                            }
                            None => rpass.draw(0..mesh.vertex_count, 0..1),
                        }
                    }
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Drop every buffer and destroy the device.
    pub fn release(mut self) {
        let count = self.meshes.len();
        self.meshes.clear();
        self.device.destroy();
        log::info!("[gpu] released {count} meshes");
    }
}

