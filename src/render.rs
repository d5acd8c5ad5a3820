use crate::constants::{CLEAR_SRGB, DEPTH_FORMAT};
use crate::core::geometry::{box_mesh, plane_mesh};
use crate::core::{
    FrameView, RenderError, SceneSurface, StripInstance, Viewport, BAR_DEPTH, BAR_HEIGHT,
    PLANE_HEIGHT, STRIP_SEGMENTS, STRIP_WIDTH,
};
use web_sys as web;

mod helpers;
mod strips;
mod targets;

use helpers::GpuMesh;
use strips::{CameraUniforms, StripPipelines};
use targets::RenderTargets;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    pipelines: StripPipelines,
    bar_mesh: GpuMesh,
    plane_mesh: GpuMesh,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<StripInstance>,
    clear_color: wgpu::Color,
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("strip_instances"),
        size: (capacity.max(1) * std::mem::size_of::<StripInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height, DEPTH_FORMAT);
        let pipelines = strips::create_strip_pipelines(&device, format);
        let bar_mesh = helpers::upload_mesh(
            &device,
            "bar_mesh",
            &box_mesh(STRIP_WIDTH, BAR_HEIGHT, BAR_DEPTH, STRIP_SEGMENTS, 1, 1),
        );
        let plane_mesh = helpers::upload_mesh(
            &device,
            "plane_mesh",
            &plane_mesh(STRIP_WIDTH, PLANE_HEIGHT, STRIP_SEGMENTS, 1),
        );
        let instance_buffer = create_instance_buffer(&device, 0);
        log::info!("[gpu] surface {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            pipelines,
            bar_mesh,
            plane_mesh,
            instance_buffer,
            instance_capacity: 0,
            instances: Vec::new(),
            clear_color: helpers::clear_color(CLEAR_SRGB, format.is_srgb()),
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.targets.recreate(&self.device, width, height);
        }
    }

    fn upload_instances(&mut self, frame: &FrameView<'_>) {
        frame.corridor.write_instances(&mut self.instances);
        if self.instances.len() > self.instance_capacity {
            self.instance_buffer.destroy();
            self.instance_buffer = create_instance_buffer(&self.device, self.instances.len());
            self.instance_capacity = self.instances.len();
        }
        if !self.instances.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }
        let camera = CameraUniforms {
            view_proj: frame.camera.view_proj().to_cols_array_2d(),
            plane_drop: frame.corridor.plane_drop(),
            strip_width: STRIP_WIDTH,
            _pad: [0.0; 2],
        };
        self.queue.write_buffer(
            &self.pipelines.camera_buffer,
            0,
            bytemuck::bytes_of(&camera),
        );
    }

    pub fn render(&mut self, frame: &FrameView<'_>) -> Result<(), wgpu::SurfaceError> {
        self.upload_instances(frame);
        let output = self.surface.get_current_texture()?;
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
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let count = self.instances.len() as u32;
            if count > 0 {
                rpass.set_bind_group(0, &self.pipelines.bind_group, &[]);
                rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for (pipeline, mesh) in [
                    (&self.pipelines.bar, &self.bar_mesh),
                    (&self.pipelines.plane, &self.plane_mesh),
                ] {
                    rpass.set_pipeline(pipeline);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..count);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// Scene surface backed by WebGPU, or a no-op when WebGPU is unavailable.
pub struct GpuSurface {
    gpu: Option<GpuState>,
}

impl GpuSurface {
    pub fn new(gpu: Option<GpuState>) -> Self {
        Self { gpu }
    }
}

impl SceneSurface for GpuSurface {
    fn resize(&mut self, viewport: Viewport) {
        if let Some(g) = &mut self.gpu {
            let (w, h) = viewport.physical_size();
            g.resize_if_needed(w, h);
        }
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let Some(g) = &mut self.gpu else {
            return Ok(());
        };
        match g.render(frame) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                g.reconfigure();
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(RenderError::Timeout),
            Err(e) => Err(RenderError::Other(format!("{:?}", e))),
        }
    }

    fn release(&mut self) {
        if let Some(g) = self.gpu.take() {
            g.instance_buffer.destroy();
            g.targets.depth_tex.destroy();
            log::info!("[gpu] released");
        }
    }
}
