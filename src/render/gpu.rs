use std::sync::Arc;

use glam::Vec2;
use winit::window::Window;

use super::instance::CircleInstance;
use super::pipeline::{CirclePipeline, MAX_INSTANCES};
use super::DrawSurface;
use crate::color::Color;
use crate::error::GpuError;

/// Core GPU state — device, queue, surface, pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub circle_pipeline: CirclePipeline,
}

impl GpuState {
    /// Initialize wgpu and the circle rendering pipeline.
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        // On Windows: DX12 only — Vulkan WSI doesn't support transparent composition.
        // Use DirectComposition presentation for per-pixel alpha transparency.
        #[cfg(windows)]
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::DX12,
            backend_options: wgpu::BackendOptions {
                dx12: wgpu::Dx12BackendOptions {
                    presentation_system: wgpu_types::Dx12SwapchainKind::DxgiFromVisual,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        });
        #[cfg(not(windows))]
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("swarmfx_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .find(|f| **f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        log::info!("Available alpha modes: {:?}", surface_caps.alpha_modes);

        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PostMultiplied)
        {
            wgpu::CompositeAlphaMode::PostMultiplied
        } else {
            wgpu::CompositeAlphaMode::Auto
        };

        // One tick per display refresh, so stay on vsync.
        let present_mode = wgpu::PresentMode::Fifo;

        log::info!(
            "Surface: format={:?}, alpha_mode={:?}, present_mode={:?}",
            format,
            alpha_mode,
            present_mode,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let circle_pipeline = CirclePipeline::new(&device, format);
        circle_pipeline.update_screen_size(
            &queue,
            surface_config.width as f32,
            surface_config.height as f32,
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            circle_pipeline,
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.circle_pipeline
            .update_screen_size(&self.queue, width as f32, height as f32);
    }

    /// Upload instance data for this frame.
    pub fn update_instances(&mut self, instances: &[CircleInstance]) {
        self.circle_pipeline.update_instances(&self.queue, instances);
    }

    /// Clear to transparent, draw all uploaded circles, present.
    /// Skips the frame if the surface is lost or outdated.
    pub fn render_frame(&self) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("circle_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let p = &self.circle_pipeline;
            if p.num_instances > 0 {
                render_pass.set_pipeline(&p.pipeline);
                render_pass.set_bind_group(0, &p.screen_bind_group, &[]);
                render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, p.instance_buffer.slice(..));
                render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..6, 0, 0..p.num_instances);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

// ---------------------------------------------------------------------------
// Overlay surface
// ---------------------------------------------------------------------------

/// Drop circles whose center lies inside the rectangle; a full clear empties the list.
///
/// The swarm renderer always clears the whole surface. Partial clears only
/// exist so any `DrawSurface::clear_rect` caller gets the documented result.
fn clear_instances(instances: &mut Vec<CircleInstance>, min: Vec2, max: Vec2, surface: Vec2) {
    if min.x <= 0.0 && min.y <= 0.0 && max.x >= surface.x && max.y >= surface.y {
        instances.clear();
    } else {
        instances.retain(|c| {
            let p = c.center();
            p.x < min.x || p.y < min.y || p.x > max.x || p.y > max.y
        });
    }
}

/// [`DrawSurface`] backed by the overlay window's wgpu swapchain.
///
/// Draw calls are batched as circle instances and submitted in one
/// instanced draw when the frame is flushed.
pub struct OverlaySurface {
    gpu: GpuState,
    instances: Vec<CircleInstance>,
    width: u32,
    height: u32,
    detached: bool,
}

impl OverlaySurface {
    pub fn new(gpu: GpuState) -> Self {
        let width = gpu.surface_config.width;
        let height = gpu.surface_config.height;
        Self {
            gpu,
            instances: Vec::with_capacity(MAX_INSTANCES),
            width,
            height,
            detached: false,
        }
    }
}

impl DrawSurface for OverlaySurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.gpu.resize(width, height);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let surface = Vec2::new(self.width as f32, self.height as f32);
        clear_instances(
            &mut self.instances,
            Vec2::new(x, y),
            Vec2::new(x + width, y + height),
            surface,
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.instances.push(CircleInstance::solid(center, radius, color));
    }

    fn fill_circle_glow(&mut self, center: Vec2, radius: f32, color: Color, blur: f32, glow: Color) {
        self.instances
            .push(CircleInstance::glowing(center, radius, color, blur, glow));
    }

    fn flush(&mut self) {
        if self.detached {
            return;
        }
        self.gpu.update_instances(&self.instances);
        self.gpu.render_frame();
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        // Present one empty frame so nothing lingers on screen.
        self.instances.clear();
        self.gpu.update_instances(&self.instances);
        self.gpu.render_frame();
        self.detached = true;
        log::info!("Overlay surface detached");
    }
}
