mod batch;
mod composite;
mod shader;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use batch::{Vertex, VertexBatch};
use composite::CompositeState;
use shader::{Uniforms, SHADER_SOURCE};

use crate::config::SurfaceHints;
use crate::error::GpuError;

/// Vertices the buffer holds before its first growth.
const INITIAL_VERTEX_CAPACITY: usize = 16 * 1024;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    composite: CompositeState,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_count: u32,
    clear_color: wgpu::Color,
    opacity: f32,
    /// Physical pixels per logical pixel; vertices arrive in logical pixels.
    scale_factor: f64,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, hints: &SurfaceHints) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = choose_format(&surface_caps.formats)?;
        let alpha_mode = choose_alpha_mode(&surface_caps.alpha_modes, hints.background.is_none())?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms {
            viewport: logical_viewport(config.width, config.height, scale_factor),
            opacity: hints.opacity,
            _padding: 0.0,
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            multiview: None,
            cache: None,
        });

        let composite =
            CompositeState::new(&device, &uniform_buffer, config.width, config.height, config.format);

        let vertex_buffer = create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);

        let clear_color = match hints.background {
            Some([r, g, b]) => wgpu::Color {
                r: r as f64 / 255.0,
                g: g as f64 / 255.0,
                b: b as f64 / 255.0,
                a: 1.0,
            },
            None => wgpu::Color::TRANSPARENT,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            composite,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            vertex_count: 0,
            clear_color,
            opacity: hints.opacity,
            scale_factor,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.composite.resize(
                &self.device,
                &self.uniform_buffer,
                self.config.width,
                self.config.height,
                self.config.format,
            );
            self.write_uniforms();
        }
    }

    /// The window moved to a display with a different pixel density.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
        self.write_uniforms();
    }

    /// Reconfigure the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize(PhysicalSize::new(self.config.width, self.config.height));
    }

    fn write_uniforms(&self) {
        let uniforms = Uniforms {
            viewport: logical_viewport(self.config.width, self.config.height, self.scale_factor),
            opacity: self.opacity,
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Copy a tessellated frame to the GPU, growing the buffer if needed.
    pub fn upload(&mut self, batch: &VertexBatch) {
        if batch.len() > self.vertex_capacity {
            self.vertex_capacity = batch.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.device, self.vertex_capacity);
            log::debug!("Grew vertex buffer to {} vertices", self.vertex_capacity);
        }

        if !batch.is_empty() {
            self.queue.write_buffer(&self.vertex_buffer, 0, batch.as_bytes());
        }
        self.vertex_count = batch.len() as u32;
    }

    /// Draw the most recently uploaded frame.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.composite.view,
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

            if self.vertex_count > 0 {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..self.vertex_count, 0..1);
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.composite.pipeline);
            render_pass.set_bind_group(0, &self.composite.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Vertex Buffer"),
        size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Surface size in the logical pixels vertices are expressed in.
fn logical_viewport(width: u32, height: u32, scale_factor: f64) -> [f32; 2] {
    [
        (width as f64 / scale_factor) as f32,
        (height as f64 / scale_factor) as f32,
    ]
}

/// Canvas colors are specified and blended in sRGB space, so prefer a
/// non-sRGB target that lets the values through untouched.
fn choose_format(formats: &[wgpu::TextureFormat]) -> Result<wgpu::TextureFormat, GpuError> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .ok_or(GpuError::UnsupportedSurface)
}

fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> Result<wgpu::CompositeAlphaMode, GpuError> {
    let fallback = modes.first().copied().ok_or(GpuError::UnsupportedSurface)?;
    if !transparent {
        return Ok(fallback);
    }

    match modes.iter().find(|m| **m == wgpu::CompositeAlphaMode::PreMultiplied) {
        Some(mode) => Ok(*mode),
        None => {
            log::warn!("Surface does not support transparency; background will be opaque");
            Ok(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, TextureFormat};

    #[test]
    fn test_format_prefers_non_srgb() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_format(&formats).unwrap(), TextureFormat::Bgra8Unorm);

        let srgb_only = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(choose_format(&srgb_only).unwrap(), TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_empty_capabilities_are_errors() {
        assert!(matches!(choose_format(&[]), Err(GpuError::UnsupportedSurface)));
        assert!(matches!(choose_alpha_mode(&[], false), Err(GpuError::UnsupportedSurface)));
        assert!(matches!(choose_alpha_mode(&[], true), Err(GpuError::UnsupportedSurface)));
    }

    #[test]
    fn test_alpha_mode_selection() {
        let modes = [CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, false).unwrap(), CompositeAlphaMode::Opaque);
        assert_eq!(choose_alpha_mode(&modes, true).unwrap(), CompositeAlphaMode::PreMultiplied);

        let opaque_only = [CompositeAlphaMode::Opaque];
        assert_eq!(choose_alpha_mode(&opaque_only, true).unwrap(), CompositeAlphaMode::Opaque);
    }

    #[test]
    fn test_logical_viewport() {
        assert_eq!(logical_viewport(2560, 1440, 2.0), [1280.0, 720.0]);
        assert_eq!(logical_viewport(800, 600, 1.0), [800.0, 600.0]);
    }
}
