mod error;
mod primitives;
mod process;
mod scene;

use std::iter;
use std::path::Path;
use std::time::Instant;

use cgmath::{perspective, Deg, Matrix4, Point3, SquareMatrix, Vector3};
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use anyhow::Context;

pub use error::{ViewerError, ViewerResult};
pub use primitives::camera::{Camera, CameraController, CameraUniform};
pub use primitives::mesh::MeshData;
pub use primitives::texture::Texture;
pub use primitives::textured_mesh::TexturedMesh;
pub use primitives::vertex::Vertex;
pub use process::bmp::{load_bmp, parse_bmp, BmpImage};
pub use process::ply::{load_ply, parse_ply};
pub use scene::{load_scene, SceneEntry, HOUSE_SCENE};

use process::pipeline::{
    camera_bind_group_layout, create_render_pipeline, create_shader, texture_bind_group_layout,
};

/// wgpu clip space is half-depth compared to OpenGL's.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub const FOVY_DEG: f32 = 45.0;
pub const Z_NEAR: f32 = 0.001;
pub const Z_FAR: f32 = 1000.0;
pub const ASSETS_DIR: &str = "assets";

/// Process arguments: surface size plus the historical step-size value,
/// which is accepted but consumed by nothing.
pub struct ViewerOptions {
    pub width: u32,
    pub height: u32,
    pub step_size: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 700,
            step_size: 0.1,
        }
    }
}

pub struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Window,
    opaque_pipeline: wgpu::RenderPipeline,
    blend_pipeline: wgpu::RenderPipeline,
    depth_texture: Texture,
    camera: Camera,
    camera_controller: CameraController,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    meshes: Vec<TexturedMesh>,
    last_frame: Instant,
}

impl State {
    pub async fn new(window: Window) -> ViewerResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(&window) }
            .map_err(|e| ViewerError::BackendInit(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| ViewerError::BackendInit("no compatible adapter found".into()))?;

        log::info!("{:#?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::BackendInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = create_shader(&device, "Mesh Shader", include_str!("shaders/mesh.wgsl")).await?;

        let camera = Camera::new(
            Point3::new(0.5, 0.4, 0.5),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let camera_controller = CameraController::new();
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.set_view_proj(build_view_proj(&camera, size.width, size.height));
        let camera_buffer = camera_uniform.to_buffer(&device);

        let camera_layout = camera_bind_group_layout(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let texture_layout = texture_bind_group_layout(&device);
        let layouts = [&camera_layout, &texture_layout];
        let opaque_pipeline = create_render_pipeline(
            &device,
            &shader,
            &layouts,
            config.format,
            false,
            "Opaque Pipeline",
        );
        let blend_pipeline = create_render_pipeline(
            &device,
            &shader,
            &layouts,
            config.format,
            true,
            "Blend Pipeline",
        );

        let depth_texture = Texture::create_depth_texture(&device, &config, "Depth Texture");

        let meshes = load_scene(&device, &queue, &texture_layout, Path::new(ASSETS_DIR))?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            opaque_pipeline,
            blend_pipeline,
            depth_texture,
            camera,
            camera_controller,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            meshes,
            last_frame: Instant::now(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                Texture::create_depth_texture(&self.device, &self.config, "Depth Texture");
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        self.camera_controller.process_events(event)
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.camera.update(&self.camera_controller, dt);
        self.camera_uniform
            .set_view_proj(build_view_proj(&self.camera, self.size.width, self.size.height));
        self.camera_uniform
            .update_buffer(&self.camera_buffer, &self.queue);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
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
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.2,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            // Fixed draw order: the whole opaque set, then the whole
            // transparent set, each in manifest order.
            render_pass.set_pipeline(&self.opaque_pipeline);
            for mesh in self.meshes.iter().filter(|m| !m.is_transparent()) {
                mesh.draw(&mut render_pass);
            }
            render_pass.set_pipeline(&self.blend_pipeline);
            for mesh in self.meshes.iter().filter(|m| m.is_transparent()) {
                mesh.draw(&mut render_pass);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn build_view_proj(camera: &Camera, width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width as f32 / height as f32;
    let projection = perspective(Deg(FOVY_DEG), aspect, Z_NEAR, Z_FAR);
    let model = Matrix4::identity();
    OPENGL_TO_WGPU_MATRIX * projection * camera.view_matrix() * model
}

pub async fn run(opts: ViewerOptions) -> anyhow::Result<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("House")
        .with_inner_size(LogicalSize::new(opts.width, opts.height))
        .build(&event_loop)
        .context("failed to open window")?;

    let mut state = State::new(window)
        .await
        .context("failed to initialize the viewer")?;

    log::info!("render started");

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window().id() => {
                if !state.input(event) {
                    match event {
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            input:
                                KeyboardInput {
                                    state: ElementState::Pressed,
                                    virtual_keycode: Some(VirtualKeyCode::Escape),
                                    ..
                                },
                            ..
                        } => *control_flow = ControlFlow::Exit,
                        WindowEvent::Resized(physical_size) => {
                            state.resize(*physical_size);
                        }
                        WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                            state.resize(**new_inner_size);
                        }
                        _ => {}
                    }
                }
            }
            Event::RedrawRequested(window_id) if window_id == state.window().id() => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size)
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(wgpu::SurfaceError::Timeout) => log::warn!("surface timeout"),
                }
            }
            Event::MainEventsCleared => {
                state.window().request_redraw();
            }
            _ => {}
        }
    });
}
