//! Windowed viewer: event loop, input and frame composition.
//!
//! [`run`] drives a set of emitters in an orbit-camera window. Controls:
//! left-drag orbits, scroll zooms, `Space` pauses the simulation, `V`
//! toggles visibility, `W` toggles the wireframe debug view, `R` restarts.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::emitter::Emitter;
use crate::error::{GpuError, RunError};
use crate::gpu::GpuContext;
use crate::render::{EmitterBuffers, ParticleRenderer, StreamMode};
use crate::texture::{SpriteImage, SpriteTexture};
use crate::time::Time;

/// One emitter plus how to draw it: its sprite and streaming mode.
pub struct EmitterSetup {
    pub emitter: Emitter,
    pub sprite: SpriteImage,
    pub mode: StreamMode,
}

impl EmitterSetup {
    pub fn new(emitter: Emitter, sprite: SpriteImage, mode: StreamMode) -> Self {
        Self {
            emitter,
            sprite,
            mode,
        }
    }
}

/// Opens a window and runs the emitters until it closes.
pub fn run(title: &str, setups: Vec<EmitterSetup>) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(title, setups);
    event_loop.run_app(&mut app)?;

    // Window and GPU bring-up happen inside `resumed`, which cannot return
    // errors; surface the stashed one after the loop winds down.
    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Scene {
    gpu: GpuContext,
    renderer: ParticleRenderer,
    camera: Camera,
    time: Time,
    emitters: Vec<(Emitter, EmitterBuffers)>,
    wireframe: bool,
}

impl Scene {
    fn new(window: Arc<Window>, setups: Vec<EmitterSetup>) -> Result<Self, GpuError> {
        let gpu = pollster::block_on(GpuContext::new(window))?;
        let renderer = ParticleRenderer::new(&gpu);

        let emitters = setups
            .into_iter()
            .map(|setup| {
                // The bind group keeps the texture alive; the CPU image is
                // no longer needed after upload.
                let sprite = SpriteTexture::new(&gpu.device, &gpu.queue, &setup.sprite);
                let buffers = renderer.create_buffers(&gpu, &setup.emitter, &sprite, setup.mode);
                (setup.emitter, buffers)
            })
            .collect();

        Ok(Self {
            gpu,
            renderer,
            camera: Camera::new(),
            time: Time::new(),
            emitters,
            wireframe: false,
        })
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (_, dt) = self.time.update();
        for (emitter, _) in &mut self.emitters {
            emitter.update(dt);
        }

        let output = self.gpu.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (emitter, buffers) in &mut self.emitters {
            self.renderer.prepare(&self.gpu, buffers, emitter, &self.camera);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (emitter, buffers) in &self.emitters {
                self.renderer
                    .draw(&mut render_pass, buffers, emitter, self.wireframe);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn toggle_paused(&mut self) {
        let pause = self.emitters.iter().any(|(e, _)| !e.is_paused());
        for (emitter, _) in &mut self.emitters {
            emitter.set_paused(pause);
        }
    }

    fn toggle_visible(&mut self) {
        let hide = self.emitters.iter().any(|(e, _)| e.is_visible());
        for (emitter, _) in &mut self.emitters {
            emitter.set_visible(!hide);
        }
    }

    fn restart(&mut self) {
        for (emitter, _) in &mut self.emitters {
            emitter.clear();
        }
        self.time.reset();
    }

    fn live_total(&self) -> usize {
        self.emitters.iter().map(|(e, _)| e.live_count()).sum()
    }
}

struct App {
    title: String,
    setups: Vec<EmitterSetup>,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    init_error: Option<RunError>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn new(title: &str, setups: Vec<EmitterSetup>) -> Self {
        Self {
            title: title.to_string(),
            setups,
            window: None,
            scene: None,
            init_error: None,
            mouse_pressed: false,
            last_mouse_pos: None,
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match code {
            KeyCode::Space => scene.toggle_paused(),
            KeyCode::KeyV => scene.toggle_visible(),
            KeyCode::KeyW => {
                if scene.gpu.supports_wireframe() {
                    scene.wireframe = !scene.wireframe;
                } else {
                    log::warn!("wireframe not supported by this adapter");
                }
            }
            KeyCode::KeyR => scene.restart(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                self.init_error = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match Scene::new(window, std::mem::take(&mut self.setups)) {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                self.init_error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(scene) = &mut self.scene {
                    scene.gpu.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(scene) = &mut self.scene {
                            scene.camera.orbit(-dx * 0.005, dy * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(scene) = &mut self.scene {
                    scene.camera.zoom(scroll * 0.3);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(code);
            }
            WindowEvent::RedrawRequested => {
                if let Some(scene) = &mut self.scene {
                    match scene.frame() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            scene.gpu.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("surface out of memory");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("render error: {:?}", e),
                    }

                    if let Some(window) = &self.window {
                        if scene.time.frame() % 30 == 0 {
                            window.set_title(&format!(
                                "{} | {:.0} fps | {} particles",
                                self.title,
                                scene.time.fps(),
                                scene.live_total(),
                            ));
                        }
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}
