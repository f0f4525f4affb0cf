// src/app.rs
//! winit glue and the frame lockstep loop
//!
//! One thread does everything, in order: fold input events, advance the
//! timer, run the engine update, render the shadow-cube faces, render the
//! main pass. Device and surface failures reaching this level are fatal;
//! they are logged and the event loop exits.

use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::engine::Engine;
use crate::gfx::camera::CameraProperties;
use crate::gfx::error::GfxError;
use crate::gfx::light::SHADOW_CUBE_FACES;
use crate::gfx::rendering::renderer::{PassTarget, Renderer};
use crate::input::{InputState, KeyCode};
use crate::timer::Timer;

/// One-shot scene construction callback, run once the device exists
pub type SceneSetup = Box<dyn FnOnce(&mut Renderer, &mut Engine) -> Result<(), GfxError>>;

pub struct ShadowboxApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    engine: Engine,
    input: InputState,
    timer: Timer,
    scene_setup: Option<SceneSetup>,
}

impl ShadowboxApp {
    /// Create a new application with default settings
    pub fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                renderer: None,
                engine: Engine::new(CameraProperties::default()),
                input: InputState::new(),
                timer: Timer::new(),
                scene_setup: None,
            },
        }
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.app_state.engine
    }

    /// Defers scene construction until the GPU device exists
    pub fn set_scene_setup<F>(&mut self, setup: F)
    where
        F: FnOnce(&mut Renderer, &mut Engine) -> Result<(), GfxError> + 'static,
    {
        self.app_state.scene_setup = Some(Box::new(setup));
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl Default for ShadowboxApp {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    fn render_frame(&mut self) -> Result<(), GfxError> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let timer_state = self.timer.update();
        self.engine.update(timer_state, &self.input);

        let buffers = renderer.frame_buffers();
        for slot in 0..self.engine.light_count() {
            for face in 0..SHADOW_CUBE_FACES {
                let Some(mut scene) = self.engine.shadow_scene(slot, face, buffers) else {
                    continue;
                };
                renderer.render_pass(
                    PassTarget::ShadowFace {
                        light_slot: slot as u32,
                        face: face as u32,
                    },
                    &mut scene,
                )?;
            }
        }

        let mut scene = self.engine.main_scene(buffers);
        renderer.render_pass(PassTarget::Main, &mut scene)
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("shadowbox")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let mut renderer = match pollster::block_on(Renderer::new(window, width, height)) {
            Ok(renderer) => renderer,
            Err(err) => {
                error!("Failed to initialize renderer: {}", err);
                event_loop.exit();
                return;
            }
        };

        self.engine
            .camera_mut()
            .set_aspect_ratio(renderer.aspect_ratio());

        if let Some(setup) = self.scene_setup.take() {
            if let Err(err) = setup(&mut renderer, &mut self.engine) {
                error!("Scene setup failed: {}", err);
                event_loop.exit();
                return;
            }
        }

        info!("Renderer initialized at {}x{}", width, height);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.process_key_event(&event);
                if self.input.is_pressed(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.process_modifiers(modifiers.state());
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height);
                    self.engine
                        .camera_mut()
                        .set_aspect_ratio(renderer.aspect_ratio());
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.render_frame() {
                    error!("Fatal render error: {}", err);
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
