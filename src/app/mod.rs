//! Window and event loop.
//!
//! [`App`] owns the window, the renderer, the asset loader and the stage, and
//! drives them from winit's `ApplicationHandler` callbacks. The renderer is
//! created lazily in `resumed`, once a window exists.

pub mod input;

use self::input::Input;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::assets::AssetLoader;
use crate::config::ViewerConfig;
use crate::errors::Result;
use crate::render::Renderer;
use crate::stage::{PlaybackToggle, StageContext};
use crate::utils::FrameClock;

pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    stage: StageContext<PlaybackToggle>,
    loader: AssetLoader,
    input: Input,
    clock: FrameClock,
}

impl App {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        let playback = PlaybackToggle::new("music", config.start_playing);
        let mut input = Input::new();
        input.handle_resize(config.window.width, config.window.height);

        Self {
            window: None,
            renderer: None,
            stage: StageContext::new(config, playback),
            loader: AssetLoader::new(),
            input,
            clock: FrameClock::default(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn update(&mut self) {
        for event in self.loader.poll() {
            self.stage.apply_load_event(event, &self.loader);
        }

        let dt = self.clock.tick();
        self.stage.update(dt, &self.input);
        self.input.end_frame();
    }

    fn render(&mut self) -> Result<()> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.render(self.stage.scene()),
            None => Ok(()),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.stage.config().window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                f64::from(window_config.width),
                f64::from(window_config.height),
            ));

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();

        log::info!("Initializing renderer...");
        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            size.width,
            size.height,
        ))?;

        self.input.handle_resize(size.width, size.height);
        self.stage.resize(size.width, size.height);
        self.renderer = Some(renderer);
        self.window = Some(window);

        self.stage.request_initial_assets(&self.loader);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("Fatal renderer error: {e}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
                self.input.handle_resize(size.width, size.height);
                self.stage.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render failed: {e}");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.handle_key(code, event.state, event.repeat);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_input(state, button);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.handle_mouse_wheel(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Runs the viewer until the window closes.
pub fn run(config: ViewerConfig) -> Result<()> {
    App::new(config).run()
}
