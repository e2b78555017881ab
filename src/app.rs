use anyhow::Result;
use log::{debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use stepjudge_core::{Input, Screen};
use stepjudge_experiment::{InputOutcome, TrialController, TrialRecorder};
use stepjudge_link::MotorLink;
use stepjudge_timing::HighPrecisionTimer;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::keymap;
use crate::renderer::{load_font, ScreenRenderer};

pub type Controller =
    TrialController<Box<dyn MotorLink>, HighPrecisionTimer, Box<dyn TrialRecorder>>;

#[derive(Debug, Clone, Default)]
pub struct WindowOptions {
    pub windowed: bool,
    pub font: Option<std::path::PathBuf>,
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<ScreenRenderer>,
    controller: Controller,
    options: WindowOptions,
    drawn_screen: Option<Screen>,
}

impl App {
    pub fn new(controller: Controller, options: WindowOptions) -> Self {
        Self {
            window: None,
            pixels: None,
            renderer: None,
            controller,
            options,
            drawn_screen: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!("Platform: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
        info!("Keys: q/w rotate, a/s step, y/x swing, b stop, f/j left/right, 1-7 confidence, Esc quit");

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes().with_title("Stepper Control");

        if self.options.windowed {
            attributes = attributes.with_inner_size(PhysicalSize::new(1600, 1200));
        } else {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!("Window size: {}×{}", size.width, size.height);

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);
        self.renderer = Some(ScreenRenderer::new(
            size.width,
            size.height,
            load_font(self.options.font.as_deref()),
        ));

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let screen = self.controller.screen();
        renderer.render(
            screen,
            self.controller.is_hardware_connected(),
            pixels.frame_mut(),
        );
        pixels.render()?;
        self.drawn_screen = Some(screen);
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.logical_key == Key::Named(NamedKey::Escape) {
            self.exit(event_loop);
            return;
        }

        let Some(input) = (match &event.logical_key {
            Key::Character(text) => keymap::input_for_text(text.as_str()),
            _ => None,
        }) else {
            return;
        };

        self.apply(input);
    }

    fn apply(&mut self, input: Input) {
        match self.controller.handle_input(input) {
            InputOutcome::Ignored => debug!("{input:?} ignored on {:?}", self.controller.screen()),
            InputOutcome::RatingRejected(value) => warn!("Rating {value} is outside 1-7"),
            outcome => debug!("{input:?} -> {outcome:?}"),
        }

        if self.drawn_screen != Some(self.controller.screen()) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                error!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                error!("Failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(size.width, size.height);
        }
        self.drawn_screen = None;
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        info!(
            "Session finished after {} trials",
            self.controller.completed_trials()
        );
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("Failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!("Render error: {e}");
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_key(&event, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }
}
