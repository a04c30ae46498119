//! Core engine implementation

use thiserror::Error;

use crate::application::Application;
use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::foundation::time::Timer;
use crate::graphics::GraphicsDevice;
use crate::platform::{Platform, PlatformError, WindowEvent, WindowSystem};
use crate::render::{RenderError, RenderSystem};
use crate::scene::Scene;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration was loaded but is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Render system failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Window system failure
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Asset failure
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// The application reported an error
    #[error("Application error: {0}")]
    Application(String),
}

/// Main engine struct
///
/// Owns the window, the scene and the render system and runs the frame loop.
/// The scene is declared before the render system so its resources are retired before
/// the render system collects garbage on drop.
pub struct Engine {
    config: EngineConfig,
    window: Platform,
    scene: Scene,
    render_system: RenderSystem,
    timer: Timer,
    running: bool,
}

impl Engine {
    /// Create the window and a configured render system on `device`
    pub fn new(config: EngineConfig, device: Box<dyn GraphicsDevice>) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate().map_err(EngineError::InvalidConfig)?;

        let window = Platform::create(&config.window)?;
        let mut render_system = RenderSystem::new(device);
        render_system.configure(&config.render)?;

        let (width, height) = window.size();
        render_system.set_viewport(0, 0, width, height);

        Ok(Self {
            scene: Scene::new(config.window.title.clone()),
            config,
            window,
            render_system,
            timer: Timer::new(),
            running: true,
        })
    }

    /// Run the frame loop with `app` until the window closes or [`quit`](Self::quit) is called
    pub fn run<A: Application>(
        config: EngineConfig,
        device: Box<dyn GraphicsDevice>,
        app: &mut A,
    ) -> Result<(), EngineError> {
        let mut engine = Self::new(config, device)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let result = loop {
            if !engine.running {
                break Ok(());
            }
            if let Err(error) = engine.step_frame(app) {
                break Err(error);
            }
        };

        app.cleanup(&mut engine);
        engine.shutdown();
        log::info!("Engine shutdown complete after {} frames", engine.timer.frame_count());
        result
    }

    /// Run one iteration of the frame loop
    ///
    /// Events are handled first; then the application, window, render system and scene
    /// update; then the scene is rendered and the frame presented.
    pub fn step_frame<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        for event in self.window.poll_events() {
            self.handle_event(&event);
            app.handle_event(self, &event)
                .map_err(|e| EngineError::Application(format!("App event: {e}")))?;
        }

        let delta_time = self.timer.tick();
        app.update(self, delta_time)
            .map_err(|e| EngineError::Application(format!("App update: {e}")))?;

        self.window.update(delta_time);
        self.render_system.update(delta_time);
        self.scene.update(delta_time);

        self.render_system.begin_render();
        self.scene.render(&mut self.render_system);
        let stats = self.render_system.finish_render();
        self.window.swap_buffers();

        log::trace!("Frame {}: {stats:?}", self.timer.frame_count());

        if self.window.should_close() {
            self.running = false;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized { width, height } => self.handle_resize(*width, *height),
            WindowEvent::CloseRequested => self.quit(),
            WindowEvent::FilesDropped(paths) => log::debug!("{} files dropped", paths.len()),
        }
    }

    /// Follow a change of the drawable size
    ///
    /// Updates the aspect of the active camera and the render viewport. A zero sized
    /// drawable (minimized window) is ignored.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }

        if let Some(entity) = self.scene.active_camera() {
            if let Some(camera) = self.scene.cameras_mut().get_component_for_entity_mut(entity) {
                #[allow(clippy::cast_precision_loss)]
                let aspect = width as f32 / height as f32;
                camera.aspect = aspect;
            }
        }
        self.render_system.set_viewport(0, 0, width, height);
        log::debug!("Resized to {width}x{height}");
    }

    /// Request engine shutdown after the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the frame loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Release the scene, the render system and the window
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.scene = Scene::new(self.config.window.title.clone());
        self.render_system.destroy();
        self.window.destroy();
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The render system
    pub fn render_system(&self) -> &RenderSystem {
        &self.render_system
    }

    /// Mutable access to the render system
    pub fn render_system_mut(&mut self) -> &mut RenderSystem {
        &mut self.render_system
    }

    /// Scene and render system at once, as model ingestion needs both
    pub fn scene_and_render_system(&mut self) -> (&mut Scene, &mut RenderSystem) {
        (&mut self.scene, &mut self.render_system)
    }

    /// The window system
    pub fn window(&self) -> &Platform {
        &self.window
    }

    /// Mutable access to the window system
    pub fn window_mut(&mut self) -> &mut Platform {
        &mut self.window
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}
