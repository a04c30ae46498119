//! GLFW window with an OpenGL core context

use glfw::Context;

use super::{PlatformError, WindowEvent, WindowSystem};
use crate::core::config::WindowConfig;

const GL_VERSION: (u32, u32) = (4, 5);

/// GLFW window wrapper
///
/// The window is dropped on [`WindowSystem::destroy`]; afterwards it reports that it
/// should close and ignores every other call.
pub struct GlfwWindowSystem {
    glfw: glfw::Glfw,
    window: Option<glfw::PWindow>,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

fn to_pixels(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl GlfwWindowSystem {
    fn apply_vsync(&mut self, enabled: bool) {
        let interval = if enabled { glfw::SwapInterval::Sync(1) } else { glfw::SwapInterval::None };
        self.glfw.set_swap_interval(interval);
    }
}

impl WindowSystem for GlfwWindowSystem {
    fn create(config: &WindowConfig) -> Result<Self, PlatformError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|error| PlatformError::InitializationFailed(format!("{error:?}")))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(GL_VERSION.0, GL_VERSION.1));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| {
                PlatformError::CreationFailed(format!(
                    "no OpenGL {}.{} window of {}x{}",
                    GL_VERSION.0, GL_VERSION.1, config.width, config.height
                ))
            })?;

        window.make_current();
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_drag_and_drop_polling(true);

        let mut system = Self {
            glfw,
            window: Some(window),
            events,
        };
        system.apply_vsync(config.vsync);
        log::info!("Opened window '{}' {}x{}", config.title, config.width, config.height);
        Ok(system)
    }

    fn configure(&mut self, config: &WindowConfig) {
        if let Some(window) = self.window.as_mut() {
            window.set_title(&config.title);
            window.set_size(
                i32::try_from(config.width).unwrap_or(i32::MAX),
                i32::try_from(config.height).unwrap_or(i32::MAX),
            );
        }
        self.apply_vsync(config.vsync);
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.swap_buffers();
        }
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| match event {
                glfw::WindowEvent::FramebufferSize(width, height) => Some(WindowEvent::Resized {
                    width: to_pixels(width),
                    height: to_pixels(height),
                }),
                glfw::WindowEvent::Close => Some(WindowEvent::CloseRequested),
                glfw::WindowEvent::FileDrop(paths) => Some(WindowEvent::FilesDropped(paths)),
                _ => None,
            })
            .collect()
    }

    fn should_close(&self) -> bool {
        self.window.as_ref().map_or(true, |window| window.should_close())
    }

    fn update(&mut self, _dt: f32) {}

    fn destroy(&mut self) {
        if self.window.take().is_some() {
            log::info!("Closed window");
        }
    }

    fn size(&self) -> (u32, u32) {
        self.window.as_ref().map_or((0, 0), |window| {
            let (width, height) = window.get_framebuffer_size();
            (to_pixels(width), to_pixels(height))
        })
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.apply_vsync(enabled);
    }
}

impl Drop for GlfwWindowSystem {
    fn drop(&mut self) {
        self.destroy();
    }
}
