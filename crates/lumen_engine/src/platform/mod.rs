//! Window system boundary
//!
//! Exactly one window system is live per process, so the implementation is chosen at
//! compile time: [`Platform`] is the headless window system by default and the GLFW
//! window with the `glfw` cargo feature. The engine only talks to it through
//! [`WindowSystem`].

pub mod headless;
#[cfg(feature = "glfw")]
pub mod glfw_window;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::WindowConfig;

pub use headless::HeadlessWindowSystem;
#[cfg(feature = "glfw")]
pub use glfw_window::GlfwWindowSystem;

/// The window system compiled into this build
#[cfg(not(feature = "glfw"))]
pub type Platform = HeadlessWindowSystem;

/// The window system compiled into this build
#[cfg(feature = "glfw")]
pub type Platform = GlfwWindowSystem;

/// Platform errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The windowing library could not start
    #[error("Platform initialization failed: {0}")]
    InitializationFailed(String),

    /// The window could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),
}

/// Events delivered by [`WindowSystem::poll_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// The drawable area changed size
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The user asked to close the window
    CloseRequested,
    /// Files were dropped onto the window
    FilesDropped(Vec<PathBuf>),
}

/// What the frame loop needs from a window system
pub trait WindowSystem: Sized {
    /// Open a window described by `config`
    fn create(config: &WindowConfig) -> Result<Self, PlatformError>;

    /// Apply title, size and vsync of `config` to the open window
    fn configure(&mut self, config: &WindowConfig);

    /// Present the frame
    fn swap_buffers(&mut self);

    /// Collect pending events
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Whether the window should close
    fn should_close(&self) -> bool;

    /// Per-frame housekeeping
    fn update(&mut self, dt: f32);

    /// Close the window; later calls are no-ops
    fn destroy(&mut self);

    /// Drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Enable or disable waiting for vertical sync on swap
    fn set_vsync(&mut self, enabled: bool);
}
