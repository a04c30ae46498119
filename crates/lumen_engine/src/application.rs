//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::platform::WindowEvent;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the engine.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to populate the scene.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the scene is updated and rendered.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle a window event
    ///
    /// Called after the engine has handled the event itself.
    fn handle_event(&mut self, engine: &mut Engine, event: &WindowEvent) -> Result<(), AppError> {
        let _ = (engine, event);
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the frame loop ends, before the engine shuts down.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<crate::assets::AssetError> for AppError {
    fn from(error: crate::assets::AssetError) -> Self {
        Self::Asset(error.to_string())
    }
}
