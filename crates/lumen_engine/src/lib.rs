//! # Lumen Engine
//!
//! A real-time 3D engine core: an entity-component scene graph feeding a deferred
//! rendering pipeline through a command buffer that skips redundant state changes.
//!
//! ## Features
//!
//! - **Scene Graph**: Densely packed component storages with topologically ordered hierarchy
//! - **Command Buffer**: Recorded frames replayed against a cached graphics state
//! - **Resource Objects**: Shared buffers, textures, shaders and framebuffers with deferred deletion
//! - **Model Ingestion**: glTF-shaped documents turned into entities, meshes and materials
//! - **Headless Backend**: Every device call recorded, no GPU required
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lumen_engine::prelude::*;
//!
//! struct Viewer;
//!
//! impl Application for Viewer {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let (scene, render_system) = engine.scene_and_render_system();
//!         scene.create_entities_from_model(&cube_document(0.0), render_system);
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     Engine::run(config, Box::new(HeadlessDevice::new()), &mut Viewer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Scene and rendering
pub mod ecs;
pub mod graphics;
pub mod render;
pub mod assets;
pub mod scene;

// Frame loop
pub mod platform;
mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineError,
        assets::{procedural::cube_document, ImageData, ModelDocument},
        core::config::{EngineConfig, RenderConfig, ShaderConfig, WindowConfig},
        config::Config,
        ecs::{CameraComponent, Entity, MeshComponent, TransformComponent},
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::Timer,
        },
        graphics::{GraphicsDevice, HeadlessDevice},
        platform::{Platform, WindowEvent, WindowSystem},
        render::{Material, RenderSystem},
        scene::Scene,
    };
}
