//! # Rendering
//!
//! The render system orchestrates one frame: it owns the graphics context, the
//! command buffer, the state cache and the active [`RenderPipeline`], and turns scene
//! draw submissions into recorded commands that are flushed once per frame.
//!
//! ## Modules
//!
//! - [`material`]: PBR material factors and texture slots
//! - [`uniforms`]: uniform block layouts and the per-frame uniform ring
//! - [`pipeline`]: the pipeline trait
//! - [`deferred_pbr`]: the deferred PBR pipeline
//! - [`render_system`]: the orchestrator

pub mod material;
pub mod uniforms;
pub mod pipeline;
pub mod deferred_pbr;
pub mod render_system;

pub use material::Material;
pub use pipeline::RenderPipeline;
pub use deferred_pbr::DeferredPbrPipeline;
pub use render_system::RenderSystem;
pub use uniforms::{primitives_per_frame, UniformRing, UniformSlice};

/// Rendering system errors
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A shader source file could not be read
    #[error("Failed to read shader source {path}: {source}")]
    ShaderSource {
        /// Path of the shader file
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The render configuration failed validation
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
