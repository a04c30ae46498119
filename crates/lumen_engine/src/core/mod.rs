//! # Core Engine Module
//!
//! Shared configuration types used by the engine, the render system and the
//! platform layer.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for every engine subsystem

pub mod config;

pub use config::{
    EngineConfig,
    WindowConfig,
    RenderConfig,
    RenderPipelineKind,
    ShaderConfig,
    ShaderSource,
    Config,
    ConfigError,
};
