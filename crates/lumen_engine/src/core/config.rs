//! # Unified Configuration System
//!
//! All configuration structures for the engine live here. Each structure has
//! sensible defaults, a builder-style API, a `validate()` check and serde support so
//! it can be stored as TOML or RON through [`Config`].
//!
//! ## Configuration Categories
//!
//! - **Window Config**: Title, size, vsync and the headless frame limit
//! - **Render Config**: Pipeline selection, shader sources, uniform ring size
//! - **Engine Config**: Logging plus the two configurations above

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

const GEOMETRY_VERTEX_SHADER: &str = "#version 460 core
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;
layout(location = 3) in vec4 a_tangent;
layout(std140, binding = 0) uniform SceneBlock { mat4 view_projection; vec4 camera_position; };
layout(std140, binding = 1) uniform ModelBlock { mat4 model; mat4 normal_matrix; };
out vec3 v_position;
out vec3 v_normal;
out vec2 v_uv;
out vec4 v_tangent;
void main() {
    vec4 world = model * vec4(a_position, 1.0);
    v_position = world.xyz;
    v_normal = mat3(normal_matrix) * a_normal;
    v_uv = a_uv;
    v_tangent = vec4(mat3(model) * a_tangent.xyz, a_tangent.w);
    gl_Position = view_projection * world;
}
";

const GEOMETRY_FRAGMENT_SHADER: &str = "#version 460 core
in vec3 v_position;
in vec3 v_normal;
in vec2 v_uv;
in vec4 v_tangent;
layout(location = 0) out vec4 g_albedo;
layout(location = 1) out vec4 g_normal;
layout(location = 2) out vec4 g_emissive;
layout(location = 3) out vec4 g_orm;
void main() {
    g_albedo = vec4(1.0);
    g_normal = vec4(normalize(v_normal) * 0.5 + 0.5, 1.0);
    g_emissive = vec4(0.0);
    g_orm = vec4(1.0, 1.0, 0.0, 1.0);
}
";

const LIGHTING_VERTEX_SHADER: &str = "#version 460 core
out vec2 v_uv;
void main() {
    vec2 position = vec2((gl_VertexID << 1) & 2, gl_VertexID & 2);
    v_uv = position;
    gl_Position = vec4(position * 2.0 - 1.0, 0.0, 1.0);
}
";

const LIGHTING_FRAGMENT_SHADER: &str = "#version 460 core
in vec2 v_uv;
layout(binding = 0) uniform sampler2D g_albedo;
out vec4 frag_color;
void main() {
    frag_color = texture(g_albedo, v_uv);
}
";

/// Where a shader stage gets its source text from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShaderSource {
    /// Read from a file when the pipeline is created
    File(String),
    /// Source text embedded in the configuration
    Inline(String),
}

impl ShaderSource {
    /// Short human readable label for log lines
    pub fn describe(&self) -> &str {
        match self {
            Self::File(path) => path,
            Self::Inline(_) => "<inline>",
        }
    }
}

/// # Shader Configuration
///
/// Shader sources of the two deferred passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Geometry pass vertex stage
    pub geometry_vertex: ShaderSource,
    /// Geometry pass fragment stage
    pub geometry_fragment: ShaderSource,
    /// Lighting pass vertex stage
    pub lighting_vertex: ShaderSource,
    /// Lighting pass fragment stage
    pub lighting_fragment: ShaderSource,
}

impl ShaderConfig {
    /// Load every stage from files in `dir` using the conventional file names
    pub fn from_directory(dir: &str) -> Self {
        let path = |name: &str| ShaderSource::File(format!("{}/{}", dir.trim_end_matches('/'), name));
        Self {
            geometry_vertex: path("geometry.vert"),
            geometry_fragment: path("geometry.frag"),
            lighting_vertex: path("lighting.vert"),
            lighting_fragment: path("lighting.frag"),
        }
    }

    /// Validate that no stage is empty
    pub fn validate(&self) -> Result<(), String> {
        for (stage, source) in [
            ("geometry vertex", &self.geometry_vertex),
            ("geometry fragment", &self.geometry_fragment),
            ("lighting vertex", &self.lighting_vertex),
            ("lighting fragment", &self.lighting_fragment),
        ] {
            let empty = match source {
                ShaderSource::File(path) => path.trim().is_empty(),
                ShaderSource::Inline(text) => text.trim().is_empty(),
            };
            if empty {
                return Err(format!("The {stage} shader source is empty"));
            }
        }
        Ok(())
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            geometry_vertex: ShaderSource::Inline(GEOMETRY_VERTEX_SHADER.to_string()),
            geometry_fragment: ShaderSource::Inline(GEOMETRY_FRAGMENT_SHADER.to_string()),
            lighting_vertex: ShaderSource::Inline(LIGHTING_VERTEX_SHADER.to_string()),
            lighting_fragment: ShaderSource::Inline(LIGHTING_FRAGMENT_SHADER.to_string()),
        }
    }
}

/// Render pipelines the render system knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderPipelineKind {
    /// Deferred physically based shading
    #[default]
    DeferredPbr,
}

/// # Render Configuration
///
/// Pipeline selection and per-frame resource sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pipeline to build at configure time
    pub pipeline: RenderPipelineKind,
    /// Shader sources for the pipeline
    pub shaders: ShaderConfig,
    /// Size in bytes of the per-frame uniform ring
    ///
    /// Each uniform block takes a 256-byte slot and every drawn primitive needs two of
    /// them, so the default 1 MiB draws up to 2047 primitives per frame. The ring does
    /// not grow: a frame drawing more panics.
    pub uniform_buffer_size: usize,
    /// Clear color of the final framebuffer
    pub clear_color: [f32; 4],
    /// Mip level sampled from environment maps
    pub environment_mip_level: u32,
}

impl RenderConfig {
    /// Create a new render configuration
    pub fn new() -> Self {
        Self {
            pipeline: RenderPipelineKind::DeferredPbr,
            shaders: ShaderConfig::default(),
            uniform_buffer_size: 1 << 20,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            environment_mip_level: 0,
        }
    }

    /// Set custom shader configuration
    pub fn with_shaders(mut self, shaders: ShaderConfig) -> Self {
        self.shaders = shaders;
        self
    }

    /// Set the uniform ring size in bytes
    pub fn with_uniform_buffer_size(mut self, size: usize) -> Self {
        self.uniform_buffer_size = size;
        self
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.uniform_buffer_size < 4096 {
            return Err("Uniform buffer size must be at least 4096 bytes".to_string());
        }
        if self.clear_color.iter().any(|c| !c.is_finite()) {
            return Err("Clear color must be finite".to_string());
        }
        self.shaders.validate()
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
    /// Synchronize buffer swaps with the display
    pub vsync: bool,
    /// Number of frames a headless window runs before requesting close
    pub headless_frame_limit: Option<u64>,
}

impl WindowConfig {
    /// Create a new window configuration
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 1280,
            height: 720,
            vsync: true,
            headless_frame_limit: None,
        }
    }

    /// Set the window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable vsync
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.vsync = enabled;
        self
    }

    /// Limit the number of frames a headless window runs
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.headless_frame_limit = Some(frames);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("Window size {}x{} is invalid", self.width, self.height));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Lumen")
    }
}

/// # Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default log filter (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Window configuration
    pub window: WindowConfig,
    /// Rendering system configuration
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set window configuration
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Set render configuration
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        self.window.validate()?;
        self.render.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}
impl Config for RenderConfig {}
impl Config for WindowConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        let dir = std::env::temp_dir();
        dir.join(format!("lumen_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = EngineConfig::new().with_window(WindowConfig::new("x").with_size(0, 10));
        assert!(config.validate().is_err());

        let render = RenderConfig::new().with_uniform_buffer_size(16);
        assert!(render.validate().is_err());

        let mut shaders = ShaderConfig::default();
        shaders.lighting_fragment = ShaderSource::Inline("   ".to_string());
        assert!(shaders.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("engine.toml");
        let config = EngineConfig::new()
            .with_log_level("debug")
            .with_window(WindowConfig::new("Viewer").with_size(640, 480).with_frame_limit(3))
            .with_render(RenderConfig::new().with_shaders(ShaderConfig::from_directory("shaders/")));

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("engine.ron");
        let config = EngineConfig::default();

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = EngineConfig::default().save_to_file("engine.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_directory_shader_paths() {
        let shaders = ShaderConfig::from_directory("assets/shaders/");
        assert_eq!(shaders.geometry_vertex, ShaderSource::File("assets/shaders/geometry.vert".to_string()));
        assert_eq!(shaders.lighting_fragment.describe(), "assets/shaders/lighting.frag");
    }
}
