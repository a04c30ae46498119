//! Shaders and shader programs

use super::context::GraphicsContext;
use super::device::GpuHandle;
use super::object::GpuObject;
use super::types::{ObjectKind, ShaderStage};

/// Creation options of a [`Shader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderConfiguration {
    /// Pipeline stage
    pub stage: ShaderStage,
    /// Source text
    pub source: String,
}

/// One compiled shader stage
#[derive(Debug)]
pub struct Shader {
    object: GpuObject,
    stage: ShaderStage,
}

impl Shader {
    /// Compile a shader stage
    ///
    /// # Panics
    ///
    /// Panics if the source is empty.
    pub fn create(context: &mut GraphicsContext, configuration: &ShaderConfiguration) -> Self {
        assert!(!configuration.source.trim().is_empty(), "empty {:?} shader source", configuration.stage);
        let handle = context.device().create_shader(configuration.stage, &configuration.source);
        Self {
            object: GpuObject::new(context, ObjectKind::Shader, handle),
            stage: configuration.stage,
        }
    }

    /// Stage of this shader
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Whether the shader has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the backend object
    pub fn release(&self) {
        self.object.release();
    }
}

/// Linked shader program
#[derive(Debug)]
pub struct ShaderProgram {
    object: GpuObject,
    compute: bool,
}

impl ShaderProgram {
    /// Link a vertex, optional geometry and fragment stage
    ///
    /// # Panics
    ///
    /// Panics if a shader does not belong to the slot it is passed in.
    pub fn graphics_pipeline(
        context: &mut GraphicsContext,
        vertex: &Shader,
        geometry: Option<&Shader>,
        fragment: &Shader,
    ) -> Self {
        assert_eq!(vertex.stage(), ShaderStage::Vertex, "vertex slot needs a vertex shader");
        assert_eq!(fragment.stage(), ShaderStage::Fragment, "fragment slot needs a fragment shader");

        let mut stages = vec![vertex.handle()];
        if let Some(geometry) = geometry {
            assert_eq!(geometry.stage(), ShaderStage::Geometry, "geometry slot needs a geometry shader");
            stages.push(geometry.handle());
        }
        stages.push(fragment.handle());

        let handle = context.device().create_shader_program(&stages);
        Self {
            object: GpuObject::new(context, ObjectKind::ShaderProgram, handle),
            compute: false,
        }
    }

    /// Link a compute program
    ///
    /// # Panics
    ///
    /// Panics if `compute` is not a compute shader.
    pub fn compute_pipeline(context: &mut GraphicsContext, compute: &Shader) -> Self {
        assert_eq!(compute.stage(), ShaderStage::Compute, "compute pipeline needs a compute shader");
        let handle = context.device().create_shader_program(&[compute.handle()]);
        Self {
            object: GpuObject::new(context, ObjectKind::ShaderProgram, handle),
            compute: true,
        }
    }

    /// Whether this is a compute program
    pub fn is_compute(&self) -> bool {
        self.compute
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Whether the program has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the backend object
    pub fn release(&self) {
        self.object.release();
    }
}
