//! Render pipeline abstraction
//!
//! A pipeline turns the render system's per-frame calls into commands. The render
//! system owns the command buffer and the graphics context and lends them to the
//! active pipeline for each call.

use std::sync::Arc;

use super::{Material, RenderError};
use crate::core::config::{RenderConfig, RenderPipelineKind};
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::types::{IndexType, PrimitiveTopology};
use crate::graphics::{CommandBuffer, GraphicsContext, Texture};

/// Frame recording interface implemented by every pipeline
pub trait RenderPipeline {
    /// Which pipeline this is
    fn kind(&self) -> RenderPipelineKind;

    /// Apply a new configuration of the same pipeline kind
    fn configure(&mut self, context: &mut GraphicsContext, config: &RenderConfig) -> Result<(), RenderError>;

    /// Record the start of a frame
    fn begin_render(&mut self, commands: &mut CommandBuffer);

    /// Change the output rectangle, resizing internal targets as needed
    fn set_viewport(&mut self, context: &mut GraphicsContext, x: u32, y: u32, width: u32, height: u32);

    /// Camera matrix used by subsequent draws
    fn set_view_projection_matrix(&mut self, view_projection: &Mat4);

    /// Camera position used by subsequent draws
    fn set_camera_position(&mut self, position: &Vec3);

    /// Model matrix used by subsequent draws
    fn set_model_matrix(&mut self, commands: &mut CommandBuffer, model: &Mat4);

    /// Record one indexed draw with `material`
    fn draw_mesh(
        &mut self,
        commands: &mut CommandBuffer,
        material: &Arc<Material>,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    );

    /// Environment used for image based lighting
    fn set_environment_texture(&mut self, hdr_texture: Arc<Texture>, mip_level: f32);

    /// Advance time dependent state
    fn update(&mut self, dt: f32);

    /// Record the end of the frame and upload its uniform data
    fn finish_render(&mut self, context: &mut GraphicsContext, commands: &mut CommandBuffer);

    /// Release every resource the pipeline owns
    fn destroy(&mut self);
}
