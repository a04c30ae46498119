//! Render system orchestrator

use std::sync::Arc;

use super::deferred_pbr::DeferredPbrPipeline;
use super::pipeline::RenderPipeline;
use super::{Material, RenderError};
use crate::core::config::{RenderConfig, RenderPipelineKind};
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::types::{IndexType, PrimitiveTopology};
use crate::graphics::{
    CommandBuffer, ExecutionStats, GraphicsContext, GraphicsDevice, GraphicsState, Texture, VertexArray,
};

/// Owns everything needed to record and flush a frame
///
/// Every frame operation requires a configured pipeline; calling one before
/// [`configure`](Self::configure) is a contract violation and panics.
pub struct RenderSystem {
    context: GraphicsContext,
    command_buffer: CommandBuffer,
    state: GraphicsState,
    pipeline: Option<Box<dyn RenderPipeline>>,
    last_frame: ExecutionStats,
    frames: u64,
}

impl RenderSystem {
    /// Create a render system without a pipeline
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        Self {
            context: GraphicsContext::new(device),
            command_buffer: CommandBuffer::new(),
            state: GraphicsState::new(),
            pipeline: None,
            last_frame: ExecutionStats::default(),
            frames: 0,
        }
    }

    /// Create the configured pipeline, or reconfigure the current one
    ///
    /// A pipeline of a different kind replaces the current one.
    pub fn configure(&mut self, config: &RenderConfig) -> Result<(), RenderError> {
        let recreate = self.pipeline.as_ref().map_or(true, |p| p.kind() != config.pipeline);

        if recreate {
            if let Some(mut previous) = self.pipeline.take() {
                previous.destroy();
            }
            let pipeline: Box<dyn RenderPipeline> = match config.pipeline {
                RenderPipelineKind::DeferredPbr => Box::new(DeferredPbrPipeline::create(&mut self.context, config)?),
            };
            self.pipeline = Some(pipeline);
            return Ok(());
        }

        let (pipeline, context, _) = self.parts();
        pipeline.configure(context, config)
    }

    fn parts(&mut self) -> (&mut dyn RenderPipeline, &mut GraphicsContext, &mut CommandBuffer) {
        let Self { pipeline, context, command_buffer, .. } = self;
        let pipeline = pipeline
            .as_deref_mut()
            .unwrap_or_else(|| panic!("render pipeline used before configure"));
        (pipeline, context, command_buffer)
    }

    /// Kind of the active pipeline
    ///
    /// # Panics
    ///
    /// Panics if no pipeline is configured.
    pub fn base_render_pipeline(&self) -> RenderPipelineKind {
        self.pipeline
            .as_ref()
            .map(|p| p.kind())
            .unwrap_or_else(|| panic!("render pipeline used before configure"))
    }

    /// Whether a pipeline is configured
    pub fn is_configured(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Start recording a frame
    pub fn begin_render(&mut self) {
        let (pipeline, _, commands) = self.parts();
        pipeline.begin_render(commands);
    }

    /// Set the output rectangle
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let (pipeline, context, _) = self.parts();
        pipeline.set_viewport(context, x, y, width, height);
    }

    /// Set the camera matrix for subsequent draws
    pub fn set_view_projection_matrix(&mut self, view_projection: &Mat4) {
        self.parts().0.set_view_projection_matrix(view_projection);
    }

    /// Set the camera position for subsequent draws
    pub fn set_camera_position(&mut self, position: &Vec3) {
        self.parts().0.set_camera_position(position);
    }

    /// Bind the vertex array subsequent draws read from
    pub fn bind_vertex_array(&mut self, vertex_array: Arc<VertexArray>) {
        let (_, _, commands) = self.parts();
        commands.bind_vertex_array(Some(vertex_array));
    }

    /// Set the model matrix for subsequent draws
    pub fn set_model_matrix(&mut self, model: &Mat4) {
        let (pipeline, _, commands) = self.parts();
        pipeline.set_model_matrix(commands, model);
    }

    /// Record one indexed draw with its material bindings
    pub fn draw_mesh(
        &mut self,
        material: &Arc<Material>,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    ) {
        let (pipeline, _, commands) = self.parts();
        pipeline.draw_mesh(commands, material, topology, first, count, index_type, instance_count);
    }

    /// Use `hdr_texture` for image based lighting
    pub fn set_environment_texture(&mut self, hdr_texture: Arc<Texture>, mip_level: f32) {
        self.parts().0.set_environment_texture(hdr_texture, mip_level);
    }

    /// Advance time dependent pipeline state
    pub fn update(&mut self, dt: f32) {
        self.parts().0.update(dt);
    }

    /// Finish recording, flush the frame to the device and collect released objects
    pub fn finish_render(&mut self) -> ExecutionStats {
        let (pipeline, context, commands) = self.parts();
        pipeline.finish_render(context, commands);

        self.forget_deleted();
        self.last_frame = self.command_buffer.execute(self.context.device(), &mut self.state);
        self.command_buffer.clear_commands();
        self.collect_garbage();
        self.frames += 1;

        log::trace!("Frame {} flushed: {:?}", self.frames, self.last_frame);
        self.last_frame
    }

    /// Delete every released object and drop its name from the state cache
    ///
    /// Returns the number of deleted objects.
    pub fn collect_garbage(&mut self) -> usize {
        let deleted = self.context.collect_garbage();
        self.forget_deleted();
        deleted
    }

    // Names may also have been deleted through `context()` directly
    fn forget_deleted(&mut self) {
        for handle in self.context.take_deleted() {
            self.state.forget(handle);
        }
    }

    /// Destroy the pipeline and delete every object it released
    pub fn destroy(&mut self) {
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.destroy();
        }
        self.command_buffer.clear_commands();
        self.context.collect_garbage();
        self.context.take_deleted();
        self.state.invalidate();
    }

    /// Graphics context for creating resource objects
    pub fn context(&mut self) -> &mut GraphicsContext {
        &mut self.context
    }

    /// Device state as last issued by a flush
    pub fn graphics_state(&self) -> &GraphicsState {
        &self.state
    }

    /// Commands recorded since the last flush
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.command_buffer
    }

    /// Execution statistics of the last flushed frame
    pub fn last_frame_stats(&self) -> ExecutionStats {
        self.last_frame
    }

    /// Number of flushed frames
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Drop for RenderSystem {
    fn drop(&mut self) {
        self.destroy();
    }
}
