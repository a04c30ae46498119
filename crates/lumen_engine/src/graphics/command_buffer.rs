//! # Render Command Buffer
//!
//! Records abstract draw and state operations in submission order and replays them
//! against a device later. During [`CommandBuffer::execute`] each state or bind
//! command is first checked against the [`GraphicsState`] cache and only reaches the
//! device when it changes something. Draws, clears and single uniforms always go
//! through.
//!
//! Commands hold shared references to the resources they use, so a resource stays
//! alive until the buffer that mentions it is cleared.

use std::sync::Arc;

use super::buffer::Buffer;
use super::device::GraphicsDevice;
use super::framebuffer::Framebuffer;
use super::shader::ShaderProgram;
use super::state::GraphicsState;
use super::texture::Texture;
use super::types::{
    BlendFactor, ClearFlags, CompareOperation, IndexType, PolygonFace, PolygonMode,
    PrimitiveTopology, UniformValue,
};
use super::vertex_array::VertexArray;

/// One recorded operation
#[derive(Debug, Clone)]
pub enum Command {
    /// Set the viewport rectangle
    SetViewport {
        /// Left edge
        x: u32,
        /// Bottom edge
        y: u32,
        /// Width
        width: u32,
        /// Height
        height: u32,
    },
    /// Enable or disable depth testing
    SetDepthTest(bool),
    /// Set the depth comparison
    SetDepthFunc(CompareOperation),
    /// Set the polygon rasterization mode
    SetPolygonMode(PolygonFace, PolygonMode),
    /// Enable or disable face culling
    SetFaceCulling(bool),
    /// Select the culled face
    SetCullFace(PolygonFace),
    /// Enable or disable blending
    SetBlending(bool),
    /// Set source and destination blend factors
    SetBlendFactors(BlendFactor, BlendFactor),
    /// Bind a vertex array, `None` unbinds
    BindVertexArray(Option<Arc<VertexArray>>),
    /// Bind a shader program, `None` unbinds
    BindShaderProgram(Option<Arc<ShaderProgram>>),
    /// Bind a range of a buffer to a uniform block binding
    BindUniformBuffer {
        /// Uniform block binding
        index: u32,
        /// Source buffer
        buffer: Arc<Buffer>,
        /// Start of the range in bytes
        offset: usize,
        /// Length of the range in bytes
        size: usize,
    },
    /// Bind a texture to a texture unit, `None` unbinds
    BindTexture {
        /// Texture unit
        binding: u32,
        /// Texture to sample
        texture: Option<Arc<Texture>>,
    },
    /// Bind a framebuffer, `None` selects the default framebuffer
    BindFramebuffer(Option<Arc<Framebuffer>>),
    /// Set a non-buffered uniform
    BindSingleUniform {
        /// Uniform location
        location: u32,
        /// Value
        value: UniformValue,
    },
    /// Clear the bound framebuffer
    Clear {
        /// Aspects to clear
        flags: ClearFlags,
        /// Clear color
        color: [f32; 4],
        /// Clear depth
        depth: f32,
    },
    /// Indexed draw from the bound vertex array
    DrawElements {
        /// Assembly mode
        topology: PrimitiveTopology,
        /// First index element
        first: u32,
        /// Number of indices
        count: u32,
        /// Index element type
        index_type: IndexType,
        /// Number of instances
        instance_count: u32,
    },
    /// Non-indexed draw
    DrawArrays {
        /// Assembly mode
        topology: PrimitiveTopology,
        /// First vertex
        first: u32,
        /// Number of vertices
        count: u32,
        /// Number of instances
        instance_count: u32,
    },
}

impl Command {
    /// Whether this command is a draw
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawElements { .. } | Self::DrawArrays { .. })
    }
}

/// Outcome of one [`CommandBuffer::execute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionStats {
    /// Commands that reached the device
    pub issued: usize,
    /// State commands dropped because the cache already matched
    pub skipped: usize,
    /// Draw commands among the issued ones
    pub draws: usize,
}

/// Ordered list of recorded commands
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty command buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw command
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Record a viewport change
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.push(Command::SetViewport { x, y, width, height });
    }

    /// Record a depth test toggle
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.push(Command::SetDepthTest(enabled));
    }

    /// Record a depth comparison change
    pub fn set_depth_func(&mut self, operation: CompareOperation) {
        self.push(Command::SetDepthFunc(operation));
    }

    /// Record a polygon mode change
    pub fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode) {
        self.push(Command::SetPolygonMode(face, mode));
    }

    /// Record a face culling toggle
    pub fn set_face_culling(&mut self, enabled: bool) {
        self.push(Command::SetFaceCulling(enabled));
    }

    /// Record a culled face change
    pub fn set_cull_face(&mut self, face: PolygonFace) {
        self.push(Command::SetCullFace(face));
    }

    /// Record a blending toggle
    pub fn set_blending(&mut self, enabled: bool) {
        self.push(Command::SetBlending(enabled));
    }

    /// Record a blend factor change
    pub fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.push(Command::SetBlendFactors(source, destination));
    }

    /// Record a vertex array bind
    pub fn bind_vertex_array(&mut self, vertex_array: Option<Arc<VertexArray>>) {
        self.push(Command::BindVertexArray(vertex_array));
    }

    /// Record a shader program bind
    pub fn bind_shader_program(&mut self, program: Option<Arc<ShaderProgram>>) {
        self.push(Command::BindShaderProgram(program));
    }

    /// Record a uniform buffer range bind
    pub fn bind_uniform_buffer(&mut self, index: u32, buffer: Arc<Buffer>, offset: usize, size: usize) {
        self.push(Command::BindUniformBuffer { index, buffer, offset, size });
    }

    /// Record a texture bind
    pub fn bind_texture(&mut self, binding: u32, texture: Option<Arc<Texture>>) {
        self.push(Command::BindTexture { binding, texture });
    }

    /// Record a framebuffer bind
    pub fn bind_framebuffer(&mut self, framebuffer: Option<Arc<Framebuffer>>) {
        self.push(Command::BindFramebuffer(framebuffer));
    }

    /// Record a single uniform update
    pub fn bind_single_uniform(&mut self, location: u32, value: UniformValue) {
        self.push(Command::BindSingleUniform { location, value });
    }

    /// Record a clear
    pub fn clear(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32) {
        self.push(Command::Clear { flags, color, depth });
    }

    /// Record an indexed draw
    pub fn draw_elements(&mut self, topology: PrimitiveTopology, first: u32, count: u32, index_type: IndexType, instance_count: u32) {
        self.push(Command::DrawElements { topology, first, count, index_type, instance_count });
    }

    /// Record a non-indexed draw
    pub fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32, instance_count: u32) {
        self.push(Command::DrawArrays { topology, first, count, instance_count });
    }

    /// Recorded commands in submission order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every recorded command and the resource references they hold
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Replay every command in order against `device`
    ///
    /// State commands that match `state` are skipped. The recorded commands are kept;
    /// call [`clear_commands`](Self::clear_commands) to start the next frame.
    pub fn execute(&self, device: &mut dyn GraphicsDevice, state: &mut GraphicsState) -> ExecutionStats {
        let mut stats = ExecutionStats::default();

        for command in &self.commands {
            let issue = match command {
                Command::SetViewport { x, y, width, height } => state.set_viewport(*x, *y, *width, *height),
                Command::SetDepthTest(enabled) => state.set_depth_test(*enabled),
                Command::SetDepthFunc(operation) => state.set_depth_func(*operation),
                Command::SetPolygonMode(face, mode) => state.set_polygon_mode(*face, *mode),
                Command::SetFaceCulling(enabled) => state.set_face_culling(*enabled),
                Command::SetCullFace(face) => state.set_cull_face(*face),
                Command::SetBlending(enabled) => state.set_blending(*enabled),
                Command::SetBlendFactors(source, destination) => state.set_blend_factors(*source, *destination),
                Command::BindVertexArray(vertex_array) => {
                    state.bind_vertex_array(vertex_array.as_ref().map(|v| v.handle()))
                }
                Command::BindShaderProgram(program) => {
                    state.bind_shader_program(program.as_ref().map(|p| p.handle()))
                }
                Command::BindUniformBuffer { index, buffer, offset, size } => {
                    state.bind_uniform_buffer(*index, buffer.handle(), *offset, *size)
                }
                Command::BindTexture { binding, texture } => {
                    state.bind_texture(*binding, texture.as_ref().map(|t| t.handle()))
                }
                Command::BindFramebuffer(framebuffer) => {
                    state.bind_framebuffer(framebuffer.as_ref().map(|f| f.handle()))
                }
                Command::BindSingleUniform { .. } => state.bind_single_uniform(),
                Command::Clear { .. } | Command::DrawElements { .. } | Command::DrawArrays { .. } => true,
            };

            if issue {
                Self::issue(command, device);
                stats.issued += 1;
                if command.is_draw() {
                    stats.draws += 1;
                }
            } else {
                stats.skipped += 1;
            }
        }

        log::trace!(
            "Executed {} commands: {} issued, {} skipped, {} draws",
            self.commands.len(),
            stats.issued,
            stats.skipped,
            stats.draws
        );
        stats
    }

    fn issue(command: &Command, device: &mut dyn GraphicsDevice) {
        match command {
            Command::SetViewport { x, y, width, height } => device.set_viewport(*x, *y, *width, *height),
            Command::SetDepthTest(enabled) => device.set_depth_test(*enabled),
            Command::SetDepthFunc(operation) => device.set_depth_func(*operation),
            Command::SetPolygonMode(face, mode) => device.set_polygon_mode(*face, *mode),
            Command::SetFaceCulling(enabled) => device.set_face_culling(*enabled),
            Command::SetCullFace(face) => device.set_cull_face(*face),
            Command::SetBlending(enabled) => device.set_blending(*enabled),
            Command::SetBlendFactors(source, destination) => device.set_blend_factors(*source, *destination),
            Command::BindVertexArray(vertex_array) => device.bind_vertex_array(vertex_array.as_ref().map(|v| v.handle())),
            Command::BindShaderProgram(program) => device.bind_shader_program(program.as_ref().map(|p| p.handle())),
            Command::BindUniformBuffer { index, buffer, offset, size } => {
                device.bind_uniform_buffer(*index, buffer.handle(), *offset, *size);
            }
            Command::BindTexture { binding, texture } => device.bind_texture(*binding, texture.as_ref().map(|t| t.handle())),
            Command::BindFramebuffer(framebuffer) => device.bind_framebuffer(framebuffer.as_ref().map(|f| f.handle())),
            Command::BindSingleUniform { location, value } => device.set_uniform(*location, *value),
            Command::Clear { flags, color, depth } => device.clear(*flags, *color, *depth),
            Command::DrawElements { topology, first, count, index_type, instance_count } => {
                device.draw_elements(*topology, *first, *count, *index_type, *instance_count);
            }
            Command::DrawArrays { topology, first, count, instance_count } => {
                device.draw_arrays(*topology, *first, *count, *instance_count);
            }
        }
    }
}
