//! Deferred physically based pipeline
//!
//! Geometry pass: every mesh draw writes albedo, normal, emissive and
//! occlusion/roughness/metallic into the G-buffer. Lighting pass: one full-screen
//! triangle reads the G-buffer plus the environment texture and writes to the
//! default framebuffer.
//!
//! Binding layout shared with the shaders:
//!
//! | uniform block | binding | | texture unit (geometry) | slot |
//! |---------------|---------|-|-------------------------|------|
//! | scene         | 0       | | base color              | 0    |
//! | model         | 1       | | roughness/metallic      | 1    |
//! | material      | 2       | | occlusion               | 2    |
//! | lighting      | 3       | | normal                  | 3    |
//! |               |         | | emissive                | 4    |
//!
//! The lighting pass samples the G-buffer attachments on units 0 to 4 and the
//! environment on unit 5.

use std::sync::Arc;

use super::pipeline::RenderPipeline;
use super::uniforms::{LightingBlock, MaterialBlock, ModelBlock, SceneBlock, UniformRing, UniformSlice};
use super::{Material, RenderError};
use crate::core::config::{RenderConfig, RenderPipelineKind, ShaderConfig, ShaderSource};
use crate::foundation::math::{Mat4, Vec3};
use crate::graphics::types::{
    BlendFactor, ClearFlags, CompareOperation, Format, FramebufferAttachment, IndexType, PolygonFace,
    PolygonMode, PrimitiveTopology, ShaderStage,
};
use crate::graphics::{
    CommandBuffer, Framebuffer, FramebufferConfiguration, GraphicsContext, Shader, ShaderConfiguration,
    ShaderProgram, Texture, Viewport,
};

/// Uniform block binding of the camera data
pub const SCENE_BLOCK_BINDING: u32 = 0;
/// Uniform block binding of the model data
pub const MODEL_BLOCK_BINDING: u32 = 1;
/// Uniform block binding of the material data
pub const MATERIAL_BLOCK_BINDING: u32 = 2;
/// Uniform block binding of the lighting data
pub const LIGHTING_BLOCK_BINDING: u32 = 3;
/// Texture unit of the environment in the lighting pass
pub const ENVIRONMENT_TEXTURE_UNIT: u32 = 5;

const GBUFFER_COLOR_FORMATS: [Format; 4] = [Format::Rgba8, Format::Rgba16F, Format::Rgba16F, Format::Rgba8];
const GBUFFER_DEPTH_FORMAT: Format = Format::DepthComponent32F;

fn read_source(source: &ShaderSource) -> Result<String, RenderError> {
    match source {
        ShaderSource::File(path) => std::fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
            path: path.clone(),
            source,
        }),
        ShaderSource::Inline(text) => Ok(text.clone()),
    }
}

fn build_program(
    context: &mut GraphicsContext,
    vertex: &ShaderSource,
    fragment: &ShaderSource,
) -> Result<Arc<ShaderProgram>, RenderError> {
    let vertex_source = read_source(vertex)?;
    let fragment_source = read_source(fragment)?;
    log::debug!("Building program from {} and {}", vertex.describe(), fragment.describe());

    let vertex_shader = Shader::create(context, &ShaderConfiguration { stage: ShaderStage::Vertex, source: vertex_source });
    let fragment_shader = Shader::create(context, &ShaderConfiguration { stage: ShaderStage::Fragment, source: fragment_source });
    let program = ShaderProgram::graphics_pipeline(context, &vertex_shader, None, &fragment_shader);

    // Stages are not needed once linked
    vertex_shader.release();
    fragment_shader.release();
    Ok(Arc::new(program))
}

fn gbuffer_configuration(width: u32, height: u32) -> FramebufferConfiguration {
    FramebufferConfiguration {
        width,
        height,
        color_attachments: GBUFFER_COLOR_FORMATS.to_vec(),
        depth_attachment: Some(GBUFFER_DEPTH_FORMAT),
    }
}

fn normal_matrix(model: &Mat4) -> Mat4 {
    model.try_inverse().map_or_else(Mat4::identity, |inverse| inverse.transpose())
}

/// Deferred PBR pipeline state
pub struct DeferredPbrPipeline {
    shaders: ShaderConfig,
    geometry_program: Arc<ShaderProgram>,
    lighting_program: Arc<ShaderProgram>,
    gbuffer: Arc<Framebuffer>,
    ring: UniformRing,
    viewport: Viewport,
    clear_color: [f32; 4],
    view_projection: Mat4,
    camera_position: Vec3,
    scene_dirty: bool,
    environment: Option<Arc<Texture>>,
    environment_mip_level: f32,
    elapsed: f32,
}

impl DeferredPbrPipeline {
    /// Build programs, the G-buffer and the uniform ring
    #[allow(clippy::cast_precision_loss)]
    pub fn create(context: &mut GraphicsContext, config: &RenderConfig) -> Result<Self, RenderError> {
        config.validate().map_err(RenderError::InvalidConfig)?;

        let geometry_program = build_program(context, &config.shaders.geometry_vertex, &config.shaders.geometry_fragment)?;
        let lighting_program = build_program(context, &config.shaders.lighting_vertex, &config.shaders.lighting_fragment)?;
        let gbuffer = Arc::new(Framebuffer::create(context, gbuffer_configuration(1, 1)));
        let ring = UniformRing::create(context, config.uniform_buffer_size);

        log::info!("Created deferred PBR pipeline ({} byte uniform ring)", config.uniform_buffer_size);

        Ok(Self {
            shaders: config.shaders.clone(),
            geometry_program,
            lighting_program,
            gbuffer,
            ring,
            viewport: Viewport { x: 0, y: 0, width: 1, height: 1 },
            clear_color: config.clear_color,
            view_projection: Mat4::identity(),
            camera_position: Vec3::zeros(),
            scene_dirty: true,
            environment: None,
            environment_mip_level: config.environment_mip_level as f32,
            elapsed: 0.0,
        })
    }

    /// The G-buffer
    pub fn gbuffer(&self) -> &Arc<Framebuffer> {
        &self.gbuffer
    }

    /// Currently bound environment
    pub fn environment(&self) -> Option<&Arc<Texture>> {
        self.environment.as_ref()
    }

    fn bind_block(&self, commands: &mut CommandBuffer, binding: u32, slice: UniformSlice) {
        commands.bind_uniform_buffer(binding, Arc::clone(self.ring.buffer()), slice.offset, slice.size);
    }

    fn flush_scene_block(&mut self, commands: &mut CommandBuffer) {
        if !self.scene_dirty {
            return;
        }
        let slice = self.ring.push(&SceneBlock {
            view_projection: self.view_projection.into(),
            camera_position: self.camera_position.push(1.0).into(),
        });
        self.bind_block(commands, SCENE_BLOCK_BINDING, slice);
        self.scene_dirty = false;
    }
}

impl RenderPipeline for DeferredPbrPipeline {
    fn kind(&self) -> RenderPipelineKind {
        RenderPipelineKind::DeferredPbr
    }

    #[allow(clippy::cast_precision_loss)]
    fn configure(&mut self, context: &mut GraphicsContext, config: &RenderConfig) -> Result<(), RenderError> {
        config.validate().map_err(RenderError::InvalidConfig)?;

        if config.shaders != self.shaders {
            self.geometry_program = build_program(context, &config.shaders.geometry_vertex, &config.shaders.geometry_fragment)?;
            self.lighting_program = build_program(context, &config.shaders.lighting_vertex, &config.shaders.lighting_fragment)?;
            self.shaders = config.shaders.clone();
            log::info!("Rebuilt deferred PBR programs");
        }
        if config.uniform_buffer_size != self.ring.capacity() {
            self.ring = UniformRing::create(context, config.uniform_buffer_size);
        }
        self.clear_color = config.clear_color;
        self.environment_mip_level = config.environment_mip_level as f32;
        Ok(())
    }

    fn begin_render(&mut self, commands: &mut CommandBuffer) {
        let Viewport { x, y, width, height } = self.viewport;

        commands.bind_framebuffer(Some(Arc::clone(&self.gbuffer)));
        commands.set_viewport(x, y, width, height);
        commands.set_depth_test(true);
        commands.set_depth_func(CompareOperation::Less);
        commands.set_face_culling(true);
        commands.set_cull_face(PolygonFace::Back);
        commands.set_blending(false);
        commands.set_polygon_mode(PolygonFace::FrontAndBack, PolygonMode::Fill);
        commands.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0; 4], 1.0);
        commands.bind_shader_program(Some(Arc::clone(&self.geometry_program)));

        self.scene_dirty = true;
    }

    fn set_viewport(&mut self, context: &mut GraphicsContext, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport { x, y, width, height };
        if width == 0 || height == 0 || (width, height) == (self.gbuffer.width(), self.gbuffer.height()) {
            return;
        }

        match Arc::get_mut(&mut self.gbuffer) {
            Some(gbuffer) => gbuffer.resize(context, width, height),
            None => self.gbuffer = Arc::new(Framebuffer::create(context, gbuffer_configuration(width, height))),
        }
        log::debug!("G-buffer resized to {width}x{height}");
    }

    fn set_view_projection_matrix(&mut self, view_projection: &Mat4) {
        self.view_projection = *view_projection;
        self.scene_dirty = true;
    }

    fn set_camera_position(&mut self, position: &Vec3) {
        self.camera_position = *position;
        self.scene_dirty = true;
    }

    fn set_model_matrix(&mut self, commands: &mut CommandBuffer, model: &Mat4) {
        self.flush_scene_block(commands);
        let slice = self.ring.push(&ModelBlock {
            model: (*model).into(),
            normal_matrix: normal_matrix(model).into(),
        });
        self.bind_block(commands, MODEL_BLOCK_BINDING, slice);
    }

    fn draw_mesh(
        &mut self,
        commands: &mut CommandBuffer,
        material: &Arc<Material>,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    ) {
        self.flush_scene_block(commands);

        let slots = material.texture_slots();
        let texture_mask = slots
            .iter()
            .enumerate()
            .filter(|(_, texture)| texture.is_some())
            .fold(0_u32, |mask, (unit, _)| mask | (1 << unit));

        let slice = self.ring.push(&MaterialBlock {
            base_color: material.base_color.into(),
            emissive_color: material.emissive_color.push(0.0).into(),
            metallic: material.metallic,
            roughness: material.roughness,
            packed_occlusion: u32::from(material.packed_occlusion),
            texture_mask,
        });
        self.bind_block(commands, MATERIAL_BLOCK_BINDING, slice);

        for (unit, texture) in (0_u32..).zip(slots) {
            commands.bind_texture(unit, texture.cloned());
        }

        commands.draw_elements(topology, first, count, index_type, instance_count.max(1));
    }

    fn set_environment_texture(&mut self, hdr_texture: Arc<Texture>, mip_level: f32) {
        log::debug!("Environment texture set ({}x{}, mip level {mip_level})", hdr_texture.width(), hdr_texture.height());
        self.environment = Some(hdr_texture);
        self.environment_mip_level = mip_level;
    }

    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    fn finish_render(&mut self, context: &mut GraphicsContext, commands: &mut CommandBuffer) {
        let Viewport { x, y, width, height } = self.viewport;

        commands.bind_framebuffer(None);
        commands.set_viewport(x, y, width, height);
        commands.set_depth_test(false);
        commands.set_face_culling(false);
        commands.set_blending(false);
        commands.set_blend_factors(BlendFactor::One, BlendFactor::Zero);
        commands.clear(ClearFlags::COLOR | ClearFlags::DEPTH, self.clear_color, 1.0);
        commands.bind_shader_program(Some(Arc::clone(&self.lighting_program)));

        let attachments = (0..GBUFFER_COLOR_FORMATS.len())
            .map(|index| FramebufferAttachment::Color(index as u8))
            .chain(std::iter::once(FramebufferAttachment::Depth));
        for (unit, attachment) in (0_u32..).zip(attachments) {
            commands.bind_texture(unit, self.gbuffer.attachment(attachment).cloned());
        }
        commands.bind_texture(ENVIRONMENT_TEXTURE_UNIT, self.environment.clone());

        let inverse_view_projection = self.view_projection.try_inverse().unwrap_or_else(Mat4::identity);
        let slice = self.ring.push(&LightingBlock {
            inverse_view_projection: inverse_view_projection.into(),
            camera_position: self.camera_position.push(1.0).into(),
            environment_mip_level: self.environment_mip_level,
            has_environment: u32::from(self.environment.is_some()),
            time: self.elapsed,
            padding: 0,
        });
        self.bind_block(commands, LIGHTING_BLOCK_BINDING, slice);

        commands.draw_arrays(PrimitiveTopology::Triangles, 0, 3, 1);

        self.ring.upload(context);
    }

    fn destroy(&mut self) {
        for program in [&self.geometry_program, &self.lighting_program] {
            if program.is_created() {
                program.release();
            }
        }
        if self.gbuffer.is_created() {
            self.gbuffer.release();
        }
        if self.ring.buffer().is_created() {
            self.ring.buffer().release();
        }
        self.environment = None;
        log::info!("Destroyed deferred PBR pipeline");
    }
}
