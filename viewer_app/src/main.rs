//! Model viewer
//!
//! Loads an engine configuration (TOML or RON, path as first argument, defaults when
//! absent), instantiates a model and spins it until the window closes. A model stored
//! as RON can be passed as second argument or dropped onto the window; without one a
//! procedural cube is shown under a small HDR environment.

use std::path::{Path, PathBuf};

use lumen_engine::prelude::*;
use lumen_engine::config::ConfigError;
use lumen_engine::foundation::logging;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "viewer.toml";
const SPIN_SPEED: f32 = 0.5;

#[derive(Error, Debug)]
enum ViewerError {
    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

struct ModelViewer {
    model_path: Option<PathBuf>,
    model: Vec<Entity>,
    angle: f32,
}

impl ModelViewer {
    fn load(&mut self, engine: &mut Engine, document: &ModelDocument) {
        let (scene, render_system) = engine.scene_and_render_system();
        for entity in self.model.drain(..).rev() {
            scene.remove_entity(entity);
        }
        self.model = scene.create_entities_from_model(document, render_system);
        log::info!("Showing model with {} entities", self.model.len());
    }

    fn load_file(&mut self, engine: &mut Engine, path: &Path) -> Result<(), AppError> {
        let document = ModelDocument::from_ron_file(path)?;
        self.load(engine, &document);
        Ok(())
    }
}

/// Sky gradient, bright at the top row
fn sky_environment() -> ImageData {
    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 4;
    let texels: Vec<f32> = (0..HEIGHT)
        .flat_map(|row| {
            #[allow(clippy::cast_precision_loss)]
            let brightness = 4.0 * (HEIGHT - row) as f32 / HEIGHT as f32;
            (0..WIDTH).flat_map(move |_| [0.6 * brightness, 0.7 * brightness, brightness, 1.0])
        })
        .collect();
    ImageData::from_rgba32f(WIDTH, HEIGHT, &texels)
}

impl Application for ModelViewer {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let mip_level = engine.config().render.environment_mip_level;
        #[allow(clippy::cast_precision_loss)]
        let mip_level = mip_level as f32;
        let (scene, render_system) = engine.scene_and_render_system();
        scene.create_environment_from_hdr(&sky_environment(), mip_level, render_system);

        match self.model_path.clone() {
            Some(path) => self.load_file(engine, &path),
            None => {
                self.load(engine, &cube_document(0.0));
                Ok(())
            }
        }
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        self.angle = (self.angle + SPIN_SPEED * delta_time) % std::f32::consts::TAU;
        let Some(&root) = self.model.first() else {
            return Ok(());
        };
        if let Some(transform) = engine.scene_mut().transformations_mut().get_component_for_entity_mut(root) {
            transform.set_rotation_angle_axis(self.angle, Vec3::y());
        }
        Ok(())
    }

    fn handle_event(&mut self, engine: &mut Engine, event: &WindowEvent) -> Result<(), AppError> {
        if let WindowEvent::FilesDropped(paths) = event {
            for path in paths.iter().filter(|p| p.extension().is_some_and(|ext| ext == "ron")) {
                // A broken drop keeps the current model on screen
                if let Err(error) = self.load_file(engine, path) {
                    log::error!("Cannot show {}: {error}", path.display());
                }
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!(
            "Viewer closing after {} frames ({:.1} fps)",
            engine.render_system().frame_count(),
            engine.timer().average_fps()
        );
    }
}

fn run() -> Result<(), ViewerError> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let mut config = EngineConfig::load_or_default(&config_path)?;
    logging::init_with_level(&config.log_level);

    if cfg!(not(feature = "glfw")) && config.window.headless_frame_limit.is_none() {
        // Without a display nothing else would end the loop
        config.window.headless_frame_limit = Some(120);
    }

    let mut viewer = ModelViewer {
        model_path: args.next().map(PathBuf::from),
        model: Vec::new(),
        angle: 0.0,
    };
    Engine::run(config, Box::new(HeadlessDevice::new()), &mut viewer)?;
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        log::error!("{error}");
        eprintln!("viewer: {error}");
        std::process::exit(1);
    }
}
