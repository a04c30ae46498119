//! Scene graph
//!
//! A [`Scene`] owns the component storages of its entities and keeps the node
//! hierarchy in parent-before-child order. Every frame [`Scene::update`] recomputes
//! local matrices, propagates world matrices down the hierarchy and rebuilds the
//! cameras; [`Scene::render`] then submits meshes to the render system.
//!
//! Models and HDR environments are ingested from [`crate::assets`] values.

mod boundaries;
mod model_loader;
mod scene_graph;
mod systems;

#[cfg(test)]
mod tests;

pub use boundaries::SceneBoundaries;
pub use scene_graph::Scene;
