//! Entity-Component-System implementation
//!
//! Entities are plain identifiers. Every component kind lives in its own dense
//! [`ComponentStorage`], owned by the scene.

pub mod entity;
pub mod component;
pub mod storage;
pub mod components;

pub use entity::{Entity, MAX_ENTITIES};
pub use component::Component;
pub use storage::{ComponentStorage, Traversal};
pub use components::{
    CameraComponent, CameraKind, EnvironmentComponent, MeshComponent, NodeComponent, Primitive,
    TransformComponent,
};
