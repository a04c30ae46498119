//! ECS Components module
//!
//! The component kinds a scene stores: transforms, hierarchy nodes, meshes,
//! cameras and image based lighting environments.

pub mod transform;
pub mod node;
pub mod mesh;
pub mod camera;
pub mod environment;

pub use transform::TransformComponent;
pub use node::NodeComponent;
pub use mesh::{MeshComponent, Primitive};
pub use camera::{CameraComponent, CameraKind};
pub use environment::EnvironmentComponent;
