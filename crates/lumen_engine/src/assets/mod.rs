//! Asset data handed to the scene by external loaders
//!
//! Nothing here parses model files or decodes compressed images beyond what the
//! `image` crate does; the scene consumes [`ModelDocument`] and [`ImageData`] values
//! that are already resolved.

pub mod image_data;
pub mod model;
pub mod procedural;

pub use image_data::ImageData;
pub use model::{
    AccessorDesc, BufferViewDesc, ElementType, ImageSource, MaterialDesc, MeshDesc, ModelDocument, NodeDesc,
    NodeTransform, PrimitiveDesc, SamplerDesc, SceneDesc, TextureDesc,
};

use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Decoded image data with a layout the engine cannot upload
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Model document that does not parse or has dangling references
    #[error("Invalid model document: {0}")]
    InvalidDocument(String),

    /// Asset file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
