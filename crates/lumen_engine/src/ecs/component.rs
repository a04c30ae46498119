//! Component trait

/// Marker trait for components
///
/// Anything stored in a [`ComponentStorage`](super::ComponentStorage) implements this.
pub trait Component: 'static + Send + Sync {}
