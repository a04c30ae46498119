//! Hierarchy component

use crate::ecs::{Component, Entity};

/// Parent link of an entity
///
/// Only child entities carry one; roots have no node component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeComponent {
    /// The entity this one is attached to
    pub parent_entity: Entity,
}

impl Component for NodeComponent {}
