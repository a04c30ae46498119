//! Entity implementation

/// Maximum number of entities a scene may allocate over its lifetime
pub const MAX_ENTITIES: u32 = 1000;

/// Entity identifier
///
/// An entity is only a key into the component storages of a scene. Identifier 0 is
/// reserved as [`Entity::INVALID`]; scenes hand out identifiers in increasing order and
/// never reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// The reserved invalid entity
    pub const INVALID: Self = Self { id: 0 };

    /// Create an entity with the given ID
    pub const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Whether this is not the reserved invalid entity
    pub const fn is_valid(&self) -> bool {
        self.id != 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}
