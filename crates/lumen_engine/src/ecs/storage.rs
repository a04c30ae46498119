//! Dense component storage
//!
//! Components of one kind are kept in a contiguous vector with a parallel vector of
//! owning entities, plus an entity to index lookup. Iteration follows storage order,
//! which callers may rearrange with [`ComponentStorage::move_component`].
//!
//! Indices are only valid until the next structural change (insert, remove, move).
//! Never keep one across such a call.

use std::collections::HashMap;

use super::{Component, Entity};

/// What a [`ComponentStorage::for_each`] traversal does after a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Advance to the next index
    Continue,
    /// Visit the same index again, because the visitor moved a different entry into it
    Revisit,
    /// End the traversal
    Stop,
}

/// Dense storage of one component kind
pub struct ComponentStorage<T: Component> {
    components: Vec<T>,
    entities: Vec<Entity>,
    lookup: HashMap<Entity, usize>,
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entities: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Create a default component for `entity` and return it
    ///
    /// # Panics
    ///
    /// Panics if `entity` already has a component of this kind.
    pub fn create_component_for(&mut self, entity: Entity) -> &mut T
    where
        T: Default,
    {
        self.insert_component_for(entity, T::default())
    }

    /// Store `component` for `entity` and return it
    ///
    /// # Panics
    ///
    /// Panics if `entity` already has a component of this kind.
    pub fn insert_component_for(&mut self, entity: Entity, component: T) -> &mut T {
        assert!(
            !self.lookup.contains_key(&entity),
            "{entity} already has a {} component",
            std::any::type_name::<T>()
        );

        let index = self.components.len();
        self.components.push(component);
        self.entities.push(entity);
        self.lookup.insert(entity, index);
        &mut self.components[index]
    }

    /// Component of `entity`, if it has one
    pub fn get_component_for_entity(&self, entity: Entity) -> Option<&T> {
        self.lookup.get(&entity).map(|&index| &self.components[index])
    }

    /// Mutable component of `entity`, if it has one
    pub fn get_component_for_entity_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.lookup.get(&entity).map(|&index| &mut self.components[index])
    }

    /// Remove the component of `entity` by swapping the last entry into its slot
    ///
    /// Order of the remaining entries is not preserved. Returns the removed component.
    pub fn remove_component_from(&mut self, entity: Entity) -> Option<T> {
        let index = self.lookup.remove(&entity)?;
        let last = self.components.len() - 1;
        if index != last {
            let moved = self.entities[last];
            self.lookup.insert(moved, index);
        }
        self.entities.swap_remove(index);
        Some(self.components.swap_remove(index))
    }

    /// Remove the component of `entity`, keeping the order of the remaining entries
    ///
    /// Entries after the removed one shift down by one slot.
    pub fn sort_remove_component_from(&mut self, entity: Entity) -> Option<T> {
        let index = self.lookup.remove(&entity)?;
        self.entities.remove(index);
        let removed = self.components.remove(index);
        self.reindex(index, self.entities.len());
        Some(removed)
    }

    /// Whether `entity` has a component of this kind
    pub fn contains(&self, entity: Entity) -> bool {
        self.lookup.contains_key(&entity)
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Storage index of the component owned by `entity`
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.lookup.get(&entity).copied()
    }

    /// Entity owning the component at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn entity_at(&self, index: usize) -> Entity {
        self.entities[index]
    }

    /// Component at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn component_at(&self, index: usize) -> &T {
        &self.components[index]
    }

    /// Mutable component at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn component_at_mut(&mut self, index: usize) -> &mut T {
        &mut self.components[index]
    }

    /// Relocate the entry at `from` so that it ends up at index `to`
    ///
    /// Entries in between shift by one slot towards `from`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn move_component(&mut self, from: usize, to: usize) {
        let len = self.components.len();
        assert!(from < len && to < len, "move {from} -> {to} out of bounds for storage of {len}");
        if from == to {
            return;
        }

        let component = self.components.remove(from);
        let entity = self.entities.remove(from);
        self.components.insert(to, component);
        self.entities.insert(to, entity);

        self.reindex(from.min(to), from.max(to) + 1);
    }

    /// Visit every entry in storage order
    ///
    /// The visitor receives the storage and the index of the current entry and decides
    /// how the traversal proceeds. With `allow_structural_mutation` the visitor may call
    /// [`move_component`](Self::move_component) and steer the cursor with
    /// [`Traversal::Revisit`]; without it, any change to which entity sits at the visited
    /// index, or to the number of entries, is a contract violation.
    ///
    /// # Panics
    ///
    /// Panics if the visitor restructures the storage while `allow_structural_mutation`
    /// is false.
    pub fn for_each<F>(&mut self, mut visitor: F, allow_structural_mutation: bool)
    where
        F: FnMut(&mut Self, usize) -> Traversal,
    {
        let mut index = 0;
        while index < self.components.len() {
            let len = self.components.len();
            let entity = self.entities[index];

            let step = visitor(self, index);

            if !allow_structural_mutation {
                assert!(
                    self.components.len() == len && self.entities[index] == entity,
                    "storage of {} was restructured during a payload-only traversal",
                    std::any::type_name::<T>()
                );
            }

            match step {
                Traversal::Continue => index += 1,
                Traversal::Revisit => {}
                Traversal::Stop => break,
            }
        }
    }

    /// Iterate `(entity, component)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` pairs mutably in storage order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Entities in storage order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn reindex(&mut self, start: usize, end: usize) {
        for index in start..end {
            self.lookup.insert(self.entities[index], index);
        }
    }
}
