use crate::{entity::EntityRef, value::EntityId};
use std::collections::HashMap;

///
/// IdentityMap
///
/// Per-type ordered list of every mapped instance plus a keyed index.
/// Unkeyed entities are listed but never addressable.
///

#[derive(Debug, Default)]
pub struct IdentityMap {
    types: HashMap<String, TypeEntries>,
}

#[derive(Debug, Default)]
struct TypeEntries {
    order: Vec<EntityRef>,
    by_id: HashMap<EntityId, EntityRef>,
}

impl IdentityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped instance for an identity.
    #[must_use]
    pub fn get(&self, entity: &str, id: &EntityId) -> Option<&EntityRef> {
        self.types.get(entity)?.by_id.get(id)
    }

    /// Map an instance under its own type and key.
    /// A keyed instance must not replace an existing mapping.
    pub fn insert(&mut self, instance: EntityRef) {
        let entries = self
            .types
            .entry(instance.entity_name().to_string())
            .or_default();

        if let Some(key) = instance.key() {
            debug_assert!(
                !entries.by_id.contains_key(key),
                "identity {}#{key} mapped twice",
                instance.entity_name()
            );
            entries.by_id.insert(key.clone(), instance.clone());
        }
        entries.order.push(instance);
    }

    /// Every mapped instance of a type, in insertion order.
    #[must_use]
    pub fn all(&self, entity: &str) -> &[EntityRef] {
        self.types
            .get(entity)
            .map_or(&[], |entries| entries.order.as_slice())
    }

    /// Total number of mapped instances across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.values().map(|entries| entries.order.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.values().all(|entries| entries.order.is_empty())
    }
}
