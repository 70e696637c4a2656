use std::collections::HashMap;

/// Cached mirror object, keyed by the server-assigned index.
pub trait CacheEntity {
    /// Notification payload this entity is built from.
    type Payload;

    /// Build a fresh entity for a previously unseen index.
    fn create(index: u32, payload: &Self::Payload) -> Self;

    /// Fold a newer payload into an existing entity, in place.
    fn apply(&mut self, payload: &Self::Payload);

    /// Server-assigned index, immutable once assigned.
    fn index(&self) -> u32;

    /// Stable identifier, distinct from the index.
    fn name(&self) -> &str;
}

/// Index-addressed arena for one entity kind.
///
/// The cache exclusively owns its entities; everything else refers to them
/// by index and resolves through the cache on use. Updates mutate in place,
/// so an index handed out earlier keeps designating the same object for as
/// long as the entity lives.
#[derive(Debug)]
pub struct EntityCache<E> {
    entries: HashMap<u32, E>,
}

impl<E: CacheEntity> EntityCache<E> {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert or update the entity at `index` from `payload`.
    ///
    /// Returns the entity and whether it was newly created.
    pub fn upsert(&mut self, index: u32, payload: &E::Payload) -> (&mut E, bool) {
        let mut created = false;
        let entry = self.entries.entry(index).or_insert_with(|| {
            created = true;
            E::create(index, payload)
        });
        if !created {
            entry.apply(payload);
        }
        (entry, created)
    }

    /// Remove and return the entity at `index`; `None` when absent.
    /// Double removal is benign.
    pub fn remove(&mut self, index: u32) -> Option<E> {
        self.entries.remove(&index)
    }

    /// Entity at `index`, if present.
    pub fn get(&self, index: u32) -> Option<&E> {
        self.entries.get(&index)
    }

    /// Mutable access to the entity at `index`.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut E> {
        self.entries.get_mut(&index)
    }

    /// First entity whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&E> {
        self.entries.values().find(|entity| entity.name() == name)
    }

    /// Iterate over the cached entities in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    /// Iterate mutably over the cached entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.values_mut()
    }

    /// Point-in-time copy of all entities.
    pub fn snapshot(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.entries.values().cloned().collect()
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<E: CacheEntity> Default for EntityCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        index: u32,
        name: String,
        generation: u32,
    }

    impl CacheEntity for Probe {
        type Payload = String;

        fn create(index: u32, payload: &String) -> Self {
            Self {
                index,
                name: payload.clone(),
                generation: 0,
            }
        }

        fn apply(&mut self, payload: &String) {
            self.name = payload.clone();
            self.generation += 1;
        }

        fn index(&self) -> u32 {
            self.index
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn upsert_creates_then_updates_in_place() {
        let mut cache = EntityCache::<Probe>::new();

        let (_, created) = cache.upsert(3, &"alpha".to_owned());
        assert!(created);

        let (entity, created) = cache.upsert(3, &"beta".to_owned());
        assert!(!created);
        assert_eq!(entity.name(), "beta");
        assert_eq!(entity.generation, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_unknown_index_is_a_noop() {
        let mut cache = EntityCache::<Probe>::new();
        assert!(cache.remove(9).is_none());

        cache.upsert(9, &"gamma".to_owned());
        assert!(cache.remove(9).is_some());
        assert!(cache.remove(9).is_none());
    }

    #[test]
    fn find_by_name_matches_exactly() {
        let mut cache = EntityCache::<Probe>::new();
        cache.upsert(1, &"speakers".to_owned());
        cache.upsert(2, &"headset".to_owned());

        assert_eq!(cache.find_by_name("headset").map(|e| e.index()), Some(2));
        assert!(cache.find_by_name("head").is_none());
    }
}
