use log::trace;

use crate::error::{EcsError, Result};
use crate::signature::Signature;

/// Entity is an opaque identifier for a logical object in the store.
///
/// Entities carry no data themselves; components live in the registry's
/// dense arrays. Ids are recycled after destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Entity(pub u32);

impl Entity {
    /// Creates a new Entity with the given value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    pub fn id(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Issues and recycles entity ids and owns each entity's signature.
///
/// A slot is `Some(signature)` while its entity is alive and `None` once it
/// has been destroyed. Destroyed ids go onto a LIFO free list and are handed
/// out again before any new slot is appended. The allocator knows nothing
/// about component data; the registry keeps arrays and views in step.
pub struct EntityAllocator {
    signatures: Vec<Option<Signature>>,
    free: Vec<Entity>,
    alive: usize,
}

impl EntityAllocator {
    /// Creates an allocator with room for `reserve` signatures.
    pub fn new(reserve: usize) -> Self {
        Self {
            signatures: Vec::with_capacity(reserve),
            free: Vec::new(),
            alive: 0,
        }
    }

    /// Returns a recycled id if one is free, otherwise a brand new one.
    ///
    /// The returned entity always starts with an all-clear signature.
    pub fn create(&mut self) -> Entity {
        self.alive += 1;

        if let Some(entity) = self.free.pop() {
            self.signatures[entity.index()] = Some(Signature::new());
            trace!("recycled {}", entity);
            return entity;
        }

        let entity = Entity::new(self.signatures.len() as u32);
        self.signatures.push(Some(Signature::new()));
        trace!("created {}", entity);
        entity
    }

    /// Clears the entity's signature and returns its id to the free list.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        let slot = self
            .signatures
            .get_mut(entity.index())
            .filter(|slot| slot.is_some())
            .ok_or(EcsError::EntityOutOfRange(entity))?;

        *slot = None;
        self.free.push(entity);
        self.alive -= 1;
        trace!("destroyed {}", entity);
        Ok(())
    }

    /// Returns the current signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.signatures
            .get(entity.index())
            .copied()
            .flatten()
            .ok_or(EcsError::EntityOutOfRange(entity))
    }

    /// Overwrites the signature of a live entity.
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> Result<()> {
        match self.signatures.get_mut(entity.index()) {
            Some(Some(slot)) => {
                *slot = signature;
                Ok(())
            }
            _ => Err(EcsError::EntityOutOfRange(entity)),
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        matches!(self.signatures.get(entity.index()), Some(Some(_)))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.alive
    }

    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Number of id slots ever handed out, live or free.
    pub fn capacity(&self) -> usize {
        self.signatures.len()
    }

    /// Iterates over live entities and their signatures in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.signatures
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|sig| (Entity::new(index as u32), sig)))
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(0)
    }
}
