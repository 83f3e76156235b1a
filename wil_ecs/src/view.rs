//! Cached queries over entity signatures.
//!
//! A view is a filter signature plus the set of entities whose signature
//! contains every bit of the filter. The registry keeps every view in a slab
//! and re-evaluates membership for one entity each time that entity's
//! signature changes, so readers never rescan the whole entity table.

use std::collections::HashSet;

use log::debug;
use slotmap::{new_key_type, SlotMap};

use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::signature::Signature;

new_key_type! {
    /// Opaque handle to a view owned by the registry.
    ///
    /// Handles carry the version of their slot, so a handle kept after
    /// [`unregister`](ViewRegistry::unregister) never aliases a newer view
    /// that reuses the slot.
    pub struct ViewHandle;
}

/// The cached result of one query.
#[derive(Debug, Clone)]
pub struct EntityView {
    filter: Signature,
    entities: HashSet<Entity>,
}

impl EntityView {
    fn new(filter: Signature) -> Self {
        Self {
            filter,
            entities: HashSet::new(),
        }
    }

    /// The AND-filter of this view.
    pub fn filter(&self) -> Signature {
        self.filter
    }

    /// Iterates over the matching entities in unspecified order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn evaluate(&mut self, entity: Entity, signature: Signature) {
        if signature.contains_all(self.filter) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(&entity);
        }
    }
}

/// Slab of registered views.
#[derive(Default)]
pub struct ViewRegistry {
    views: SlotMap<ViewHandle, EntityView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view and seeds it from `entities`.
    ///
    /// This is the only full scan a view ever performs.
    pub fn register(
        &mut self,
        filter: Signature,
        entities: impl IntoIterator<Item = (Entity, Signature)>,
    ) -> ViewHandle {
        let mut view = EntityView::new(filter);
        for (entity, signature) in entities {
            view.evaluate(entity, signature);
        }
        debug!(
            "registered view with filter {} matching {} entities",
            filter,
            view.len()
        );
        self.views.insert(view)
    }

    /// Drops the view and invalidates its handle.
    pub fn unregister(&mut self, handle: ViewHandle) -> Result<EntityView> {
        let view = self
            .views
            .remove(handle)
            .ok_or(EcsError::ViewNotFound(handle))?;
        debug!("unregistered view with filter {}", view.filter);
        Ok(view)
    }

    /// Looks up a live view.
    pub fn get(&self, handle: ViewHandle) -> Result<&EntityView> {
        self.views.get(handle).ok_or(EcsError::ViewNotFound(handle))
    }

    /// Re-evaluates every view for one entity against its current signature.
    pub fn signature_changed(&mut self, entity: Entity, signature: Signature) {
        for view in self.views.values_mut() {
            view.evaluate(entity, signature);
        }
    }

    /// Removes a destroyed entity from every view.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for view in self.views.values_mut() {
            view.entities.remove(&entity);
        }
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
