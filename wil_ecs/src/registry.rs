use crate::bundle::{ComponentBundle, ComponentSet};
use crate::components::Component;
use crate::config::RegistryConfig;
use crate::entity::{Entity, EntityAllocator};
use crate::error::{EcsError, Result};
use crate::signature::{ComponentType, Signature};
use crate::storage::{ComponentArray, ComponentManager};
use crate::system::{OrderedSystem, System, SystemExecutionOrder};
use crate::view::{EntityView, ViewHandle, ViewRegistry};
use log::{debug, trace};
use std::any::TypeId;
use std::collections::HashSet;

/// Registry is the single entry point of the store.
///
/// It owns the entity allocator, one dense array per component type, every
/// view and every system. Structural changes (creating and destroying
/// entities, adding and removing components) update the entity's signature
/// once and then re-evaluate each view for that entity only.
///
/// # Examples
///
/// ```
/// use wil_ecs::{Component, Registry};
///
/// #[derive(Component)]
/// struct Position([f32; 3]);
///
/// #[derive(Component)]
/// struct Velocity([f32; 3]);
///
/// let mut registry = Registry::new();
/// let moving = registry.register_view::<(Position, Velocity)>().unwrap();
///
/// let e = registry.create_entity();
/// registry
///     .add_components(e, (Position([0.0; 3]), Velocity([1.0, 0.0, 0.0])))
///     .unwrap();
/// assert!(registry.view(moving).unwrap().contains(e));
///
/// registry.remove_component::<Velocity>(e).unwrap();
/// assert!(registry.view(moving).unwrap().is_empty());
/// ```
pub struct Registry {
    entities: EntityAllocator,
    components: ComponentManager,
    views: ViewRegistry,
    systems: Vec<OrderedSystem>,
    config: RegistryConfig,
}

impl Registry {
    /// Creates a registry with the default configuration.
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Creates a registry from a validated configuration.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        Self {
            entities: EntityAllocator::new(config.reserve_entities),
            components: ComponentManager::new(config.max_components),
            views: ViewRegistry::new(),
            systems: Vec::new(),
            config,
        }
    }

    /// Returns the configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // Entities

    /// Creates a new entity with no components.
    ///
    /// Ids of destroyed entities are reused before new ones are issued.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        // An empty signature still satisfies views with an empty filter.
        self.views.signature_changed(entity, Signature::new());
        entity
    }

    /// Destroys an entity, dropping its components and removing it from
    /// every view.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.destroy(entity)?;
        self.components.entity_destroyed(entity);
        self.views.entity_destroyed(entity);
        Ok(())
    }

    /// Checks if an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns an iterator over all live entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().map(|(entity, _)| entity)
    }

    /// Returns the component signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.entities.signature(entity)
    }

    // Components

    /// Registers a component type, returning its bit in signatures.
    ///
    /// Adding components and registering views register types lazily, so
    /// calling this up front only fixes the order of bits.
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentType> {
        self.components.register::<T>()
    }

    /// Returns the bit of a registered component type.
    pub fn component_type<T: Component>(&self) -> Option<ComponentType> {
        self.components.component_type::<T>()
    }

    /// Returns the number of registered component types.
    pub fn component_count(&self) -> usize {
        self.components.component_count()
    }

    /// Adds a single component to an entity.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.add_components(entity, (component,))
    }

    /// Adds several components to an entity as one change.
    ///
    /// The entity's signature is written once and views are re-evaluated
    /// once for the combined result. If the entity already holds any of the
    /// types, nothing is inserted.
    ///
    /// ```
    /// # use wil_ecs::{Component, Registry};
    /// # #[derive(Component)] struct Transform([f32; 3]);
    /// # #[derive(Component)] struct PointLight([f32; 3]);
    /// let mut registry = Registry::new();
    /// let light = registry.create_entity();
    /// registry
    ///     .add_components(light, (Transform([0.0, 2.0, 0.0]), PointLight([1.0; 3])))
    ///     .unwrap();
    /// assert!(registry.has_components::<(Transform, PointLight)>(light));
    /// ```
    pub fn add_components<B: ComponentBundle>(&mut self, entity: Entity, bundle: B) -> Result<()> {
        let current = self.entities.signature(entity)?;

        // Types the entity could already hold are registered ones.
        if let Some(ty) = (current & B::Set::registered(&self.components)).iter().next() {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: self.components.component_name(ty).unwrap_or("<unknown>"),
            });
        }

        let added = B::Set::register(&mut self.components)?;
        bundle.insert(&mut self.components, entity)?;
        self.commit(entity, current | added)
    }

    /// Removes a single component from an entity and returns it.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T> {
        let mut signature = self.entities.signature(entity)?;
        let array = self.components.array_mut::<T>()?;
        let removed = array.remove(entity)?;
        signature.clear(array.component_type());
        self.commit(entity, signature)?;
        Ok(removed)
    }

    /// Removes several components from an entity as one change.
    ///
    /// Fails without removing anything unless the entity holds every type.
    pub fn remove_components<S: ComponentSet>(&mut self, entity: Entity) -> Result<()> {
        let current = self.entities.signature(entity)?;
        let removed = S::signature(&self.components)?;

        if let Some(ty) = removed.difference(current).iter().next() {
            return Err(EcsError::ComponentNotFound {
                entity,
                component: self.components.component_name(ty).unwrap_or("<unknown>"),
            });
        }

        S::remove(&mut self.components, entity)?;
        self.commit(entity, current.difference(removed))
    }

    /// Gets a reference to a component of a live entity.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.ensure_alive(entity)?;
        self.components
            .array::<T>()?
            .get(entity)
            .ok_or(EcsError::ComponentNotFound {
                entity,
                component: T::name(),
            })
    }

    /// Gets a mutable reference to a component of a live entity.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.ensure_alive(entity)?;
        self.components
            .array_mut::<T>()?
            .get_mut(entity)
            .ok_or(EcsError::ComponentNotFound {
                entity,
                component: T::name(),
            })
    }

    /// Gets shared references to several components of a live entity.
    ///
    /// ```
    /// # use wil_ecs::{Component, Registry};
    /// # #[derive(Component)] struct Transform([f32; 3]);
    /// # #[derive(Component)] struct Model(&'static str);
    /// let mut registry = Registry::new();
    /// let e = registry.create_entity();
    /// registry.add_components(e, (Transform([0.0; 3]), Model("cube.gltf"))).unwrap();
    ///
    /// let (transform, model) = registry.get_components::<(Transform, Model)>(e).unwrap();
    /// assert_eq!(model.0, "cube.gltf");
    /// assert_eq!(transform.0, [0.0; 3]);
    /// ```
    pub fn get_components<S: ComponentSet>(&self, entity: Entity) -> Result<S::Item<'_>> {
        self.ensure_alive(entity)?;
        S::fetch(&self.components, entity)
    }

    /// Tests a single signature bit. Unknown types and dead entities give
    /// false.
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        match (self.component_type::<T>(), self.entities.signature(entity)) {
            (Some(ty), Ok(signature)) => signature.contains(ty),
            _ => false,
        }
    }

    /// Tests signature bits only, without touching component arrays.
    pub fn has_components<S: ComponentSet>(&self, entity: Entity) -> bool {
        match (S::signature(&self.components), self.entities.signature(entity)) {
            (Ok(filter), Ok(signature)) => signature.contains_all(filter),
            _ => false,
        }
    }

    /// Read access to the dense array of one component type.
    pub fn storage<T: Component>(&self) -> Result<&ComponentArray<T>> {
        self.components.array::<T>()
    }

    // Views

    /// Registers a view over every entity holding all of `S`.
    ///
    /// The view is seeded with one scan of the live entities and kept up to
    /// date afterwards.
    pub fn register_view<S: ComponentSet>(&mut self) -> Result<ViewHandle> {
        let filter = S::register(&mut self.components)?;
        Ok(self.views.register(filter, self.entities.iter()))
    }

    /// Unregisters a view. Its handle is invalid afterwards.
    pub fn unregister_view(&mut self, handle: ViewHandle) -> Result<()> {
        self.views.unregister(handle).map(|_| ())
    }

    /// Looks up a view by handle.
    pub fn view(&self, handle: ViewHandle) -> Result<&EntityView> {
        self.views.get(handle)
    }

    /// Returns the number of registered views.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    // Systems

    /// Registers a system with [`SystemExecutionOrder::NORMAL`].
    ///
    /// See [`register_system_with_order`](Self::register_system_with_order).
    pub fn register_system<S: System>(&mut self) -> Result<&mut S> {
        self.register_system_with_order::<S>(SystemExecutionOrder::NORMAL)
    }

    /// Constructs and registers a system.
    ///
    /// Only one instance exists per type: if `S` is already registered the
    /// existing instance is returned and `order` is ignored.
    pub fn register_system_with_order<S: System>(
        &mut self,
        order: SystemExecutionOrder,
    ) -> Result<&mut S> {
        if self.system_position::<S>().is_none() {
            let system = S::init(self)?;
            debug!(
                "registered system `{}` at order {}",
                System::name(&system),
                order.0
            );
            self.insert_system(OrderedSystem::new(system, order));
        }
        self.get_system_mut::<S>()
    }

    /// Gets a registered system.
    pub fn get_system<S: System>(&self) -> Result<&S> {
        self.system_position::<S>()
            .and_then(|index| self.systems[index].system.as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))
    }

    /// Gets a mutable reference to a registered system.
    pub fn get_system_mut<S: System>(&mut self) -> Result<&mut S> {
        let system = match self.system_position::<S>() {
            Some(index) => self.systems[index].system.as_any_mut().downcast_mut::<S>(),
            None => None,
        };
        system.ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))
    }

    /// Shuts a system down and drops it.
    pub fn unregister_system<S: System>(&mut self) -> Result<()> {
        let index = self
            .system_position::<S>()
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))?;
        let mut ordered = self.systems.remove(index);
        ordered.system.shutdown(self);
        debug!("unregistered system `{}`", ordered.system.name());
        Ok(())
    }

    /// Returns the number of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Runs every enabled system once, in execution order.
    ///
    /// Systems are detached from the registry while they run, so a system
    /// cannot look up other systems from inside `update`. Systems registered
    /// during the pass join from the next frame on.
    pub fn update(&mut self, delta_time: f32) {
        let mut systems = std::mem::take(&mut self.systems);

        for ordered in &mut systems {
            if ordered.system.is_enabled() {
                ordered.system.update(self, delta_time);
            }
        }

        let added = std::mem::replace(&mut self.systems, systems);
        for mut ordered in added {
            if self
                .systems
                .iter()
                .any(|other| other.type_id == ordered.type_id)
            {
                // Registered again while its running instance was detached
                ordered.system.shutdown(self);
                continue;
            }
            self.insert_system(ordered);
        }
    }

    fn system_position<S: System>(&self) -> Option<usize> {
        let type_id = TypeId::of::<S>();
        self.systems
            .iter()
            .position(|ordered| ordered.type_id == type_id)
    }

    fn insert_system(&mut self, ordered: OrderedSystem) {
        let index = self
            .systems
            .partition_point(|other| other.order <= ordered.order);
        self.systems.insert(index, ordered);
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::EntityOutOfRange(entity))
        }
    }

    /// Writes the entity's new signature and re-evaluates every view once.
    fn commit(&mut self, entity: Entity, signature: Signature) -> Result<()> {
        self.entities.set_signature(entity, signature)?;
        self.views.signature_changed(entity, signature);
        trace!("{} signature is now {}", entity, signature);
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        // Shut systems down while the rest of the registry is still intact.
        // Systems registered by a shutdown are shut down in the next round;
        // a type gets at most one shutdown.
        let mut shut_down = HashSet::new();
        loop {
            let systems = std::mem::take(&mut self.systems);
            if systems.is_empty() {
                break;
            }
            for mut ordered in systems {
                if shut_down.insert(ordered.type_id) {
                    ordered.system.shutdown(self);
                }
            }
        }
    }
}
