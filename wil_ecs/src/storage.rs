use super::components::Component;
use super::entity::Entity;
use super::error::{EcsError, Result};
use super::signature::{ComponentType, MAX_COMPONENTS};
use log::{debug, warn};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// ComponentArray stores every value of one component type in a dense vector.
///
/// `entity_to_index` maps an entity to its slot in `components`, and
/// `index_to_entity` maps back. All three always have the same length and
/// `entity_to_index[index_to_entity[i]] == i` for every slot. Removal swaps
/// the last slot into the hole, so slot order is not stable across removals.
pub struct ComponentArray<T: Component> {
    components: Vec<T>,
    entity_to_index: HashMap<Entity, usize>,
    index_to_entity: Vec<Entity>,
    ty: ComponentType,
}

impl<T: Component> ComponentArray<T> {
    /// Creates a new empty ComponentArray for the given type id.
    pub fn new(ty: ComponentType) -> Self {
        Self {
            components: Vec::new(),
            entity_to_index: HashMap::new(),
            index_to_entity: Vec::new(),
            ty,
        }
    }

    /// Appends a component for the given entity.
    ///
    /// Fails without touching the array if the entity already has one.
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<()> {
        if self.entity_to_index.contains_key(&entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: T::name(),
            });
        }

        self.entity_to_index.insert(entity, self.components.len());
        self.components.push(component);
        self.index_to_entity.push(entity);
        Ok(())
    }

    /// Removes the entity's component and returns it.
    ///
    /// The last slot is moved into the freed slot, which keeps the array
    /// hole-free in O(1).
    pub fn remove(&mut self, entity: Entity) -> Result<T> {
        let index = self
            .entity_to_index
            .remove(&entity)
            .ok_or(EcsError::ComponentNotFound {
                entity,
                component: T::name(),
            })?;

        let removed = self.components.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }

        Ok(removed)
    }

    /// Gets a reference to the component for the given entity.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.entity_to_index
            .get(&entity)
            .map(|&index| &self.components[index])
    }

    /// Gets a mutable reference to the component for the given entity.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.entity_to_index.get(&entity) {
            Some(&index) => Some(&mut self.components[index]),
            None => None,
        }
    }

    /// Returns true if the entity has this component.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Returns the component type id this array was registered under.
    pub fn component_type(&self) -> ComponentType {
        self.ty
    }

    /// Returns an iterator over all (Entity, &Component) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter())
    }

    /// Returns a mutable iterator over all (Entity, &mut Component) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter_mut())
    }

    /// The dense component slice.
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// The entity owning each slot of [`components`](Self::components).
    pub fn entities(&self) -> &[Entity] {
        &self.index_to_entity
    }

    /// Returns the number of components stored.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no components are stored.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Checks that the dense vector and both index maps agree.
    pub fn is_consistent(&self) -> bool {
        self.components.len() == self.entity_to_index.len()
            && self.components.len() == self.index_to_entity.len()
            && self
                .index_to_entity
                .iter()
                .enumerate()
                .all(|(i, entity)| self.entity_to_index.get(entity) == Some(&i))
    }
}

/// Type-erased component array so the manager can hold every type in one map.
pub trait AnyComponentArray: Any {
    /// Drops the entity's component if it has one. Returns true if it did.
    fn entity_destroyed(&mut self, entity: Entity) -> bool;

    /// Returns the component type id of the stored type.
    fn component_type(&self) -> ComponentType;

    /// Returns the name of the stored type.
    fn component_name(&self) -> &'static str;

    /// Returns the number of components stored.
    fn len(&self) -> usize;

    /// Returns true if no components are stored.
    fn is_empty(&self) -> bool;

    /// Converts to Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts to mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponentArray for ComponentArray<T> {
    fn entity_destroyed(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn component_type(&self) -> ComponentType {
        self.ty
    }

    fn component_name(&self) -> &'static str {
        T::name()
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owner of every component array in the registry.
///
/// Maintains a HashMap of TypeId -> ComponentArray and hands out dense
/// [`ComponentType`] ids in registration order, up to `max_components`.
pub struct ComponentManager {
    arrays: HashMap<TypeId, Box<dyn AnyComponentArray>>,
    max_components: usize,
}

impl ComponentManager {
    /// Creates a manager that accepts at most `max_components` types.
    ///
    /// The limit is clamped to [`MAX_COMPONENTS`].
    pub fn new(max_components: usize) -> Self {
        Self {
            arrays: HashMap::new(),
            max_components: max_components.min(MAX_COMPONENTS),
        }
    }

    /// Registers `T` if it is not known yet and returns its type id.
    ///
    /// Registering a type twice returns the id assigned the first time.
    pub fn register<T: Component>(&mut self) -> Result<ComponentType> {
        if let Some(ty) = self.component_type::<T>() {
            return Ok(ty);
        }

        let next = self.arrays.len();
        if next >= self.max_components {
            warn!(
                "component type limit of {} reached, rejecting `{}`",
                self.max_components,
                T::name()
            );
            return Err(EcsError::TooManyComponents {
                component: T::name(),
                limit: self.max_components,
            });
        }

        let ty = ComponentType(next as u8);
        self.arrays
            .insert(TypeId::of::<T>(), Box::new(ComponentArray::<T>::new(ty)));
        debug!("registered component `{}` as bit {}", T::name(), next);
        Ok(ty)
    }

    /// Checks that every member of a tuple could be registered, without
    /// registering any of them.
    ///
    /// Fails with [`EcsError::DuplicateComponentType`] if a `TypeId` repeats,
    /// and with [`EcsError::TooManyComponents`] naming the first unknown
    /// member that would not fit under the limit.
    pub fn check_registration(&self, members: &[(TypeId, &'static str)]) -> Result<()> {
        for (i, (type_id, _)) in members.iter().enumerate() {
            if members[..i].iter().any(|(other, _)| other == type_id) {
                return Err(EcsError::DuplicateComponentType);
            }
        }

        let mut next = self.arrays.len();
        for &(type_id, name) in members {
            if self.arrays.contains_key(&type_id) {
                continue;
            }
            if next >= self.max_components {
                warn!(
                    "component type limit of {} reached, rejecting `{}`",
                    self.max_components, name
                );
                return Err(EcsError::TooManyComponents {
                    component: name,
                    limit: self.max_components,
                });
            }
            next += 1;
        }
        Ok(())
    }

    /// Returns the type id of `T`, or None if it was never registered.
    pub fn component_type<T: Component>(&self) -> Option<ComponentType> {
        self.arrays
            .get(&TypeId::of::<T>())
            .map(|array| array.component_type())
    }

    /// Returns the name of the type registered under `ty`.
    pub fn component_name(&self, ty: ComponentType) -> Option<&'static str> {
        self.arrays
            .values()
            .find(|array| array.component_type() == ty)
            .map(|array| array.component_name())
    }

    /// Gets the array for the given component type.
    pub fn array<T: Component>(&self) -> Result<&ComponentArray<T>> {
        self.arrays
            .get(&TypeId::of::<T>())
            .and_then(|array| array.as_any().downcast_ref::<ComponentArray<T>>())
            .ok_or(EcsError::ComponentNotRegistered(T::name()))
    }

    /// Gets a mutable array for the given component type.
    pub fn array_mut<T: Component>(&mut self) -> Result<&mut ComponentArray<T>> {
        self.arrays
            .get_mut(&TypeId::of::<T>())
            .and_then(|array| array.as_any_mut().downcast_mut::<ComponentArray<T>>())
            .ok_or(EcsError::ComponentNotRegistered(T::name()))
    }

    /// Removes the entity from every array that holds it.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for array in self.arrays.values_mut() {
            array.entity_destroyed(entity);
        }
    }

    /// Returns the number of registered component types.
    pub fn component_count(&self) -> usize {
        self.arrays.len()
    }

    /// Returns the configured component type limit.
    pub fn max_components(&self) -> usize {
        self.max_components
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new(MAX_COMPONENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Component;

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Mass(u32);

    #[derive(Component, Default)]
    struct Tag {}

    #[derive(Component)]
    struct Extra;

    fn array_with(values: &[(u32, u32)]) -> ComponentArray<Mass> {
        let mut array = ComponentArray::<Mass>::new(ComponentType(0));
        for &(entity, mass) in values {
            array.insert(Entity(entity), Mass(mass)).unwrap();
        }
        array
    }

    #[test]
    fn test_component_array_insert() {
        let array = array_with(&[(1, 10)]);
        assert_eq!(array.len(), 1);
        assert!(array.contains(Entity(1)));
        assert_eq!(array.get(Entity(1)), Some(&Mass(10)));
        assert!(array.get(Entity(2)).is_none());
        assert!(array.is_consistent());
    }

    #[test]
    fn test_component_array_double_insert_rejected() {
        let mut array = array_with(&[(1, 10)]);
        let err = array.insert(Entity(1), Mass(20)).unwrap_err();
        assert_eq!(
            err,
            EcsError::DuplicateComponent {
                entity: Entity(1),
                component: "Mass"
            }
        );
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(Entity(1)), Some(&Mass(10)));
        assert!(array.is_consistent());
    }

    #[test]
    fn test_component_array_swap_remove() {
        let mut array = array_with(&[(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);

        assert_eq!(array.remove(Entity(3)), Ok(Mass(30)));
        assert!(!array.contains(Entity(3)));
        assert_eq!(array.len(), 4);
        assert!(array.is_consistent());

        // The last slot moved into the hole left by Entity(3).
        assert_eq!(array.entities()[2], Entity(5));

        for (entity, mass) in [(1, 10), (2, 20), (4, 40), (5, 50)] {
            assert_eq!(array.get(Entity(entity)), Some(&Mass(mass)));
        }
    }

    #[test]
    fn test_component_array_remove_last_and_only() {
        let mut array = array_with(&[(7, 70), (8, 80)]);
        assert_eq!(array.remove(Entity(8)), Ok(Mass(80)));
        assert!(array.is_consistent());
        assert_eq!(array.remove(Entity(7)), Ok(Mass(70)));
        assert!(array.is_empty());
        assert!(array.is_consistent());
        assert!(array.remove(Entity(7)).is_err());
    }

    #[test]
    fn test_component_array_iter_mut() {
        let mut array = array_with(&[(1, 1), (2, 2), (3, 3)]);
        for (_, mass) in array.iter_mut() {
            mass.0 *= 10;
        }
        let mut values: Vec<(Entity, u32)> = array.iter().map(|(e, m)| (e, m.0)).collect();
        values.sort();
        assert_eq!(
            values,
            vec![(Entity(1), 10), (Entity(2), 20), (Entity(3), 30)]
        );
    }

    #[test]
    fn test_component_array_get_mut() {
        let mut array = array_with(&[(1, 1)]);
        array.get_mut(Entity(1)).unwrap().0 = 99;
        assert_eq!(array.components(), &[Mass(99)]);
    }

    #[test]
    fn test_manager_register_is_idempotent() {
        let mut manager = ComponentManager::default();
        let mass = manager.register::<Mass>().unwrap();
        let tag = manager.register::<Tag>().unwrap();

        assert_eq!(mass, ComponentType(0));
        assert_eq!(tag, ComponentType(1));
        assert_eq!(manager.register::<Mass>().unwrap(), mass);
        assert_eq!(manager.component_name(tag), Some("Tag"));
        assert_eq!(manager.component_name(ComponentType(9)), None);
        assert_eq!(manager.component_count(), 2);
    }

    #[test]
    fn test_manager_limit() {
        let mut manager = ComponentManager::new(2);
        manager.register::<Mass>().unwrap();
        manager.register::<Tag>().unwrap();

        assert_eq!(
            manager.register::<Extra>(),
            Err(EcsError::TooManyComponents {
                component: "Extra",
                limit: 2
            })
        );
        assert_eq!(manager.component_type::<Extra>(), None);
        assert_eq!(manager.component_type::<Mass>(), Some(ComponentType(0)));
    }

    #[test]
    fn test_manager_check_registration() {
        let mut manager = ComponentManager::new(2);
        manager.register::<Mass>().unwrap();

        let mass = (TypeId::of::<Mass>(), "Mass");
        let tag = (TypeId::of::<Tag>(), "Tag");
        let extra = (TypeId::of::<Extra>(), "Extra");

        assert_eq!(manager.check_registration(&[mass, tag]), Ok(()));
        assert_eq!(
            manager.check_registration(&[tag, extra]),
            Err(EcsError::TooManyComponents {
                component: "Extra",
                limit: 2
            })
        );
        assert_eq!(
            manager.check_registration(&[tag, tag]),
            Err(EcsError::DuplicateComponentType)
        );
        assert_eq!(manager.component_count(), 1);
        assert_eq!(manager.component_type::<Tag>(), None);
    }

    #[test]
    fn test_manager_limit_is_clamped() {
        let manager = ComponentManager::new(MAX_COMPONENTS * 2);
        assert_eq!(manager.max_components(), MAX_COMPONENTS);
    }

    #[test]
    fn test_manager_unregistered_access() {
        let manager = ComponentManager::default();
        assert_eq!(
            manager.array::<Mass>().err(),
            Some(EcsError::ComponentNotRegistered("Mass"))
        );
    }

    #[test]
    fn test_manager_entity_destroyed() {
        let mut manager = ComponentManager::default();
        manager.register::<Mass>().unwrap();
        manager.register::<Tag>().unwrap();

        let entity = Entity(1);
        manager.array_mut::<Mass>().unwrap().insert(entity, Mass(5)).unwrap();
        manager.array_mut::<Tag>().unwrap().insert(entity, Tag::default()).unwrap();
        manager
            .array_mut::<Mass>()
            .unwrap()
            .insert(Entity(2), Mass(6))
            .unwrap();

        manager.entity_destroyed(entity);

        let masses = manager.array::<Mass>().unwrap();
        assert!(!masses.contains(entity));
        assert_eq!(masses.get(Entity(2)), Some(&Mass(6)));
        assert!(manager.array::<Tag>().unwrap().is_empty());
    }
}
