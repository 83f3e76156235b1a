//! Multi-component operations over tuples.
//!
//! [`ComponentSet`] names a group of component types, such as
//! `(Transform, Model)`, and is used for removal, lookup and view filters.
//! [`ComponentBundle`] carries one value per type and is used for insertion.
//! Both are implemented for tuples of one to eight components, and
//! `ComponentSet` also for `()`.

use std::any::TypeId;

use crate::components::Component;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::signature::Signature;
use crate::storage::ComponentManager;

/// A tuple of component types.
pub trait ComponentSet {
    /// Number of types in the tuple.
    const LEN: usize;

    /// Tuple of shared references returned by [`fetch`](Self::fetch).
    type Item<'a>;

    /// Combined signature, registering unknown types on the way.
    ///
    /// Fails without registering anything if a type appears twice or the
    /// unknown types do not all fit under the component limit.
    fn register(manager: &mut ComponentManager) -> Result<Signature>;

    /// Combined signature of already registered types.
    ///
    /// Fails without registering anything if a type is unknown or appears
    /// twice.
    fn signature(manager: &ComponentManager) -> Result<Signature>;

    /// Bits of the members that are already registered; unknown members are
    /// skipped.
    fn registered(manager: &ComponentManager) -> Signature;

    /// Removes every member from the entity's arrays.
    ///
    /// The caller checks membership first; a missing member fails at the
    /// first absent array.
    fn remove(manager: &mut ComponentManager, entity: Entity) -> Result<()>;

    /// Borrows every member of the entity at once.
    fn fetch(manager: &ComponentManager, entity: Entity) -> Result<Self::Item<'_>>;
}

/// A tuple of component values inserted together.
pub trait ComponentBundle {
    /// The matching tuple of types.
    type Set: ComponentSet;

    /// Moves every value into its array.
    fn insert(self, manager: &mut ComponentManager, entity: Entity) -> Result<()>;
}

/// Checks that a tuple of `len` types produced `len` distinct bits.
pub(crate) fn ensure_distinct(signature: Signature, len: usize) -> Result<Signature> {
    if signature.len() == len {
        Ok(signature)
    } else {
        Err(EcsError::DuplicateComponentType)
    }
}

fn fetch_one<T: Component>(manager: &ComponentManager, entity: Entity) -> Result<&T> {
    manager
        .array::<T>()?
        .get(entity)
        .ok_or(EcsError::ComponentNotFound {
            entity,
            component: T::name(),
        })
}

macro_rules! impl_component_tuple {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            const LEN: usize = [$(stringify!($name)),+].len();

            type Item<'a> = ($(&'a $name,)+);

            fn register(manager: &mut ComponentManager) -> Result<Signature> {
                manager.check_registration(&[$((TypeId::of::<$name>(), $name::name())),+])?;
                let mut signature = Signature::new();
                $( signature.set(manager.register::<$name>()?); )+
                Ok(signature)
            }

            fn signature(manager: &ComponentManager) -> Result<Signature> {
                let mut signature = Signature::new();
                $(
                    signature.set(
                        manager
                            .component_type::<$name>()
                            .ok_or(EcsError::ComponentNotRegistered($name::name()))?,
                    );
                )+
                ensure_distinct(signature, Self::LEN)
            }

            fn registered(manager: &ComponentManager) -> Signature {
                let mut signature = Signature::new();
                $(
                    if let Some(ty) = manager.component_type::<$name>() {
                        signature.set(ty);
                    }
                )+
                signature
            }

            fn remove(manager: &mut ComponentManager, entity: Entity) -> Result<()> {
                $( manager.array_mut::<$name>()?.remove(entity)?; )+
                Ok(())
            }

            fn fetch(manager: &ComponentManager, entity: Entity) -> Result<Self::Item<'_>> {
                Ok(($(fetch_one::<$name>(manager, entity)?,)+))
            }
        }

        impl<$($name: Component),+> ComponentBundle for ($($name,)+) {
            type Set = ($($name,)+);

            #[allow(non_snake_case)]
            fn insert(self, manager: &mut ComponentManager, entity: Entity) -> Result<()> {
                let ($($name,)+) = self;
                $( manager.array_mut::<$name>()?.insert(entity, $name)?; )+
                Ok(())
            }
        }
    };
}

/// The empty set: matches every live entity when used as a view filter.
impl ComponentSet for () {
    const LEN: usize = 0;

    type Item<'a> = ();

    fn register(_manager: &mut ComponentManager) -> Result<Signature> {
        Ok(Signature::new())
    }

    fn signature(_manager: &ComponentManager) -> Result<Signature> {
        Ok(Signature::new())
    }

    fn registered(_manager: &ComponentManager) -> Signature {
        Signature::new()
    }

    fn remove(_manager: &mut ComponentManager, _entity: Entity) -> Result<()> {
        Ok(())
    }

    fn fetch(_manager: &ComponentManager, _entity: Entity) -> Result<Self::Item<'_>> {
        Ok(())
    }
}

impl_component_tuple!(A);
impl_component_tuple!(A, B);
impl_component_tuple!(A, B, C);
impl_component_tuple!(A, B, C, D);
impl_component_tuple!(A, B, C, D, E);
impl_component_tuple!(A, B, C, D, E, F);
impl_component_tuple!(A, B, C, D, E, F, G);
impl_component_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ComponentType;
    use crate::Component;

    #[derive(Component, Debug, PartialEq)]
    struct Transform(i32);

    #[derive(Component, Debug, PartialEq)]
    struct Model(&'static str);

    #[derive(Component, Debug, PartialEq)]
    struct PointLight(u8);

    #[test]
    fn test_set_len() {
        assert_eq!(<(Transform,) as ComponentSet>::LEN, 1);
        assert_eq!(<(Transform, Model, PointLight) as ComponentSet>::LEN, 3);
    }

    #[test]
    fn test_register_builds_signature() {
        let mut manager = ComponentManager::default();
        manager.register::<PointLight>().unwrap();

        let signature = <(Transform, Model)>::register(&mut manager).unwrap();
        assert_eq!(
            signature,
            Signature::new().with(ComponentType(1)).with(ComponentType(2))
        );
        assert_eq!(<(Model, Transform)>::signature(&manager), Ok(signature));
    }

    #[test]
    fn test_signature_without_registration() {
        let mut manager = ComponentManager::default();
        manager.register::<Transform>().unwrap();
        assert_eq!(
            <(Transform, Model)>::signature(&manager),
            Err(EcsError::ComponentNotRegistered("Model"))
        );
        assert_eq!(manager.component_count(), 1);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut manager = ComponentManager::default();
        assert_eq!(
            <(Transform, Transform)>::register(&mut manager),
            Err(EcsError::DuplicateComponentType)
        );
        assert_eq!(manager.component_count(), 0);
    }

    #[test]
    fn test_register_over_limit_registers_nothing() {
        let mut manager = ComponentManager::new(2);
        manager.register::<Transform>().unwrap();

        assert_eq!(
            <(Model, PointLight)>::register(&mut manager),
            Err(EcsError::TooManyComponents {
                component: "PointLight",
                limit: 2
            })
        );
        assert_eq!(manager.component_count(), 1);
        assert_eq!(manager.component_type::<Model>(), None);

        // Known members do not count against the limit.
        assert!(<(Transform, Model)>::register(&mut manager).is_ok());
    }

    #[test]
    fn test_insert_and_fetch() {
        let mut manager = ComponentManager::default();
        <(Transform, Model)>::register(&mut manager).unwrap();

        let entity = Entity(4);
        (Transform(1), Model("cube.gltf"))
            .insert(&mut manager, entity)
            .unwrap();

        let (transform, model) = <(Transform, Model)>::fetch(&manager, entity).unwrap();
        assert_eq!(transform, &Transform(1));
        assert_eq!(model, &Model("cube.gltf"));

        <(Transform, Model)>::remove(&mut manager, entity).unwrap();
        assert!(manager.array::<Transform>().unwrap().is_empty());
        assert!(manager.array::<Model>().unwrap().is_empty());
    }

    #[test]
    fn test_fetch_missing_member() {
        let mut manager = ComponentManager::default();
        <(Transform, Model)>::register(&mut manager).unwrap();
        (Transform(1),).insert(&mut manager, Entity(0)).unwrap();

        assert_eq!(
            <(Transform, Model)>::fetch(&manager, Entity(0)).err(),
            Some(EcsError::ComponentNotFound {
                entity: Entity(0),
                component: "Model"
            })
        );
    }
}
