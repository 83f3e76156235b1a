use std::any::{Any, TypeId};

use crate::error::Result;
use crate::registry::Registry;

/// System trait for the store.
///
/// Systems hold the per-frame logic that consumes views. The registry
/// constructs at most one instance per type through [`System::init`], which
/// is where a system registers the views it needs and keeps their handles.
///
/// # Examples
///
/// ```
/// use wil_ecs::{Component, Registry, Result, System, ViewHandle};
///
/// #[derive(Component)]
/// struct Transform([f32; 3]);
///
/// #[derive(Component)]
/// struct Model(String);
///
/// struct RenderSystem {
///     objects: ViewHandle,
///     drawn: usize,
/// }
///
/// impl System for RenderSystem {
///     fn init(registry: &mut Registry) -> Result<Self> {
///         let objects = registry.register_view::<(Transform, Model)>()?;
///         Ok(Self { objects, drawn: 0 })
///     }
///
///     fn update(&mut self, registry: &mut Registry, _delta_time: f32) {
///         if let Ok(view) = registry.view(self.objects) {
///             self.drawn = view.len();
///         }
///     }
///
///     fn shutdown(&mut self, registry: &mut Registry) {
///         let _ = registry.unregister_view(self.objects);
///     }
/// }
///
/// let mut registry = Registry::new();
/// let e = registry.create_entity();
/// registry
///     .add_components(e, (Transform([0.0; 3]), Model("cube.gltf".into())))
///     .unwrap();
/// registry.register_system::<RenderSystem>().unwrap();
/// registry.update(0.016);
/// assert_eq!(registry.get_system::<RenderSystem>().unwrap().drawn, 1);
/// ```
pub trait System: Any {
    /// Builds the system. Called once by [`Registry::register_system`].
    fn init(registry: &mut Registry) -> Result<Self>
    where
        Self: Sized;

    /// Update logic for this system.
    ///
    /// Called once per frame by [`Registry::update`].
    ///
    /// # Arguments
    ///
    /// * `registry` - The registry that owns this system
    /// * `delta_time` - Time elapsed since the last frame in seconds
    fn update(&mut self, _registry: &mut Registry, _delta_time: f32) {}

    /// Optional cleanup logic.
    ///
    /// Called when the system is unregistered or the registry is dropped.
    /// Systems release their views here.
    fn shutdown(&mut self, _registry: &mut Registry) {}

    /// Returns whether this system should be updated.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Returns the name of this system for debugging purposes.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// SystemExecutionOrder defines the relative order in which systems run.
///
/// Systems with lower order values execute before systems with higher order
/// values. Systems with equal order run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemExecutionOrder(pub i32);

impl SystemExecutionOrder {
    pub const FIRST: SystemExecutionOrder = SystemExecutionOrder(i32::MIN);
    pub const EARLY: SystemExecutionOrder = SystemExecutionOrder(-1000);
    pub const NORMAL: SystemExecutionOrder = SystemExecutionOrder(0);
    pub const LATE: SystemExecutionOrder = SystemExecutionOrder(1000);
    pub const LAST: SystemExecutionOrder = SystemExecutionOrder(i32::MAX);
}

impl Default for SystemExecutionOrder {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Object-safe view of a [`System`] used for storage inside the registry.
pub(crate) trait AnySystem {
    fn update(&mut self, registry: &mut Registry, delta_time: f32);
    fn shutdown(&mut self, registry: &mut Registry);
    fn is_enabled(&self) -> bool;
    fn name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> AnySystem for S {
    fn update(&mut self, registry: &mut Registry, delta_time: f32) {
        System::update(self, registry, delta_time)
    }

    fn shutdown(&mut self, registry: &mut Registry) {
        System::shutdown(self, registry)
    }

    fn is_enabled(&self) -> bool {
        System::is_enabled(self)
    }

    fn name(&self) -> &str {
        System::name(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A registered system together with its type key and execution order.
pub(crate) struct OrderedSystem {
    pub type_id: TypeId,
    pub order: SystemExecutionOrder,
    pub system: Box<dyn AnySystem>,
}

impl OrderedSystem {
    pub fn new<S: System>(system: S, order: SystemExecutionOrder) -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            order,
            system: Box::new(system),
        }
    }
}
