use std::any::Any;

// Re-export the derive macro for convenience
pub use wil_derive::Component;

/// Core Component trait for the store.
///
/// Components are plain data values attached to entities. Each component type
/// gets its own dense array inside the registry, so the only requirement is
/// that the type is `'static` and can be downcast from a type-erased array.
///
/// # Examples
///
/// ```
/// use wil_ecs::Component;
///
/// #[derive(Component)]
/// struct Model {
///     path: String,
/// }
///
/// assert_eq!(<Model as Component>::name(), "Model");
/// ```
pub trait Component: Any {
    /// Human readable name used in logs and errors.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
