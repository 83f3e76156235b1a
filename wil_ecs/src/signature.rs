//! Component-membership bitsets.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Maximum number of distinct component types a registry can hold.
///
/// This is the bit width of [`Signature`]. Raising it means widening the
/// backing word of the bitset.
pub const MAX_COMPONENTS: usize = 64;

/// Dense id assigned to a component type the first time it is registered.
///
/// Ids are handed out in registration order, starting at zero, and stay
/// stable for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(pub(crate) u8);

impl ComponentType {
    /// Returns the bit index of this component type.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fixed-width bitset recording which component types an entity holds.
///
/// Also used as the AND-filter of a view: an entity matches a view when its
/// signature contains every bit of the view's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u64);

impl Signature {
    /// Creates an all-clear signature.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Sets the bit for `ty`.
    pub fn set(&mut self, ty: ComponentType) {
        self.0 |= 1 << ty.0;
    }

    /// Clears the bit for `ty`.
    pub fn clear(&mut self, ty: ComponentType) {
        self.0 &= !(1 << ty.0);
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Returns a copy with the bit for `ty` set.
    pub fn with(mut self, ty: ComponentType) -> Self {
        self.set(ty);
        self
    }

    /// Returns the bits of `self` that are not in `other`.
    pub fn difference(self, other: Signature) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns true if the bit for `ty` is set.
    pub fn contains(&self, ty: ComponentType) -> bool {
        self.0 & (1 << ty.0) != 0
    }

    /// Returns true if every bit of `filter` is also set in `self`.
    pub fn contains_all(&self, filter: Signature) -> bool {
        self.0 & filter.0 == filter.0
    }

    /// Returns true if the two signatures share at least one bit.
    pub fn intersects(&self, other: Signature) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the signature.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the component types whose bit is set, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = ComponentType> {
        let bits = self.0;
        (0..MAX_COMPONENTS as u8)
            .filter(move |bit| bits & (1 << bit) != 0)
            .map(ComponentType)
    }
}

impl BitAnd for Signature {
    type Output = Signature;

    fn bitand(self, rhs: Signature) -> Signature {
        Signature(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Signature;

    fn bitor(self, rhs: Signature) -> Signature {
        Signature(self.0 | rhs.0)
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Signature) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.0, width = MAX_COMPONENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut sig = Signature::new();
        assert!(sig.is_empty());

        sig.set(ComponentType(5));
        assert!(sig.contains(ComponentType(5)));
        assert!(!sig.contains(ComponentType(4)));
        assert_eq!(sig.len(), 1);

        sig.clear(ComponentType(5));
        assert!(sig.is_empty());
    }

    #[test]
    fn test_highest_bit() {
        let top = ComponentType((MAX_COMPONENTS - 1) as u8);
        let sig = Signature::new().with(top);
        assert!(sig.contains(top));
        assert_eq!(sig.iter().collect::<Vec<_>>(), vec![top]);
    }

    #[test]
    fn test_contains_all() {
        let filter = Signature::new().with(ComponentType(0)).with(ComponentType(1));
        let both = filter.with(ComponentType(7));
        let only_one = Signature::new().with(ComponentType(0));

        assert!(both.contains_all(filter));
        assert!(!only_one.contains_all(filter));
        assert!(only_one.contains_all(Signature::new()));
        assert!(only_one.intersects(filter));
        assert_eq!(both.difference(filter), Signature::new().with(ComponentType(7)));
    }

    #[test]
    fn test_bit_ops() {
        let a = Signature::new().with(ComponentType(1));
        let b = Signature::new().with(ComponentType(2));
        let mut c = a | b;
        assert_eq!(c.len(), 2);
        assert_eq!(c & a, a);

        c |= Signature::new().with(ComponentType(3));
        assert_eq!(
            c.iter().collect::<Vec<_>>(),
            vec![ComponentType(1), ComponentType(2), ComponentType(3)]
        );
    }

    #[test]
    fn test_display() {
        let sig = Signature::new().with(ComponentType(0)).with(ComponentType(2));
        let text = sig.to_string();
        assert_eq!(text.len(), MAX_COMPONENTS);
        assert!(text.ends_with("101"));
    }
}
