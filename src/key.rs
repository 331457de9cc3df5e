//! Type identifiers for binding-table lookup.

use std::any::TypeId;

/// Key for binding storage and lookup.
///
/// A key identifies either a concrete type or an interface (a trait object
/// type such as `dyn Logger`). Keys are what the binding tables and the
/// singleton cache are indexed by.
///
/// # Key Types
///
/// - **Type**: Concrete types (structs, enums) that can be constructed
/// - **Trait**: Interfaces, which can only be satisfied through a binding
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Key, key_of_type};
///
/// let concrete = key_of_type::<String>();
/// assert!(!concrete.is_interface());
/// assert_eq!(concrete.display_name(), "alloc::string::String");
///
/// let interface = Key::Trait("dyn core::fmt::Debug");
/// assert!(interface.is_interface());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    ///
    /// The TypeId provides fast lookup while the name helps with debugging.
    Type(TypeId, &'static str),
    /// Interface key
    ///
    /// Only stores the trait object's type name.
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display
    ///
    /// This is the `std::any::type_name` result.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }

    /// Whether this key names an interface rather than a concrete type.
    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self, Key::Trait(_))
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state); // Discriminant
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Key for a concrete type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for an interface (trait object type).
#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Marker {}

    #[test]
    fn type_keys_compare_by_type_id() {
        let a = Key::Type(TypeId::of::<u32>(), "u32");
        let b = Key::Type(TypeId::of::<u32>(), "renamed");
        assert_eq!(a, b);
        assert_ne!(a, key_of_type::<u64>());
    }

    #[test]
    fn trait_and_type_keys_never_collide() {
        let mut set = HashSet::new();
        set.insert(key_of_type::<String>());
        set.insert(Key::Trait(std::any::type_name::<String>()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn trait_key_uses_type_name() {
        let key = key_of_trait::<dyn Marker>();
        assert!(key.is_interface());
        assert!(key.display_name().contains("Marker"));
        assert_eq!(key.to_string(), key.display_name());
    }
}
