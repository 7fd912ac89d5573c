//! The process-wide type registry.
//!
//! A [`TypeRegistry`] maps a 16-bit type id to a factory, a parent id and a
//! trivial flag. Decoding polymorphic handles and checked casts consult the
//! global instance behind [`global`] / [`global_mut`]; populate it at
//! startup, before anything is decoded.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! We use the [`inventory`](https://docs.rs/inventory) crate to collect the
//! types marked `#[object(auto_register)]`. Without the `auto_register`
//! feature, or on platforms `inventory` does not support, it registers
//! nothing.

use core::any::TypeId;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use og_utils::TypeIdMap;

use crate::{ObjPtr, ObjectKind, ObjectType};

// -----------------------------------------------------------------------------
// TypeEntry

/// The registered metadata of one type id.
#[derive(Clone, Copy, Debug)]
pub struct TypeEntry {
    factory: Option<fn() -> ObjPtr>,
    parent: u16,
    trivial: bool,
    name: &'static str,
    rust_type: TypeId,
}

impl TypeEntry {
    /// Id of the parent kind, `0` for the root.
    #[inline]
    pub fn parent(&self) -> u16 {
        self.parent
    }

    /// `true` if values of the type hold no handle.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    /// `false` for abstract kinds.
    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.factory.is_some()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn create_object<T: ObjectType>() -> ObjPtr {
    ObjPtr::new(T::default()).into_object()
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// Type id to factory, parent id and trivial flag.
///
/// # Examples
///
/// ```
/// use og_object::{Object, ObjectKind};
/// use og_object::registry::TypeRegistry;
///
/// struct Animal;
/// impl ObjectKind for Animal {
///     const TYPE_ID: u16 = 1;
///     const PARENT_ID: u16 = 0;
///     const NAME: &'static str = "Animal";
/// }
///
/// struct Dog;
/// impl ObjectKind for Dog {
///     const TYPE_ID: u16 = 2;
///     const PARENT_ID: u16 = Animal::TYPE_ID;
///     const NAME: &'static str = "Dog";
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register_kind::<Animal>();
/// registry.register_kind::<Dog>();
///
/// assert!(registry.is_base_of(1, 2));
/// assert!(!registry.is_base_of(2, 1));
/// assert!(registry.create(2).is_null()); // kinds have no factory
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    entries: TypeIdMap<TypeEntry>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: TypeIdMap::new(),
        }
    }

    fn insert_entry(&mut self, type_id: u16, entry: TypeEntry) -> bool {
        if type_id == 0 {
            log::warn!("`{}` cannot use the reserved type id 0", entry.name);
            return false;
        }
        if let Some(old) = self.entries.get_mut(type_id) {
            if old.rust_type != entry.rust_type {
                log::warn!(
                    "type id {type_id} is already taken by `{}`, `{}` is ignored",
                    old.name,
                    entry.name,
                );
                return false;
            }
            // An abstract registration may be upgraded with a factory.
            if old.factory.is_none() && entry.factory.is_some() {
                *old = entry;
                return true;
            }
            return false;
        }
        log::debug!("register `{}` as type id {type_id}", entry.name);
        self.entries.insert(type_id, entry);
        true
    }

    /// Registers a concrete object type.
    ///
    /// Returns `false` if the id is `0`, already registered, or taken by
    /// another type.
    pub fn register<T: ObjectType>(&mut self) -> bool {
        self.insert_entry(
            T::TYPE_ID,
            TypeEntry {
                factory: Some(create_object::<T>),
                parent: T::PARENT_ID,
                trivial: T::TRIVIAL,
                name: T::NAME,
                rust_type: TypeId::of::<T>(),
            },
        )
    }

    /// Registers an abstract kind, a hierarchy node without factory.
    pub fn register_kind<K: ?Sized + ObjectKind>(&mut self) -> bool {
        self.insert_entry(
            K::TYPE_ID,
            TypeEntry {
                factory: None,
                parent: K::PARENT_ID,
                trivial: false,
                name: K::NAME,
                rust_type: TypeId::of::<K>(),
            },
        )
    }

    /// Registers every type marked `#[object(auto_register)]`.
    ///
    /// Returns how many types were added. Types already present are skipped,
    /// so calling this repeatedly is cheap and harmless.
    ///
    /// This method requires the `auto_register` feature. When disabled, it
    /// always returns `0`.
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            let added = crate::__macro_exports::auto_register::register_all(self);
            log::debug!("auto registered {added} object types");
            added
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    /// Returns the entry of `type_id`.
    #[inline]
    pub fn get(&self, type_id: u16) -> Option<&TypeEntry> {
        self.entries.get(type_id)
    }

    #[inline]
    pub fn contains(&self, type_id: u16) -> bool {
        self.entries.contains(type_id)
    }

    /// Parent id of `type_id`, `None` if it is not registered.
    #[inline]
    pub fn parent_of(&self, type_id: u16) -> Option<u16> {
        self.get(type_id).map(TypeEntry::parent)
    }

    /// `true` if `type_id` is registered as trivial.
    #[inline]
    pub fn is_trivial(&self, type_id: u16) -> bool {
        self.get(type_id).is_some_and(TypeEntry::is_trivial)
    }

    #[inline]
    pub fn name_of(&self, type_id: u16) -> Option<&'static str> {
        self.get(type_id).map(TypeEntry::name)
    }

    /// Creates a default value of `type_id`.
    ///
    /// Returns a null handle for id `0`, unregistered ids and abstract kinds.
    pub fn create(&self, type_id: u16) -> ObjPtr {
        match self.get(type_id).and_then(|entry| entry.factory) {
            Some(factory) => factory(),
            None => ObjPtr::null(),
        }
    }

    /// Returns `true` if `type_id` is `base` or one of its descendants.
    ///
    /// Every id descends from the root `0`. Otherwise the parent chain of
    /// `type_id` is walked until it reaches `base`, the root, an
    /// unregistered id or a loop.
    pub fn is_base_of(&self, base: u16, type_id: u16) -> bool {
        if base == 0 || base == type_id {
            return true;
        }
        let mut current = type_id;
        for _ in 0..=self.entries.len() {
            let Some(parent) = self.parent_of(current) else {
                return false;
            };
            if parent == base {
                return true;
            }
            if parent == 0 || parent == current {
                return false;
            }
            current = parent;
        }
        false
    }

    /// Number of registered ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered ids and their entries.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u16, &TypeEntry)> {
        self.entries.iter()
    }

    /// Removes every registration.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, entry)| (id, entry.name)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Global

static GLOBAL: RwLock<TypeRegistry> = RwLock::new(TypeRegistry::new());

/// Read access to the global registry.
#[inline]
pub fn global() -> RwLockReadGuard<'static, TypeRegistry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to the global registry.
#[inline]
pub fn global_mut() -> RwLockWriteGuard<'static, TypeRegistry> {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner)
}

/// Registers `T` in the global registry.
#[inline]
pub fn register<T: ObjectType>() -> bool {
    global_mut().register::<T>()
}

/// Registers the abstract kind `K` in the global registry.
#[inline]
pub fn register_kind<K: ?Sized + ObjectKind>() -> bool {
    global_mut().register_kind::<K>()
}

/// Registers every `#[object(auto_register)]` type in the global registry.
#[inline]
pub fn auto_register() -> usize {
    global_mut().auto_register()
}

/// Tears the global registry down.
#[inline]
pub fn clear() {
    global_mut().clear();
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeRegistry;
    use crate::{Object, ObjectKind};

    macro_rules! kind {
        ($name:ident, $id:expr, $parent:expr) => {
            struct $name;
            impl ObjectKind for $name {
                const TYPE_ID: u16 = $id;
                const PARENT_ID: u16 = $parent;
                const NAME: &'static str = stringify!($name);
            }
        };
    }

    kind!(A, 1, 0);
    kind!(B, 2, 1);
    kind!(C, 3, 2);
    kind!(Loop, 4, 4);
    kind!(Orphan, 5, 99);
    kind!(Clash, 1, 0);

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_kind::<A>());
        assert!(registry.register_kind::<B>());
        assert!(registry.register_kind::<C>());
        assert!(registry.register_kind::<Loop>());
        assert!(registry.register_kind::<Orphan>());
        registry
    }

    #[test]
    fn hierarchy_walk() {
        let registry = registry();
        assert!(registry.is_base_of(1, 3));
        assert!(registry.is_base_of(2, 3));
        assert!(registry.is_base_of(3, 3));
        assert!(!registry.is_base_of(3, 1));
        assert!(registry.is_base_of(0, 3));
        assert!(!registry.is_base_of(1, 4));
        assert!(!registry.is_base_of(1, 5));
        assert!(!registry.is_base_of(1, 42));
    }

    #[test]
    fn rejected_registrations() {
        let mut registry = registry();
        assert!(!registry.register_kind::<A>());
        assert!(!registry.register_kind::<Clash>());
        assert!(!registry.register_kind::<dyn Object>());
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.name_of(1), Some("A"));
    }

    #[test]
    fn create_and_clear() {
        let mut registry = registry();
        assert!(registry.create(0).is_null());
        assert!(registry.create(2).is_null());
        assert!(registry.create(77).is_null());
        assert!(!registry.is_trivial(2));

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.is_base_of(1, 3));
    }
}
