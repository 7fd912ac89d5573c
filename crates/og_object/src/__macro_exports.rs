//! Items used by the code generated from `og_object_derive`.
//!
//! Not part of the public API.

pub use alloc;
pub use core;

/// Inventory based registration of `#[object(auto_register)]` types.
#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::ObjectType;
    use crate::registry::TypeRegistry;

    pub use inventory;

    /// A registration callback submitted by the derive macro.
    pub struct AutoRegisterFn(pub fn(&mut TypeRegistry) -> bool);

    inventory::collect!(AutoRegisterFn);

    /// The function pointer stored in [`AutoRegisterFn`].
    pub fn register_type<T: ObjectType>(registry: &mut TypeRegistry) -> bool {
        registry.register::<T>()
    }

    /// Runs every submitted callback, returns how many types were added.
    pub fn register_all(registry: &mut TypeRegistry) -> usize {
        inventory::iter::<AutoRegisterFn>
            .into_iter()
            .filter(|func| (func.0)(registry))
            .count()
    }
}
