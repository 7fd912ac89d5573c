//! Provide `FixedHasher`.
//!
//! `FixedHasher` is based on the `foldhash` crate and gives stable hash
//! results through a fixed seed, so iteration order of the containers only
//! depends on their content.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x2F6B_91D3_C04E_A857);

/// A hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`], created through
/// [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed hash state based upon a random but fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use og_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one(0x1000_usize);
/// let b = FixedHashState.hash_one(0x1000_usize);
///
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::FixedHashState;
    use core::hash::BuildHasher;

    #[test]
    fn aligned_addresses_spread() {
        // Heap addresses share their low bits, the hash must not.
        let a = FixedHashState.hash_one(0x7f00_0000_1000_usize);
        let b = FixedHashState.hash_one(0x7f00_0000_1010_usize);
        assert_ne!(a, b);
    }
}
