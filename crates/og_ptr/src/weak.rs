use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;

use crate::Strong;
use crate::header::{self, Header, SharedBox};

// -----------------------------------------------------------------------------
// Weak

/// A non-owning observer of a [`Strong`] target.
///
/// A weak handle keeps the allocation alive but not the payload. It can be
/// [`upgrade`](Weak::upgrade)d while some strong handle still exists.
pub struct Weak<T: ?Sized> {
    ptr: Option<NonNull<SharedBox<T>>>,
    _marker: PhantomData<SharedBox<T>>,
}

impl<T: ?Sized> Weak<T> {
    /// Creates an empty handle.
    #[inline]
    pub const fn null() -> Self {
        Self {
            ptr: None,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle has no target.
    ///
    /// A handle whose target was destroyed is not null, see
    /// [`is_alive`](Weak::is_alive).
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    #[inline]
    fn header(&self) -> Option<&Header> {
        // SAFETY: the handle owns a weak count, so the block is allocated.
        self.ptr.map(|ptr| unsafe { header::header_of(ptr) })
    }

    /// Number of strong handles to the target.
    #[inline]
    pub fn strong_count(&self) -> u32 {
        self.header().map_or(0, Header::strong)
    }

    /// Number of weak handles to the target, this one included.
    #[inline]
    pub fn weak_count(&self) -> u32 {
        self.header().map_or(0, Header::weak)
    }

    /// Runtime type tag of the target, `0` for a null handle.
    #[inline]
    pub fn tag(&self) -> u32 {
        self.header().map_or(0, Header::tag)
    }

    /// Returns `true` if the target payload still exists.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }

    /// Address of the target block, `0` for a null handle.
    #[inline]
    pub fn addr(&self) -> usize {
        self.ptr.map_or(0, |ptr| ptr.cast::<u8>().as_ptr().addr())
    }

    /// Returns `true` if both handles point at the same block, or both are null.
    #[inline]
    pub fn ptr_eq<U: ?Sized>(&self, other: &Weak<U>) -> bool {
        self.addr() == other.addr()
    }

    /// Tries to obtain a strong handle.
    ///
    /// Returns a null handle when the target has no strong owner left.
    pub fn upgrade(&self) -> Strong<T> {
        match self.ptr {
            Some(ptr) if self.is_alive() => {
                // SAFETY: the handle owns a weak count.
                unsafe { header::header_of(ptr).inc_strong() };
                // SAFETY: the strong count taken above is handed over.
                unsafe { Strong::from_raw(Some(ptr)) }
            }
            _ => Strong::null(),
        }
    }

    /// Releases the target and leaves the handle null.
    #[inline]
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: the handle owned one weak count and forgets `ptr`.
            unsafe { header::release_weak(ptr) }
        }
    }

    /// Points this handle at the target of `strong`.
    pub fn assign(&mut self, strong: &Strong<T>) {
        if self.addr() == strong.addr() {
            return;
        }
        *self = strong.downgrade();
    }

    /// Consumes the handle without releasing its weak count.
    #[inline]
    pub fn into_raw(self) -> Option<NonNull<SharedBox<T>>> {
        let this = ManuallyDrop::new(self);
        this.ptr
    }

    /// Rebuilds a handle from [`into_raw`](Weak::into_raw).
    ///
    /// # Safety
    ///
    /// `ptr` must be null or carry one weak count that the new handle takes
    /// over.
    #[inline]
    pub unsafe fn from_raw(ptr: Option<NonNull<SharedBox<T>>>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Converts the handle to another payload type through its raw pointer.
    ///
    /// # Safety
    ///
    /// `f` must return a pointer to the same block whose payload really is a
    /// `U`.
    #[inline]
    pub unsafe fn map_raw<U: ?Sized>(
        self,
        f: impl FnOnce(NonNull<SharedBox<T>>) -> NonNull<SharedBox<U>>,
    ) -> Weak<U> {
        let ptr = self.into_raw().map(f);
        // SAFETY: the weak count moves to the new handle.
        unsafe { Weak::from_raw(ptr) }
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<T: ?Sized> Clone for Weak<T> {
    #[inline]
    fn clone(&self) -> Self {
        if let Some(header) = self.header() {
            header.inc_weak();
        }
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Drop for Weak<T> {
    #[inline]
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized> Default for Weak<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> PartialEq for Weak<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized> Eq for Weak<T> {}

impl<T: ?Sized> Hash for Weak<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Weak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            None => f.write_str("Weak(null)"),
            Some(ptr) if self.is_alive() => write!(f, "Weak({:p})", ptr.as_ptr()),
            Some(ptr) => write!(f, "Weak({:p}, dead)", ptr.as_ptr()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
