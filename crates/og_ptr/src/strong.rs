use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;

use crate::Weak;
use crate::header::{self, Header, SharedBox};

// -----------------------------------------------------------------------------
// Strong

/// An owning, non-atomic reference-counted handle.
///
/// A `Strong` is either null or owns one strong count of a [`SharedBox`].
/// Cloning increments the count, dropping or [`reset`](Strong::reset)ting
/// decrements it.
///
/// # Examples
///
/// ```
/// use og_ptr::Strong;
///
/// let a = Strong::new(String::from("hello"));
/// let b = a.clone();
/// b.borrow_mut().push_str(" world");
///
/// assert!(a.ptr_eq(&b));
/// assert_eq!(&*a.borrow(), "hello world");
/// assert_eq!(a.strong_count(), 2);
/// ```
pub struct Strong<T: ?Sized> {
    ptr: Option<NonNull<SharedBox<T>>>,
    _marker: PhantomData<SharedBox<T>>,
}

impl<T> Strong<T> {
    /// Allocates `value` with one strong count.
    #[inline]
    pub fn new(value: T) -> Self {
        Self::new_tagged(value, 0)
    }

    /// Allocates `value` with one strong count and a runtime type tag.
    #[inline]
    pub fn new_tagged(value: T, tag: u32) -> Self {
        Self {
            ptr: Some(SharedBox::allocate(value, tag)),
            _marker: PhantomData,
        }
    }

    /// Releases the current target and points at a fresh allocation of `value`.
    #[inline]
    pub fn emplace(&mut self, value: T) {
        *self = Self::new(value);
    }
}

impl<T: ?Sized> Strong<T> {
    /// Creates an empty handle.
    #[inline]
    pub const fn null() -> Self {
        Self {
            ptr: None,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle has no target.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    #[inline]
    fn inner(&self) -> Option<&SharedBox<T>> {
        // SAFETY: the handle owns a strong count, so the block and the
        // payload are alive at least as long as `self` is borrowed.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns the header of the target.
    #[inline]
    pub fn header(&self) -> Option<&Header> {
        self.inner().map(SharedBox::header)
    }

    /// Returns the payload cell of the target.
    #[inline]
    pub fn cell(&self) -> Option<&RefCell<T>> {
        self.inner().map(SharedBox::value)
    }

    /// Immutably borrows the payload.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null or the payload is mutably borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, T> {
        match self.cell() {
            Some(cell) => cell.borrow(),
            None => null_access(),
        }
    }

    /// Mutably borrows the payload.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null or the payload is already borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        match self.cell() {
            Some(cell) => cell.borrow_mut(),
            None => null_access(),
        }
    }

    /// Immutably borrows the payload, returning `None` if the handle is null
    /// or the payload is mutably borrowed.
    #[inline]
    pub fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.cell().and_then(|cell| cell.try_borrow().ok())
    }

    /// Mutably borrows the payload, returning `None` if the handle is null
    /// or the payload is already borrowed.
    #[inline]
    pub fn try_borrow_mut(&self) -> Option<RefMut<'_, T>> {
        self.cell().and_then(|cell| cell.try_borrow_mut().ok())
    }

    /// Number of strong handles to the target, `0` for a null handle.
    #[inline]
    pub fn strong_count(&self) -> u32 {
        self.header().map_or(0, Header::strong)
    }

    /// Number of weak handles to the target, `0` for a null handle.
    #[inline]
    pub fn weak_count(&self) -> u32 {
        self.header().map_or(0, Header::weak)
    }

    /// Runtime type tag of the target, `0` for a null handle.
    #[inline]
    pub fn tag(&self) -> u32 {
        self.header().map_or(0, Header::tag)
    }

    /// Address of the target block, `0` for a null handle.
    ///
    /// The address identifies the target while any handle keeps the block
    /// allocated.
    #[inline]
    pub fn addr(&self) -> usize {
        self.ptr.map_or(0, |ptr| ptr.cast::<u8>().as_ptr().addr())
    }

    /// Returns `true` if both handles point at the same block, or both are null.
    #[inline]
    pub fn ptr_eq<U: ?Sized>(&self, other: &Strong<U>) -> bool {
        self.addr() == other.addr()
    }

    /// Creates a weak handle to the target, incrementing its weak count.
    #[inline]
    pub fn downgrade(&self) -> Weak<T> {
        match self.ptr {
            Some(ptr) => {
                // SAFETY: the handle owns a strong count.
                unsafe { header::header_of(ptr).inc_weak() };
                // SAFETY: the weak count taken above is handed over.
                unsafe { Weak::from_raw(Some(ptr)) }
            }
            None => Weak::null(),
        }
    }

    /// Releases the target and leaves the handle null.
    #[inline]
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: the handle owned one strong count and forgets `ptr`.
            unsafe { header::release_strong(ptr) }
        }
    }

    /// Points this handle at the target of `other`.
    ///
    /// Assigning a handle to its own target does nothing, even when this
    /// handle is the last owner.
    pub fn assign(&mut self, other: &Self) {
        if self.ptr_eq(other) {
            return;
        }
        if let Some(ptr) = other.ptr {
            // SAFETY: `other` owns a strong count.
            unsafe { header::header_of(ptr).inc_strong() };
        }
        let old = core::mem::replace(&mut self.ptr, other.ptr);
        if let Some(old) = old {
            // SAFETY: the handle owned one strong count of `old`.
            unsafe { header::release_strong(old) }
        }
    }

    /// Moves the target out, leaving a null handle behind.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::replace(self, Self::null())
    }

    /// Gives up this handle's strong count without destroying the payload.
    ///
    /// Used to unwind reference cycles: the handle becomes null and the
    /// target loses one owner, but its destructor does not run from here.
    /// When this handle is the last owner nothing happens and `false` is
    /// returned.
    pub fn detach(&mut self) -> bool {
        let Some(ptr) = self.ptr else {
            return false;
        };
        // SAFETY: the handle owns a strong count. On success it is consumed
        // and the pointer is dropped right below.
        if unsafe { header::detach_strong(ptr) } {
            self.ptr = None;
            true
        } else {
            false
        }
    }

    /// Consumes the handle without releasing its strong count.
    #[inline]
    pub fn into_raw(self) -> Option<NonNull<SharedBox<T>>> {
        let this = ManuallyDrop::new(self);
        this.ptr
    }

    /// Rebuilds a handle from [`into_raw`](Strong::into_raw).
    ///
    /// # Safety
    ///
    /// `ptr` must be null or carry one strong count that the new handle takes
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
    /// Unsizing coercions such as `SharedBox<T>` to `SharedBox<dyn Trait>`
    /// are the intended use.
    ///
    /// # Safety
    ///
    /// `f` must return a pointer to the same block whose payload really is a
    /// `U`.
    #[inline]
    pub unsafe fn map_raw<U: ?Sized>(
        self,
        f: impl FnOnce(NonNull<SharedBox<T>>) -> NonNull<SharedBox<U>>,
    ) -> Strong<U> {
        let ptr = self.into_raw().map(f);
        // SAFETY: the strong count moves to the new handle.
        unsafe { Strong::from_raw(ptr) }
    }
}

#[cold]
#[track_caller]
fn null_access() -> ! {
    panic!("attempted to borrow the payload of a null handle")
}

// -----------------------------------------------------------------------------
// Traits

impl<T: ?Sized> Clone for Strong<T> {
    #[inline]
    fn clone(&self) -> Self {
        if let Some(ptr) = self.ptr {
            // SAFETY: `self` owns a strong count.
            unsafe { header::header_of(ptr).inc_strong() };
        }
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Drop for Strong<T> {
    #[inline]
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized> Default for Strong<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> PartialEq for Strong<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized> Eq for Strong<T> {}

impl<T: ?Sized> Hash for Strong<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Strong<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell() {
            None => f.write_str("Strong(null)"),
            Some(cell) => match cell.try_borrow() {
                Ok(value) => f.debug_tuple("Strong").field(&&*value).finish(),
                Err(_) => f.write_str("Strong(<borrowed>)"),
            },
        }
    }
}

impl<T: ?Sized> fmt::Pointer for Strong<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            Some(ptr) => fmt::Pointer::fmt(&ptr.as_ptr(), f),
            None => fmt::Pointer::fmt(&core::ptr::null::<u8>(), f),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
