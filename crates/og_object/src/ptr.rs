#![expect(unsafe_code, reason = "unsizing a shared block needs its raw pointer")]

use core::any::Any;
use core::cell::{Ref, RefMut};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ptr::NonNull;

use og_ptr::{SharedBox, Strong, Weak};

use crate::registry;
use crate::{Object, ObjectKind, ObjectType};

// -----------------------------------------------------------------------------
// ObjPtr

/// A strong handle to a polymorphic object.
///
/// The payload is always stored as `dyn Object`; `K` is the declared kind of
/// the handle. A non-null `ObjPtr<K>` points at an object whose runtime type
/// is `K` or a registered descendant of `K`. The runtime type id lives in the
/// allocation header.
///
/// # Examples
///
/// ```
/// use og_object::{Object, ObjPtr};
///
/// #[derive(Object, Default)]
/// #[object(id = 30)]
/// struct Counter {
///     hits: u32,
/// }
///
/// let counter = ObjPtr::new(Counter { hits: 1 });
/// counter.borrow_mut().hits += 1;
///
/// let any: ObjPtr = counter.clone().into_object();
/// assert_eq!(any.type_tag(), 30);
/// assert_eq!(any.downcast_ref::<Counter>().unwrap().hits, 2);
/// ```
pub struct ObjPtr<K: ?Sized + ObjectKind = dyn Object> {
    inner: Strong<dyn Object>,
    _kind: PhantomData<fn() -> *const K>,
}

impl<T: ObjectType> ObjPtr<T> {
    /// Allocates `value`, tagging the block with `T::TYPE_ID`.
    pub fn new(value: T) -> Self {
        let strong = Strong::new_tagged(value, u32::from(T::TYPE_ID));
        // SAFETY: the closure only unsizes the pointer to the same block.
        let inner = unsafe {
            strong.map_raw(|ptr: NonNull<SharedBox<T>>| -> NonNull<SharedBox<dyn Object>> { ptr })
        };
        Self::from_inner(inner)
    }

    /// Borrows the payload as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null, the payload is mutably borrowed, or the
    /// handle holds a descendant of `T` instead of a `T`.
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, T> {
        Ref::map(self.inner.borrow(), |obj| {
            downcast_payload::<T>(obj).unwrap_or_else(|| kind_violation())
        })
    }

    /// Mutably borrows the payload as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null, the payload is already borrowed, or the
    /// handle holds a descendant of `T` instead of a `T`.
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.inner.borrow_mut(), |obj| {
            downcast_payload_mut::<T>(obj).unwrap_or_else(|| kind_violation())
        })
    }
}

impl<K: ?Sized + ObjectKind> ObjPtr<K> {
    #[inline]
    const fn from_inner(inner: Strong<dyn Object>) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    /// Creates an empty handle.
    #[inline]
    pub const fn null() -> Self {
        Self::from_inner(Strong::null())
    }

    /// Wraps a raw object handle, checking its runtime type against `K`.
    ///
    /// Returns a null handle when the type id is not `K` or a descendant.
    pub fn from_strong(inner: Strong<dyn Object>) -> Self {
        if is_kind::<K>(inner.tag()) {
            Self::from_inner(inner)
        } else {
            Self::null()
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.inner.is_null()
    }

    /// The runtime type id of the target, `0` for a null handle.
    #[inline]
    pub fn type_tag(&self) -> u16 {
        tag_to_id(self.inner.tag())
    }

    /// Returns `true` if the target's runtime type is `K2` or a descendant.
    pub fn is<K2: ?Sized + ObjectKind>(&self) -> bool {
        if self.is_null() {
            return false;
        }
        // The target is always a `K`, so `K` and its parent hold statically.
        K2::TYPE_ID == K::TYPE_ID
            || K2::TYPE_ID == K::PARENT_ID
            || is_kind::<K2>(self.inner.tag())
    }

    /// Checked conversion to another kind.
    ///
    /// Converting to `dyn Object`, to `K` itself or to the direct parent of
    /// `K` never fails and takes no registry lookup. Any other target checks
    /// the runtime type id against the registry, walking up from the runtime
    /// type, and yields a null handle on mismatch.
    ///
    /// ```
    /// use og_object::{Object, ObjPtr};
    ///
    /// #[derive(Object, Default)]
    /// #[object(id = 31)]
    /// struct Apple;
    ///
    /// #[derive(Object, Default)]
    /// #[object(id = 32)]
    /// struct Pear;
    ///
    /// let fruit: ObjPtr = ObjPtr::new(Apple).into_object();
    /// assert!(fruit.cast::<Apple>().is_some());
    /// assert!(fruit.cast::<Pear>().is_null());
    /// ```
    pub fn cast<K2: ?Sized + ObjectKind>(&self) -> ObjPtr<K2> {
        if self.is::<K2>() {
            ObjPtr::from_inner(self.inner.clone())
        } else {
            ObjPtr::null()
        }
    }

    /// Returns `true` if the handle is not null.
    #[inline]
    pub const fn is_some(&self) -> bool {
        !self.is_null()
    }

    /// Forgets the declared kind.
    #[inline]
    pub fn into_object(self) -> ObjPtr {
        ObjPtr::from_inner(self.into_strong())
    }

    /// Returns the declared kind erased view of the same target.
    #[inline]
    pub fn to_object(&self) -> ObjPtr {
        ObjPtr::from_inner(self.inner.clone())
    }

    /// The underlying handle.
    #[inline]
    pub fn as_strong(&self) -> &Strong<dyn Object> {
        &self.inner
    }

    #[inline]
    pub(crate) fn as_strong_mut(&mut self) -> &mut Strong<dyn Object> {
        &mut self.inner
    }

    #[inline]
    pub fn into_strong(self) -> Strong<dyn Object> {
        self.inner
    }

    /// Borrows the payload through the object interface.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null or the payload is mutably borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow_object(&self) -> Ref<'_, dyn Object> {
        self.inner.borrow()
    }

    /// Mutably borrows the payload through the object interface.
    ///
    /// # Panics
    ///
    /// Panics if the handle is null or the payload is already borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow_object_mut(&self) -> RefMut<'_, dyn Object> {
        self.inner.borrow_mut()
    }

    #[inline]
    pub fn try_borrow_object(&self) -> Option<Ref<'_, dyn Object>> {
        self.inner.try_borrow()
    }

    #[inline]
    pub fn try_borrow_object_mut(&self) -> Option<RefMut<'_, dyn Object>> {
        self.inner.try_borrow_mut()
    }

    /// Borrows the payload if its concrete type is exactly `T`.
    pub fn downcast_ref<T: ObjectType>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.inner.try_borrow()?, downcast_payload::<T>).ok()
    }

    /// Mutably borrows the payload if its concrete type is exactly `T`.
    pub fn downcast_mut<T: ObjectType>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.inner.try_borrow_mut()?, downcast_payload_mut::<T>).ok()
    }

    #[inline]
    pub fn strong_count(&self) -> u32 {
        self.inner.strong_count()
    }

    #[inline]
    pub fn weak_count(&self) -> u32 {
        self.inner.weak_count()
    }

    /// Address of the target block, `0` for a null handle.
    #[inline]
    pub fn addr(&self) -> usize {
        self.inner.addr()
    }

    #[inline]
    pub fn ptr_eq<K2: ?Sized + ObjectKind>(&self, other: &ObjPtr<K2>) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Creates a weak handle of the same kind.
    #[inline]
    pub fn downgrade(&self) -> ObjWeak<K> {
        ObjWeak::from_inner(self.inner.downgrade())
    }

    /// Releases the target and leaves the handle null.
    #[inline]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Points at the target of `other`, self-assignment is a no-op.
    #[inline]
    pub fn assign(&mut self, other: &Self) {
        self.inner.assign(&other.inner);
    }

    /// Moves the target out, leaving a null handle behind.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self::from_inner(self.inner.take())
    }

    /// See [`Strong::detach`].
    #[inline]
    pub fn detach(&mut self) -> bool {
        self.inner.detach()
    }

    /// Points at an object already known to satisfy `K`.
    #[inline]
    pub(crate) fn set_object(&mut self, object: &ObjPtr) {
        self.inner.assign(&object.inner);
    }
}

impl ObjPtr {
    /// Allocates `value` behind a kind-erased handle.
    #[inline]
    pub fn make<T: ObjectType>(value: T) -> Self {
        ObjPtr::new(value).into_object()
    }
}

#[inline]
fn tag_to_id(tag: u32) -> u16 {
    u16::try_from(tag).unwrap_or(0)
}

fn is_kind<K: ?Sized + ObjectKind>(tag: u32) -> bool {
    let type_id = tag_to_id(tag);
    K::TYPE_ID == 0 || K::TYPE_ID == type_id || registry::global().is_base_of(K::TYPE_ID, type_id)
}

fn downcast_payload<T: ObjectType>(obj: &dyn Object) -> Option<&T> {
    let any: &dyn Any = obj;
    any.downcast_ref::<T>()
}

fn downcast_payload_mut<T: ObjectType>(obj: &mut dyn Object) -> Option<&mut T> {
    let any: &mut dyn Any = obj;
    any.downcast_mut::<T>()
}

#[cold]
#[track_caller]
fn kind_violation() -> ! {
    panic!("object handle holds a payload of another concrete type")
}

impl<K: ?Sized + ObjectKind> Clone for ObjPtr<K> {
    #[inline]
    fn clone(&self) -> Self {
        Self::from_inner(self.inner.clone())
    }
}

impl<K: ?Sized + ObjectKind> Default for ObjPtr<K> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<K: ?Sized + ObjectKind> PartialEq for ObjPtr<K> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<K: ?Sized + ObjectKind> Eq for ObjPtr<K> {}

impl<K: ?Sized + ObjectKind> Hash for ObjPtr<K> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<K: ?Sized + ObjectKind> fmt::Debug for ObjPtr<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "ObjPtr<{}>(null)", K::NAME);
        }
        write!(f, "ObjPtr<{}>(type {}, {:p})", K::NAME, self.type_tag(), self.inner)
    }
}

// -----------------------------------------------------------------------------
// ObjWeak

/// A weak handle to a polymorphic object.
///
/// Upgrading yields an [`ObjPtr<K>`] while the target has strong owners.
pub struct ObjWeak<K: ?Sized + ObjectKind = dyn Object> {
    inner: Weak<dyn Object>,
    _kind: PhantomData<fn() -> *const K>,
}

impl<K: ?Sized + ObjectKind> ObjWeak<K> {
    #[inline]
    const fn from_inner(inner: Weak<dyn Object>) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    /// Creates an empty handle.
    #[inline]
    pub const fn null() -> Self {
        Self::from_inner(Weak::null())
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.inner.is_null()
    }

    /// Returns `true` while the target has strong owners.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Tries to obtain a strong handle, null once the target is gone.
    #[inline]
    pub fn upgrade(&self) -> ObjPtr<K> {
        ObjPtr::from_inner(self.inner.upgrade())
    }

    /// The runtime type id of the target, `0` for a null handle.
    #[inline]
    pub fn type_tag(&self) -> u16 {
        tag_to_id(self.inner.tag())
    }

    #[inline]
    pub fn strong_count(&self) -> u32 {
        self.inner.strong_count()
    }

    #[inline]
    pub fn weak_count(&self) -> u32 {
        self.inner.weak_count()
    }

    #[inline]
    pub fn addr(&self) -> usize {
        self.inner.addr()
    }

    /// Returns `true` if the handle observes the target of `strong`.
    #[inline]
    pub fn points_to<K2: ?Sized + ObjectKind>(&self, strong: &ObjPtr<K2>) -> bool {
        !self.is_null() && self.addr() == strong.addr()
    }

    /// The underlying handle.
    #[inline]
    pub fn as_weak(&self) -> &Weak<dyn Object> {
        &self.inner
    }

    #[inline]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Observes the target of `strong`.
    #[inline]
    pub fn assign(&mut self, strong: &ObjPtr<K>) {
        self.inner.assign(&strong.inner);
    }

    /// Observes an object already known to satisfy `K`.
    #[inline]
    pub(crate) fn set_object(&mut self, object: &ObjPtr) {
        self.inner.assign(&object.inner);
    }
}

impl<K: ?Sized + ObjectKind> Clone for ObjWeak<K> {
    #[inline]
    fn clone(&self) -> Self {
        Self::from_inner(self.inner.clone())
    }
}

impl<K: ?Sized + ObjectKind> Default for ObjWeak<K> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<K: ?Sized + ObjectKind> PartialEq for ObjWeak<K> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<K: ?Sized + ObjectKind> Eq for ObjWeak<K> {}

impl<K: ?Sized + ObjectKind> Hash for ObjWeak<K> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<K: ?Sized + ObjectKind> fmt::Debug for ObjWeak<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjWeak<{}>({:?})", K::NAME, self.inner)
    }
}

impl<K: ?Sized + ObjectKind> From<&ObjPtr<K>> for ObjWeak<K> {
    #[inline]
    fn from(strong: &ObjPtr<K>) -> Self {
        strong.downgrade()
    }
}
