use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::{self, NonNull};

use alloc::boxed::Box;

// -----------------------------------------------------------------------------
// Header

/// Bookkeeping stored in front of every shared payload.
///
/// The header is never exposed mutably: counts live in [`Cell`]s and the
/// type tag and layout are fixed at allocation time.
pub struct Header {
    strong: Cell<u32>,
    weak: Cell<u32>,
    tag: u32,
    layout: Layout,
}

impl Header {
    /// Number of strong handles.
    #[inline]
    pub fn strong(&self) -> u32 {
        self.strong.get()
    }

    /// Number of weak handles.
    #[inline]
    pub fn weak(&self) -> u32 {
        self.weak.get()
    }

    /// Runtime type tag given at allocation, `0` for untagged payloads.
    #[inline]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    #[inline]
    pub(crate) fn inc_strong(&self) {
        self.strong.set(self.strong.get() + 1);
    }

    #[inline]
    pub(crate) fn inc_weak(&self) {
        self.weak.set(self.weak.get() + 1);
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("strong", &self.strong.get())
            .field("weak", &self.weak.get())
            .field("tag", &self.tag)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SharedBox

/// The single allocation behind a [`Strong`](crate::Strong) /
/// [`Weak`](crate::Weak) pair.
///
/// `SharedBox<T>` unsizes to `SharedBox<dyn Trait>` whenever `T: Trait`, so a
/// raw `NonNull<SharedBox<T>>` coerces to a trait-object block.
#[repr(C)]
pub struct SharedBox<T: ?Sized> {
    header: Header,
    value: RefCell<T>,
}

impl<T> SharedBox<T> {
    /// Allocates a block with one strong count and no weak count.
    pub(crate) fn allocate(value: T, tag: u32) -> NonNull<SharedBox<T>> {
        let boxed = Box::new(SharedBox {
            header: Header {
                strong: Cell::new(1),
                weak: Cell::new(0),
                tag,
                layout: Layout::new::<SharedBox<T>>(),
            },
            value: RefCell::new(value),
        });
        NonNull::from(Box::leak(boxed))
    }
}

impl<T: ?Sized> SharedBox<T> {
    /// Returns the header of the block.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the payload cell.
    #[inline]
    pub fn value(&self) -> &RefCell<T> {
        &self.value
    }
}

// -----------------------------------------------------------------------------
// Raw release

/// Returns the header of a block without touching the payload.
///
/// # Safety
///
/// The block must still be allocated, i.e. the caller owns a strong or weak
/// count of it.
#[inline]
pub(crate) unsafe fn header_of<'a, T: ?Sized>(ptr: NonNull<SharedBox<T>>) -> &'a Header {
    // SAFETY: the allocation is live, and only the header field is borrowed.
    unsafe { &(*ptr.as_ptr()).header }
}

/// Gives up one strong count.
///
/// Destroys the payload on the last strong count and frees the block when no
/// weak count remains.
///
/// # Safety
///
/// The caller must own one strong count of `ptr` and must not use it again.
pub(crate) unsafe fn release_strong<T: ?Sized>(ptr: NonNull<SharedBox<T>>) {
    // SAFETY: the caller owns a strong count.
    let header = unsafe { header_of(ptr) };
    let strong = header.strong.get();
    if strong > 1 {
        header.strong.set(strong - 1);
        return;
    }

    // The payload may release weak handles to its own block while it drops.
    // The extra weak count keeps the block allocated until the drop is over,
    // and the zero strong count makes every upgrade fail meanwhile.
    header.strong.set(0);
    header.inc_weak();

    // SAFETY: this was the last strong count, nobody can borrow the payload.
    unsafe {
        ptr::drop_in_place(&raw mut (*ptr.as_ptr()).value);
    }

    // SAFETY: we took a weak count above.
    unsafe { release_weak(ptr) }
}

/// Gives up one weak count, freeing the block when it was the last count of
/// any kind.
///
/// # Safety
///
/// The caller must own one weak count of `ptr` and must not use it again.
pub(crate) unsafe fn release_weak<T: ?Sized>(ptr: NonNull<SharedBox<T>>) {
    // SAFETY: the caller owns a weak count.
    let header = unsafe { header_of(ptr) };
    let weak = header.weak.get() - 1;
    header.weak.set(weak);
    if weak == 0 && header.strong.get() == 0 {
        let layout = header.layout;
        // SAFETY: the block came from `Box<SharedBox<T>>` with this layout
        // and no handle refers to it anymore.
        unsafe {
            alloc::alloc::dealloc(ptr.cast::<u8>().as_ptr(), layout);
        }
    }
}

/// Gives up one strong count without destroying the payload.
///
/// Returns `false` and does nothing when the count is the last one.
///
/// # Safety
///
/// The caller must own one strong count of `ptr`. On `true` the count is
/// consumed and `ptr` must not be used again.
pub(crate) unsafe fn detach_strong<T: ?Sized>(ptr: NonNull<SharedBox<T>>) -> bool {
    // SAFETY: the caller owns a strong count.
    let header = unsafe { header_of(ptr) };
    let strong = header.strong.get();
    if strong > 1 {
        header.strong.set(strong - 1);
        true
    } else {
        false
    }
}
