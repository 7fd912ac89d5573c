use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use og_ptr::Strong;
use og_utils::hash::hashbrown::hash_map::Entry;
use og_utils::hash::{HashMap, HashSet};

use crate::registry;
use crate::{Codec, Data, DataReader, ObjPtr, ObjWeak, Object, ObjectKind, ReadError};

// -----------------------------------------------------------------------------
// Visit

/// Result of marking a shared block during a walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Visit {
    /// First time in this call, the block got this 1-based index.
    First(u32),
    /// Already seen under this index.
    Seen(u32),
}

// -----------------------------------------------------------------------------
// Context

/// The long-lived host of the graph algorithms.
///
/// A context owns the transient bookkeeping of one top-level operation:
///
/// - `visited`: block address to 1-based visit index, in first-seen order.
/// - `objects`: the reconstruction list of Read, and the source index to
///   clone table of Clone.
/// - `pending` / `reachable`: weak link resolution of Clone.
///
/// Every entry point clears all of it before returning, so one context can
/// serve any number of unrelated graphs. Entry points called again from
/// inside an object implementation behave like member calls and leave the
/// clearing to the outermost call.
///
/// A context is not `Send`: it holds handles while a walk is running.
///
/// # Examples
///
/// ```
/// use og_object::{Context, Data};
///
/// let mut ctx = Context::new();
/// let mut data = Data::new();
/// ctx.write_to(&mut data, &(7_u32, String::from("hi")));
///
/// let mut back = (0_u32, String::new());
/// ctx.read_from(&mut data.reader(), &mut back).unwrap();
/// assert_eq!(back, (7, String::from("hi")));
/// assert_eq!(ctx.stringify(&back), r#"[7,"hi"]"#);
/// ```
#[derive(Default)]
pub struct Context {
    visited: HashMap<usize, u32>,
    objects: Vec<ObjPtr>,
    pending: HashMap<usize, ObjPtr>,
    reachable: HashSet<usize>,
    collecting: bool,
    depth: u32,
}

impl Context {
    /// Creates an idle context.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no operation is running and no bookkeeping is left.
    pub fn is_idle(&self) -> bool {
        self.depth == 0
            && self.visited.is_empty()
            && self.objects.is_empty()
            && self.pending.is_empty()
            && self.reachable.is_empty()
    }

    /// Drops all bookkeeping.
    ///
    /// Only needed after a walk was unwound by a panic.
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "{} weak clone targets were never reached by a strong handle",
                self.pending.len(),
            );
        }
        self.visited.clear();
        self.objects.clear();
        self.pending.clear();
        self.reachable.clear();
        self.collecting = false;
        self.depth = 0;
    }

    #[inline]
    fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
        if self.depth == 0 {
            self.clear();
        }
    }

    // -------------------------------------------------------------------------
    // Entry points

    /// Appends the binary form of `value` to `data`.
    pub fn write_to<T: Codec>(&mut self, data: &mut Data, value: &T) {
        if self.enter() {
            value.write_root(self, data);
        } else {
            value.write_data(self, data);
        }
        self.leave();
    }

    /// Clears `data`, then writes `value` into it.
    pub fn clear_and_write_to<T: Codec>(&mut self, data: &mut Data, value: &T) {
        data.clear();
        self.write_to(data, value);
    }

    /// Decodes `value` in place from `reader`.
    ///
    /// Existing polymorphic objects of matching type are overwritten instead
    /// of reallocated.
    pub fn read_from<T: Codec>(
        &mut self,
        reader: &mut DataReader<'_>,
        value: &mut T,
    ) -> Result<(), ReadError> {
        let result = if self.enter() {
            value.read_root(self, reader)
        } else {
            value.read_data(self, reader)
        };
        if let Err(err) = &result {
            log::trace!("read stopped at byte {}: {err}", reader.offset());
        }
        self.leave();
        result
    }

    /// Appends the text form of `value` to `out`.
    ///
    /// A polymorphic object met again renders as its bare visit index, the
    /// text is meant for diagnostics.
    pub fn append_to<T: Codec>(&mut self, out: &mut String, value: &T) {
        self.enter();
        value.append_text(self, out);
        self.leave();
    }

    /// Returns the text form of `value`.
    pub fn stringify<T: Codec>(&mut self, value: &T) -> String {
        let mut out = String::new();
        self.append_to(&mut out, value);
        out
    }

    /// Deep-copies `source` into `target`.
    ///
    /// Shared objects stay shared and cycles stay cycles in the copy. A weak
    /// handle observes the copy of its target when the target is reachable
    /// from `source` through strong handles, and the original target
    /// otherwise.
    pub fn clone_to<T: Codec>(&mut self, source: &T, target: &mut T) {
        if self.enter() {
            self.collecting = true;
            source.recursive_check(self);
            self.collecting = false;
            self.reachable.extend(self.visited.drain().map(|(addr, _)| addr));
        }
        source.clone_data(self, target);
        self.leave();
    }

    /// Returns a deep copy of `source`, see [`clone_to`](Context::clone_to).
    pub fn clone_of<T: Codec + Default>(&mut self, source: &T) -> T {
        let mut target = T::default();
        self.clone_to(source, &mut target);
        target
    }

    /// Returns the visit index of the first strong handle reached twice,
    /// `0` if the strong handles below `value` form a tree.
    pub fn has_recursive<T: Codec>(&mut self, value: &T) -> u32 {
        self.enter();
        let index = value.recursive_check(self);
        self.leave();
        index
    }

    /// Breaks the strong cycles below `value`.
    ///
    /// Every strong handle reached a second time gives up its count without
    /// running a destructor and becomes null. Dropping the outside owners
    /// afterwards frees the whole structure.
    pub fn kill_recursive<T: Codec>(&mut self, value: &mut T) {
        self.enter();
        value.recursive_reset(self);
        self.leave();
    }

    /// Resets `value` to its empty state.
    pub fn set_default<T: Codec>(&mut self, value: &mut T) {
        self.enter();
        value.set_default_value(self);
        self.leave();
    }

    // -------------------------------------------------------------------------
    // Member calls

    /// Writes a member, sharing the running walk's state.
    #[inline]
    pub fn write<T: Codec>(&mut self, data: &mut Data, value: &T) {
        value.write_data(self, data);
    }

    /// Reads a member, sharing the running walk's state.
    #[inline]
    pub fn read<T: Codec>(
        &mut self,
        reader: &mut DataReader<'_>,
        value: &mut T,
    ) -> Result<(), ReadError> {
        value.read_data(self, reader)
    }

    /// Appends a member, sharing the running walk's state.
    #[inline]
    pub fn append<T: Codec>(&mut self, out: &mut String, value: &T) {
        value.append_text(self, out);
    }

    /// Clones a member, sharing the running walk's state.
    #[inline]
    pub fn clone_into<T: Codec>(&mut self, source: &T, target: &mut T) {
        source.clone_data(self, target);
    }

    /// Checks a member, sharing the running walk's state.
    #[inline]
    pub fn check<T: Codec>(&mut self, value: &T) -> u32 {
        value.recursive_check(self)
    }

    /// Breaks cycles below a member, sharing the running walk's state.
    #[inline]
    pub fn reset<T: Codec>(&mut self, value: &mut T) {
        value.recursive_reset(self);
    }

    /// Resets a member to its empty state.
    #[inline]
    pub fn default_value<T: Codec>(&mut self, value: &mut T) {
        value.set_default_value(self);
    }

    // -------------------------------------------------------------------------
    // Bookkeeping

    fn visit(&mut self, addr: usize) -> Visit {
        let next = u32::try_from(self.visited.len() + 1).unwrap_or(u32::MAX);
        match self.visited.entry(addr) {
            Entry::Occupied(entry) => Visit::Seen(*entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(next);
                Visit::First(next)
            }
        }
    }

    #[inline]
    fn object_at(&self, index: u32) -> Option<&ObjPtr> {
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        self.objects.get(slot)
    }

    #[inline]
    fn object_count(&self) -> u32 {
        u32::try_from(self.objects.len()).unwrap_or(u32::MAX)
    }

    // -------------------------------------------------------------------------
    // Polymorphic handles

    pub(crate) fn write_handle(&mut self, data: &mut Data, handle: &Strong<dyn Object>) {
        if handle.is_null() {
            data.write_u8(0);
            return;
        }
        match self.visit(handle.addr()) {
            Visit::Seen(index) => data.write_var_u64(u64::from(index)),
            Visit::First(index) => {
                data.write_var_u64(u64::from(index));
                data.write_var_u64(u64::from(handle.tag()));
                handle.borrow().write(self, data);
            }
        }
    }

    /// The root omits its visit index, it is always `1`.
    pub(crate) fn write_root_handle(&mut self, data: &mut Data, handle: &Strong<dyn Object>) {
        if handle.is_null() {
            data.write_u8(0);
            return;
        }
        let tag = handle.tag();
        data.write_var_u64(u64::from(tag));
        if !is_trivial(tag) {
            self.visit(handle.addr());
        }
        handle.borrow().write(self, data);
    }

    pub(crate) fn read_handle<K: ?Sized + ObjectKind>(
        &mut self,
        reader: &mut DataReader<'_>,
        slot: &mut ObjPtr<K>,
    ) -> Result<(), ReadError> {
        let index = reader.read_var::<u32>()?;
        if index == 0 {
            slot.reset();
            return Ok(());
        }

        let defined = self.object_count();
        if index == defined.saturating_add(1) {
            let type_id = reader.read_var::<u16>()?;
            return self.define_object(reader, type_id, slot, true);
        }

        let Some(object) = self.object_at(index) else {
            return Err(ReadError::InvalidReference { index, defined });
        };
        let found = object.type_tag();
        if !registry::global().is_base_of(K::TYPE_ID, found) {
            return Err(ReadError::TypeMismatch {
                expected: K::TYPE_ID,
                found,
            });
        }
        slot.set_object(object);
        Ok(())
    }

    pub(crate) fn read_root_handle<K: ?Sized + ObjectKind>(
        &mut self,
        reader: &mut DataReader<'_>,
        slot: &mut ObjPtr<K>,
    ) -> Result<(), ReadError> {
        let type_id = reader.read_var::<u16>()?;
        if type_id == 0 {
            slot.reset();
            return Ok(());
        }
        self.define_object(reader, type_id, slot, false)
    }

    fn define_object<K: ?Sized + ObjectKind>(
        &mut self,
        reader: &mut DataReader<'_>,
        type_id: u16,
        slot: &mut ObjPtr<K>,
        nested: bool,
    ) -> Result<(), ReadError> {
        let (target, trivial) = {
            let registry = registry::global();
            let Some(entry) = registry.get(type_id) else {
                return Err(ReadError::UnknownType { type_id });
            };
            if !registry.is_base_of(K::TYPE_ID, type_id) {
                return Err(ReadError::TypeMismatch {
                    expected: K::TYPE_ID,
                    found: type_id,
                });
            }
            // Overwrite the current object in place unless an earlier
            // definition of this call already claimed it.
            let reuse = slot.type_tag() == type_id
                && !self.visited.contains_key(&slot.addr())
                && slot.try_borrow_object_mut().is_some();
            let target = if reuse {
                slot.to_object()
            } else {
                registry.create(type_id)
            };
            (target, entry.is_trivial())
        };
        if target.is_null() {
            return Err(ReadError::UnknownType { type_id });
        }

        if nested || !trivial {
            let index = self.object_count().saturating_add(1);
            self.visited.insert(target.addr(), index);
            self.objects.push(target.clone());
        }
        slot.set_object(&target);

        let mut object = target.borrow_object_mut();
        object.read(self, reader)
    }

    pub(crate) fn append_handle(&mut self, out: &mut String, handle: &Strong<dyn Object>) {
        if handle.is_null() {
            out.push_str("null");
            return;
        }
        match self.visit(handle.addr()) {
            Visit::Seen(index) => {
                let _ = write!(out, "{index}");
            }
            Visit::First(_) => handle.borrow().append(self, out),
        }
    }

    pub(crate) fn clone_handle<K: ?Sized + ObjectKind>(
        &mut self,
        source: &ObjPtr<K>,
        target: &mut ObjPtr<K>,
    ) {
        if source.is_null() {
            target.reset();
            return;
        }
        let addr = source.addr();
        if let Some(&index) = self.visited.get(&addr) {
            if let Some(copy) = self.object_at(index) {
                target.set_object(copy);
            }
            return;
        }

        let copy = match self.pending.remove(&addr) {
            Some(copy) => copy,
            None if self.can_reuse(source, target) => target.to_object(),
            None => source.borrow_object().create_default(),
        };
        self.visit(addr);
        self.objects.push(copy.clone());
        target.set_object(&copy);

        let original = source.borrow_object();
        let mut object = copy.borrow_object_mut();
        original.clone_to(self, &mut *object);
    }

    /// A target object owned by nothing but its slot, and unknown to the
    /// source graph, can be overwritten by the copy.
    fn can_reuse<K: ?Sized + ObjectKind>(&self, source: &ObjPtr<K>, target: &ObjPtr<K>) -> bool {
        target.type_tag() == source.type_tag()
            && target.strong_count() == 1
            && !self.reachable.contains(&target.addr())
            && target.try_borrow_object_mut().is_some()
    }

    // -------------------------------------------------------------------------
    // Polymorphic weak handles

    pub(crate) fn write_weak<K: ?Sized + ObjectKind>(&mut self, data: &mut Data, handle: &ObjWeak<K>) {
        let strong = handle.upgrade();
        self.write_handle(data, strong.as_strong());
    }

    pub(crate) fn read_weak<K: ?Sized + ObjectKind>(
        &mut self,
        reader: &mut DataReader<'_>,
        slot: &mut ObjWeak<K>,
    ) -> Result<(), ReadError> {
        // The reconstruction list owns the object until the call ends, by
        // then a strong handle read elsewhere may have adopted it.
        let mut strong = slot.upgrade();
        self.read_handle(reader, &mut strong)?;
        slot.assign(&strong);
        if strong.is_null() {
            slot.reset();
        }
        Ok(())
    }

    pub(crate) fn append_weak<K: ?Sized + ObjectKind>(&mut self, out: &mut String, handle: &ObjWeak<K>) {
        let strong = handle.upgrade();
        self.append_handle(out, strong.as_strong());
    }

    pub(crate) fn clone_weak<K: ?Sized + ObjectKind>(
        &mut self,
        source: &ObjWeak<K>,
        target: &mut ObjWeak<K>,
    ) {
        let strong = source.upgrade();
        if strong.is_null() {
            target.reset();
            return;
        }
        let addr = strong.addr();
        if !self.reachable.contains(&addr) {
            *target = source.clone();
            return;
        }
        let copy = match self.visited.get(&addr) {
            Some(&index) => self.object_at(index).cloned().unwrap_or_default(),
            None => self
                .pending
                .entry(addr)
                .or_insert_with(|| strong.borrow_object().create_default())
                .clone(),
        };
        target.set_object(&copy);
    }

    // -------------------------------------------------------------------------
    // Cycle handling, shared by every strong handle type

    pub(crate) fn check_shared<T: ?Sized>(
        &mut self,
        handle: &Strong<T>,
        check: impl FnOnce(&T, &mut Self) -> u32,
    ) -> u32 {
        if handle.is_null() {
            return 0;
        }
        match self.visit(handle.addr()) {
            Visit::Seen(_) if self.collecting => 0,
            Visit::Seen(index) => index,
            Visit::First(_) => check(&*handle.borrow(), self),
        }
    }

    pub(crate) fn reset_shared<T: ?Sized>(
        &mut self,
        handle: &mut Strong<T>,
        reset: impl FnOnce(&mut T, &mut Self),
    ) {
        if handle.is_null() {
            return;
        }
        match self.visit(handle.addr()) {
            Visit::Seen(_) => {
                handle.detach();
            }
            Visit::First(_) => {
                if let Some(mut value) = handle.try_borrow_mut() {
                    reset(&mut *value, self);
                }
            }
        }
    }
}

#[inline]
fn is_trivial(tag: u32) -> bool {
    u16::try_from(tag).is_ok_and(|type_id| registry::global().is_trivial(type_id))
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth)
            .field("visited", &self.visited.len())
            .field("objects", &self.objects.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
