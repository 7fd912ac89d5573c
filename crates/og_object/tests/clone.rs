//! Deep copies of polymorphic graphs.

use og_object::{Context, ObjPtr, ObjWeak, Object, registry};

#[derive(Object, Default)]
#[object(id = 11)]
struct Leaf {
    value: i32,
}

#[derive(Object, Default)]
#[object(id = 12)]
struct Node {
    left: ObjPtr,
    right: ObjPtr,
}

#[derive(Object, Default)]
#[object(id = 13)]
struct Watcher {
    target: ObjWeak,
    owned: ObjPtr,
}

fn setup() {
    registry::register::<Leaf>();
    registry::register::<Node>();
    registry::register::<Watcher>();
}

fn leaf(value: i32) -> ObjPtr {
    ObjPtr::make(Leaf { value })
}

fn value_of(handle: &ObjPtr) -> i32 {
    handle.downcast_ref::<Leaf>().unwrap().value
}

// -----------------------------------------------------------------------------
// Topology

#[test]
fn shared_objects_stay_shared() {
    setup();
    let shared = leaf(5);
    let inner = ObjPtr::make(Node {
        left: shared.clone(),
        right: ObjPtr::null(),
    });
    let source = ObjPtr::new(Node {
        left: shared.clone(),
        right: inner,
    });

    let mut ctx = Context::new();
    let copy = ctx.clone_of(&source);
    assert!(ctx.is_idle());
    assert!(!copy.ptr_eq(&source));

    let root = copy.borrow();
    let right = root.right.downcast_ref::<Node>().unwrap();
    assert!(root.left.ptr_eq(&right.left));
    assert!(!root.left.ptr_eq(&shared));
    assert_eq!(value_of(&root.left), 5);
    assert_eq!(root.left.strong_count(), 2);
    assert_eq!(shared.strong_count(), 3);
}

#[test]
fn cycles_stay_cycles() {
    setup();
    let mut a = ObjPtr::new(Node::default());
    let b = ObjPtr::make(Node {
        left: a.to_object(),
        right: ObjPtr::null(),
    });
    a.borrow_mut().right = b.clone();

    let mut ctx = Context::new();
    let mut copy = ctx.clone_of(&a);
    {
        let root = copy.borrow();
        let other = root.right.downcast_ref::<Node>().unwrap();
        assert!(other.left.ptr_eq(&copy));
        assert!(!root.right.ptr_eq(&b));
    }
    assert_eq!(ctx.has_recursive(&copy), 1);

    ctx.kill_recursive(&mut copy);
    ctx.kill_recursive(&mut a);
}

#[test]
fn handles_inside_containers() {
    setup();
    let shared = leaf(2);
    let source = vec![shared.clone(), leaf(3), shared];

    let mut ctx = Context::new();
    let copy = ctx.clone_of(&source);
    assert_eq!(copy.len(), 3);
    assert!(copy[0].ptr_eq(&copy[2]));
    assert!(!copy[0].ptr_eq(&source[0]));
    assert_eq!(value_of(&copy[1]), 3);
}

// -----------------------------------------------------------------------------
// Weak handles

#[test]
fn weak_to_reachable_object_follows_the_copy() {
    setup();
    let owned = leaf(1);
    let source = ObjPtr::new(Watcher {
        target: owned.downgrade(),
        owned: owned.clone(),
    });

    let mut ctx = Context::new();
    let copy = ctx.clone_of(&source);
    assert!(ctx.is_idle());

    let watcher = copy.borrow();
    assert!(watcher.target.points_to(&watcher.owned));
    assert!(!watcher.owned.ptr_eq(&owned));
    assert_eq!(watcher.owned.strong_count(), 1);
    assert_eq!(value_of(&watcher.owned), 1);
    assert_eq!(owned.weak_count(), 1);
}

#[test]
fn weak_to_outside_object_keeps_the_original() {
    setup();
    let outside = leaf(9);
    let source = ObjPtr::new(Watcher {
        target: outside.downgrade(),
        owned: leaf(1),
    });

    let mut ctx = Context::new();
    let copy = ctx.clone_of(&source);

    assert!(copy.borrow().target.points_to(&outside));
    assert_eq!(outside.weak_count(), 2);
    assert_eq!(outside.strong_count(), 1);
}

#[test]
fn dead_weak_becomes_null() {
    setup();
    let source = ObjPtr::new(Watcher {
        target: leaf(3).downgrade(),
        owned: ObjPtr::null(),
    });
    assert!(!source.borrow().target.is_alive());

    let mut ctx = Context::new();
    let copy = ctx.clone_of(&source);
    assert!(copy.borrow().target.is_null());
    assert!(copy.borrow().owned.is_null());
}

// -----------------------------------------------------------------------------
// Target reuse

#[test]
fn unshared_target_is_overwritten() {
    setup();
    let source = leaf(5);
    let mut target = leaf(0);
    let addr = target.addr();

    let mut ctx = Context::new();
    ctx.clone_to(&source, &mut target);
    assert_eq!(target.addr(), addr);
    assert_eq!(value_of(&target), 5);
}

#[test]
fn shared_target_is_replaced() {
    setup();
    let source = leaf(5);
    let mut target = leaf(0);
    let kept = target.clone();

    let mut ctx = Context::new();
    ctx.clone_to(&source, &mut target);
    assert!(!target.ptr_eq(&kept));
    assert_eq!(value_of(&kept), 0);
    assert_eq!(value_of(&target), 5);

    // A target aliasing the source is never overwritten.
    let mut alias = source.clone();
    ctx.clone_to(&source, &mut alias);
    assert!(!alias.ptr_eq(&source));
    assert_eq!(value_of(&alias), 5);
}

#[test]
fn target_of_another_type_is_replaced() {
    setup();
    let source = leaf(4);
    let mut target = ObjPtr::make(Node::default());

    let mut ctx = Context::new();
    ctx.clone_to(&source, &mut target);
    assert_eq!(target.type_tag(), 11);
    assert_eq!(value_of(&target), 4);

    ctx.clone_to(&ObjPtr::null(), &mut target);
    assert!(target.is_null());
}
