//! Write, read, text form and cycle handling over polymorphic graphs.

use std::cell::Cell;
use std::rc::Rc;

use og_object::{Context, Data, ObjPtr, ObjWeak, Object, registry};

// -----------------------------------------------------------------------------
// Types

#[derive(Object, Default)]
#[object(id = 1)]
struct Leaf {
    value: i32,
}

#[derive(Object, Default)]
#[object(id = 2)]
struct Node {
    left: ObjPtr,
    right: ObjPtr,
}

#[derive(Object, Default)]
#[object(id = 3)]
struct Tracked {
    next: ObjPtr,
    #[codec(skip)]
    drops: Option<Rc<Cell<u32>>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.set(drops.get() + 1);
        }
    }
}

#[derive(Object, Default)]
#[object(id = 4, trivial)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Object, Default)]
#[object(id = 5)]
struct Parent {
    child: ObjPtr<Child>,
}

#[derive(Object, Default)]
#[object(id = 6)]
struct Child {
    parent: ObjWeak<Parent>,
    name: String,
}

fn setup() {
    registry::register::<Leaf>();
    registry::register::<Node>();
    registry::register::<Tracked>();
    registry::register::<Point>();
    registry::register::<Parent>();
    registry::register::<Child>();
}

fn leaf(value: i32) -> ObjPtr {
    ObjPtr::make(Leaf { value })
}

fn node(left: ObjPtr, right: ObjPtr) -> ObjPtr {
    ObjPtr::make(Node { left, right })
}

fn tracked(drops: &Rc<Cell<u32>>) -> ObjPtr<Tracked> {
    ObjPtr::new(Tracked {
        next: ObjPtr::null(),
        drops: Some(drops.clone()),
    })
}

/// `n -> (a, n2)`, `n2 -> (a, null)`.
fn shared_leaf_graph() -> ObjPtr {
    let a = leaf(5);
    let n2 = node(a.clone(), ObjPtr::null());
    node(a, n2)
}

// -----------------------------------------------------------------------------
// Write / Read

#[test]
fn shared_leaf_is_written_once() {
    setup();
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &shared_leaf_graph());

    // root: type 2 | left: #2 type 1 value 5 | right: #3 type 2, left -> #2, right null
    assert_eq!(data.as_slice(), &[2, 2, 1, 10, 3, 2, 2, 0]);

    let mut back: ObjPtr = ObjPtr::null();
    ctx.read_from(&mut data.reader(), &mut back).unwrap();

    let root = back.downcast_ref::<Node>().unwrap();
    let right = root.right.downcast_ref::<Node>().unwrap();
    assert!(root.left.ptr_eq(&right.left));
    assert!(right.right.is_null());
    assert_eq!(root.left.downcast_ref::<Leaf>().unwrap().value, 5);
}

#[test]
fn cycle_survives_round_trip() {
    setup();
    let mut a = ObjPtr::new(Node::default());
    let b = node(a.to_object(), ObjPtr::null());
    a.borrow_mut().right = b;

    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &a);

    let mut back = ObjPtr::<Node>::null();
    ctx.read_from(&mut data.reader(), &mut back).unwrap();
    {
        let root = back.borrow();
        let b = root.right.downcast_ref::<Node>().unwrap();
        assert!(b.left.ptr_eq(&back));
        assert!(!b.left.ptr_eq(&a));
    }
    assert_eq!(ctx.has_recursive(&back), 1);

    let weak = back.downgrade();
    ctx.kill_recursive(&mut back);
    drop(back);
    assert!(!weak.is_alive());

    ctx.kill_recursive(&mut a);
    assert_eq!(ctx.has_recursive(&a), 0);
}

#[test]
fn null_root() {
    setup();
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &ObjPtr::<Node>::null());
    assert_eq!(data.as_slice(), &[0]);

    let mut back = ObjPtr::make(Leaf { value: 1 });
    ctx.read_from(&mut data.reader(), &mut back).unwrap();
    assert!(back.is_null());
}

#[test]
fn trivial_root_and_in_place_read() {
    setup();
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &ObjPtr::new(Point { x: 1, y: -1 }));
    assert_eq!(data.as_slice(), &[4, 2, 1]);

    let mut back = ObjPtr::new(Point::default());
    let kept = back.clone();
    ctx.read_from(&mut data.reader(), &mut back).unwrap();
    assert!(back.ptr_eq(&kept));
    assert_eq!((kept.borrow().x, kept.borrow().y), (1, -1));

    let mut other = ObjPtr::make(Leaf { value: 3 });
    ctx.read_from(&mut data.reader(), &mut other).unwrap();
    assert_eq!(other.type_tag(), 4);
}

#[test]
fn weak_back_pointer_round_trip() {
    setup();
    let parent = ObjPtr::new(Parent::default());
    let child = ObjPtr::new(Child {
        parent: parent.downgrade(),
        name: String::from("kid"),
    });
    parent.borrow_mut().child = child;

    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &parent);

    let mut back = ObjPtr::<Parent>::null();
    ctx.read_from(&mut data.reader(), &mut back).unwrap();
    let root = back.borrow();
    let child = root.child.borrow();
    assert_eq!(child.name, "kid");
    assert!(child.parent.points_to(&back));
    assert_eq!(back.strong_count(), 1);
}

// -----------------------------------------------------------------------------
// Text

#[test]
fn text_form_uses_back_references() {
    setup();
    let mut ctx = Context::new();
    assert_eq!(
        ctx.stringify(&shared_leaf_graph()),
        concat!(
            r#"{"__typeId__":2,"left":{"__typeId__":1,"value":5},"#,
            r#""right":{"__typeId__":2,"left":2,"right":null}}"#,
        ),
    );
    assert_eq!(ctx.stringify(&ObjPtr::<Leaf>::null()), "null");
}

// -----------------------------------------------------------------------------
// Cycle handling

#[test]
fn kill_recursive_frees_a_ring() {
    setup();
    let drops = Rc::new(Cell::new(0));
    let mut x = tracked(&drops);
    let y = tracked(&drops);
    let z = tracked(&drops);
    x.borrow_mut().next = y.to_object();
    y.borrow_mut().next = z.to_object();
    z.borrow_mut().next = x.to_object();
    drop((y, z));

    let mut ctx = Context::new();
    assert_eq!(ctx.has_recursive(&x), 1);

    ctx.kill_recursive(&mut x);
    assert_eq!(drops.get(), 0);
    assert_eq!(x.strong_count(), 1);

    drop(x);
    assert_eq!(drops.get(), 3);
}

#[test]
fn kill_recursive_keeps_trees() {
    setup();
    let mut root = shared_leaf_graph();
    let left = root.downcast_ref::<Node>().unwrap().left.clone();

    let mut ctx = Context::new();
    // Sharing is not a cycle, yet the check reports the second visit.
    assert_eq!(ctx.has_recursive(&root), 2);

    // The second owner of the leaf lets go of it, nothing is destroyed.
    ctx.kill_recursive(&mut root);
    assert_eq!(left.strong_count(), 2);
    assert_eq!(left.downcast_ref::<Leaf>().unwrap().value, 5);
}

#[test]
fn self_loop() {
    setup();
    let drops = Rc::new(Cell::new(0));
    let mut solo = tracked(&drops);
    solo.borrow_mut().next = solo.to_object();
    assert_eq!(solo.strong_count(), 2);

    let mut ctx = Context::new();
    ctx.kill_recursive(&mut solo);
    assert!(solo.borrow().next.is_null());
    drop(solo);
    assert_eq!(drops.get(), 1);
}

// -----------------------------------------------------------------------------
// Hygiene

#[test]
fn operations_leave_no_state() {
    setup();
    let graph = shared_leaf_graph();
    let mut ctx = Context::new();

    let mut first = Data::new();
    ctx.write_to(&mut first, &graph);
    assert!(ctx.is_idle());
    let mut second = Data::new();
    ctx.write_to(&mut second, &graph);
    assert_eq!(first, second);

    let text = ctx.stringify(&graph);
    assert_eq!(ctx.stringify(&graph), text);
    assert_eq!(ctx.has_recursive(&graph), 2);
    assert_eq!(ctx.has_recursive(&graph), 2);

    let mut back: ObjPtr = ObjPtr::null();
    ctx.read_from(&mut first.reader(), &mut back).unwrap();
    assert!(ctx.is_idle());
    let _copy = ctx.clone_of(&graph);
    assert!(ctx.is_idle());

    ctx.clear_and_write_to(&mut first, &leaf(1));
    assert_eq!(first.as_slice(), &[1, 2]);
}

#[test]
fn set_default_nulls_handles() {
    setup();
    let mut graph = shared_leaf_graph();
    let mut ctx = Context::new();

    let mut pair = (graph.clone(), 9_u32);
    ctx.set_default(&mut pair);
    assert!(pair.0.is_null());
    assert_eq!(pair.1, 0);

    {
        let mut root = graph.downcast_mut::<Node>().unwrap();
        ctx.set_default(&mut *root);
        assert!(root.left.is_null() && root.right.is_null());
    }
    ctx.set_default(&mut graph);
    assert!(graph.is_null());
}
