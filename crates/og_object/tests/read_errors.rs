//! Every failure of a binary read, and the state left behind.

use og_object::{Codec, Context, Data, DataReader, ObjPtr, Object, ObjectKind, ReadError, registry};

struct Shape;

impl ObjectKind for Shape {
    const TYPE_ID: u16 = 20;
    const PARENT_ID: u16 = 0;
    const NAME: &'static str = "Shape";
}

#[derive(Object, Default)]
#[object(id = 21, parent = Shape)]
struct Circle {
    radius: f32,
}

#[derive(Object, Default)]
#[object(id = 22, parent = Shape)]
struct Square {
    side: u32,
}

#[derive(Codec, Default)]
struct Scratch {
    #[codec(skip)]
    note: String,
}

fn setup() {
    registry::register_kind::<Shape>();
    registry::register::<Circle>();
    registry::register::<Square>();
}

fn read_bytes<T: Codec>(ctx: &mut Context, bytes: &[u8], value: &mut T) -> Result<(), ReadError> {
    let result = ctx.read_from(&mut DataReader::new(bytes), value);
    assert!(ctx.is_idle());
    result
}

// -----------------------------------------------------------------------------
// Type errors

#[test]
fn unknown_type() {
    setup();
    let mut ctx = Context::new();
    let mut root: ObjPtr = ObjPtr::null();
    let err = read_bytes(&mut ctx, &[99], &mut root).unwrap_err();
    assert_eq!(err, ReadError::UnknownType { type_id: 99 });
    assert_eq!(err.code(), 2);
    assert!(err.to_string().contains("99"));
}

#[test]
fn abstract_kind_is_not_constructible() {
    setup();
    let mut ctx = Context::new();
    let mut root = ObjPtr::<Shape>::null();
    let err = read_bytes(&mut ctx, &[20], &mut root).unwrap_err();
    assert_eq!(err, ReadError::UnknownType { type_id: 20 });
}

#[test]
fn definition_outside_the_declared_kind() {
    setup();
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &ObjPtr::new(Square { side: 3 }));

    let mut circle = ObjPtr::<Circle>::null();
    let err = read_bytes(&mut ctx, data.as_slice(), &mut circle).unwrap_err();
    assert_eq!(
        err,
        ReadError::TypeMismatch {
            expected: 21,
            found: 22
        }
    );
    assert_eq!(err.code(), 3);
    assert!(circle.is_null());

    let mut shape = ObjPtr::<Shape>::null();
    read_bytes(&mut ctx, data.as_slice(), &mut shape).unwrap();
    assert_eq!(shape.type_tag(), 22);
}

#[test]
fn back_reference_outside_the_declared_kind() {
    setup();
    let square = ObjPtr::make(Square { side: 3 });
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &(square.clone(), square));
    assert_eq!(data.as_slice(), &[1, 22, 3, 1]);

    let mut pair: (ObjPtr, ObjPtr<Circle>) = (ObjPtr::null(), ObjPtr::null());
    let err = read_bytes(&mut ctx, data.as_slice(), &mut pair).unwrap_err();
    assert_eq!(
        err,
        ReadError::TypeMismatch {
            expected: 21,
            found: 22
        }
    );
    // The first element was decoded before the failure.
    assert_eq!(pair.0.type_tag(), 22);
}

// -----------------------------------------------------------------------------
// Structural errors

#[test]
fn reference_past_the_defined_objects() {
    setup();
    let mut ctx = Context::new();
    let mut slot: (ObjPtr,) = (ObjPtr::null(),);
    let err = read_bytes(&mut ctx, &[5], &mut slot).unwrap_err();
    assert_eq!(err, ReadError::InvalidReference { index: 5, defined: 0 });
    assert_eq!(err.code(), 5);
}

#[test]
fn truncated_input() {
    setup();
    let mut ctx = Context::new();
    let mut data = Data::new();
    ctx.write_to(&mut data, &ObjPtr::new(Circle { radius: 1.5 }));
    assert_eq!(data.len(), 5);

    let mut root: ObjPtr = ObjPtr::null();
    let err = read_bytes(&mut ctx, &data.as_slice()[..3], &mut root).unwrap_err();
    assert_eq!(
        err,
        ReadError::BufferExhausted {
            needed: 4,
            remaining: 2
        }
    );
    assert_eq!(err.code(), 1);

    let err = read_bytes(&mut ctx, &[], &mut root).unwrap_err();
    assert_eq!(err.code(), 1);
}

#[test]
fn declared_count_larger_than_input() {
    let mut ctx = Context::new();
    let mut list: Vec<u32> = vec![1, 2];
    let err = read_bytes(&mut ctx, &[0xE8, 0x07, 1, 2], &mut list).unwrap_err();
    assert!(matches!(err, ReadError::BufferExhausted { needed: 1000, .. }));
}

#[test]
fn declared_count_of_empty_elements() {
    let mut ctx = Context::new();
    assert_eq!(<Scratch as Codec>::MIN_WIRE_SIZE, 0);

    let mut list: Vec<Scratch> = Vec::new();
    let huge = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x01];
    let err = read_bytes(&mut ctx, &huge, &mut list).unwrap_err();
    assert_eq!(
        err,
        ReadError::BufferExhausted {
            needed: u32::MAX as usize,
            remaining: 1
        }
    );
    assert!(list.is_empty());

    let mut units: Vec<()> = Vec::new();
    let err = read_bytes(&mut ctx, &[3], &mut units).unwrap_err();
    assert_eq!(err.code(), 1);
    read_bytes(&mut ctx, &[1, 0], &mut units).unwrap();
    assert_eq!(units.len(), 1);
}

#[test]
fn malformed_scalars() {
    let mut ctx = Context::new();

    let mut flag = false;
    let err = read_bytes(&mut ctx, &[2], &mut flag).unwrap_err();
    assert_eq!(err, ReadError::MalformedScalar);
    assert_eq!(err.code(), 4);

    let mut small = 0_u8;
    let mut wide = 0_u16;
    read_bytes(&mut ctx, &[0xFF], &mut small).unwrap();
    assert_eq!(small, 0xFF);
    let err = read_bytes(&mut ctx, &[0x80, 0x80, 0x04], &mut wide).unwrap_err();
    assert_eq!(err, ReadError::MalformedScalar);

    let mut long = 0_u64;
    let overlong = [0xFF; 11];
    let err = read_bytes(&mut ctx, &overlong, &mut long).unwrap_err();
    assert_eq!(err, ReadError::MalformedScalar);
}

#[test]
fn invalid_utf8() {
    let mut ctx = Context::new();
    let mut text = String::from("kept");
    let err = read_bytes(&mut ctx, &[2, 0xC3, 0x28], &mut text).unwrap_err();
    assert_eq!(err, ReadError::InvalidUtf8);
    assert_eq!(err.code(), 6);
}

// -----------------------------------------------------------------------------
// Recovery

#[test]
fn context_is_reusable_after_failure() {
    setup();
    let mut ctx = Context::new();
    let mut root: ObjPtr = ObjPtr::null();
    let err = read_bytes(&mut ctx, &[1, 22, 3, 9], &mut (root.clone(), root.clone())).unwrap_err();
    assert_eq!(err, ReadError::InvalidReference { index: 9, defined: 1 });

    let mut data = Data::new();
    ctx.write_to(&mut data, &ObjPtr::new(Square { side: 7 }));
    read_bytes(&mut ctx, data.as_slice(), &mut root).unwrap();
    assert_eq!(root.downcast_ref::<Square>().unwrap().side, 7);
}
