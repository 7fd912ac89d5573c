//! Generated `Codec` implementations for every supported shape.

use std::collections::BTreeMap;

use og_object::{Codec, Context, Data, ObjPtr, Object, ReadError, registry};

// -----------------------------------------------------------------------------
// Types

#[derive(Codec, Default, Debug, PartialEq)]
struct Pair(u8, String);

#[derive(Codec, Default, Debug, PartialEq)]
struct Marker;

#[derive(Codec, Default, Debug, PartialEq, Clone, Copy)]
#[repr(u8)]
enum Mode {
    #[default]
    Idle = 0,
    Busy = 3,
}

#[derive(Codec, Default, Debug, PartialEq, Clone, Copy)]
enum Level {
    Low = -2,
    #[default]
    Mid = 0,
    High = 300,
}

#[derive(Codec, Default, Debug, PartialEq, Clone, Copy)]
#[repr(u16)]
enum Port {
    #[default]
    Local = 1,
    Remote = 300,
}

#[derive(Codec, Default, Debug, PartialEq)]
struct Wrapper<T> {
    inner: T,
    list: Vec<T>,
}

#[derive(Codec, Default, Debug, PartialEq)]
struct Settings {
    name: String,
    mode: Mode,
    level: Level,
    #[codec(skip)]
    cache: Vec<u8>,
    tags: BTreeMap<String, u32>,
    pos: Option<(i16, i16)>,
}

#[derive(Object, Default, Debug)]
#[object(id = 50, trivial)]
struct Dot {
    x: i32,
}

#[derive(Codec, Default, Debug)]
struct Scene {
    origin: Dot,
    nodes: Vec<ObjPtr>,
    focus: ObjPtr<Dot>,
}

fn write<T: Codec>(value: &T) -> Data {
    let mut data = Data::new();
    Context::new().write_to(&mut data, value);
    data
}

fn read<T: Codec + Default>(data: &Data) -> Result<T, ReadError> {
    let mut value = T::default();
    Context::new().read_from(&mut data.reader(), &mut value)?;
    Ok(value)
}

fn text<T: Codec>(value: &T) -> String {
    Context::new().stringify(value)
}

// -----------------------------------------------------------------------------
// Structs

#[test]
fn tuple_and_unit_structs() {
    let pair = Pair(7, String::from("ab"));
    let data = write(&pair);
    assert_eq!(data.as_slice(), &[7, 2, b'a', b'b']);
    assert_eq!(read::<Pair>(&data).unwrap(), pair);
    assert_eq!(text(&pair), r#"[7,"ab"]"#);
    assert_eq!(<Pair as Codec>::MIN_WIRE_SIZE, 2);

    assert!(write(&Marker).is_empty());
    assert_eq!(text(&Marker), "{}");
    assert_eq!(<Marker as Codec>::MIN_WIRE_SIZE, 0);
}

#[test]
fn generic_struct() {
    let value = Wrapper {
        inner: 5_u16,
        list: vec![1, 2],
    };
    let data = write(&value);
    assert_eq!(data.as_slice(), &[5, 2, 1, 2]);
    assert_eq!(read::<Wrapper<u16>>(&data).unwrap(), value);
    assert_eq!(text(&value), r#"{"inner":5,"list":[1,2]}"#);
    assert_eq!(Context::new().clone_of(&value), value);
}

#[test]
fn skipped_fields_are_untouched() {
    let source = Settings {
        name: String::from("main"),
        mode: Mode::Busy,
        level: Level::High,
        cache: vec![1, 2, 3],
        tags: BTreeMap::from([(String::from("a"), 1)]),
        pos: Some((-1, 4)),
    };
    let data = write(&source);

    let mut back = Settings {
        cache: vec![9],
        ..Settings::default()
    };
    let mut ctx = Context::new();
    ctx.read_from(&mut data.reader(), &mut back).unwrap();
    assert_eq!(back.name, "main");
    assert_eq!(back.mode, Mode::Busy);
    assert_eq!(back.level, Level::High);
    assert_eq!(back.tags, source.tags);
    assert_eq!(back.pos, Some((-1, 4)));
    assert_eq!(back.cache, [9]);

    let mut copy = Settings::default();
    ctx.clone_to(&source, &mut copy);
    assert!(copy.cache.is_empty());
    assert_eq!(copy.tags, source.tags);

    ctx.set_default(&mut back);
    assert!(back.name.is_empty() && back.tags.is_empty());
    assert_eq!(back.pos, None);
    assert_eq!(back.cache, [9]);

    assert_eq!(
        text(&source),
        r#"{"name":"main","mode":3,"level":300,"tags":["a",1],"pos":[-1,4]}"#,
    );
}

// -----------------------------------------------------------------------------
// Enums

#[test]
fn enum_discriminants() {
    assert_eq!(write(&Mode::Busy).as_slice(), &[3]);
    assert_eq!(write(&Level::High).as_slice(), &[0xD8, 0x04]);
    assert_eq!(write(&Level::Low).as_slice(), &[3]);
    assert_eq!(read::<Level>(&write(&Level::Low)).unwrap(), Level::Low);
    assert_eq!(text(&Level::Low), "-2");

    let err = read::<Mode>(&Data::from(vec![1])).unwrap_err();
    assert_eq!(err, ReadError::MalformedScalar);

    // The empty value is the first variant.
    let mut level = Level::High;
    Context::new().set_default(&mut level);
    assert_eq!(level, Level::Low);
}

#[test]
fn unsigned_repr_skips_zigzag() {
    assert_eq!(write(&Port::Local).as_slice(), &[0x01]);
    assert_eq!(write(&Port::Remote).as_slice(), &[0xAC, 0x02]);
    assert_eq!(read::<Port>(&write(&Port::Remote)).unwrap(), Port::Remote);
    assert_eq!(text(&Port::Remote), "300");

    let err = read::<Port>(&Data::from(vec![2])).unwrap_err();
    assert_eq!(err, ReadError::MalformedScalar);
}

// -----------------------------------------------------------------------------
// Objects as fields

#[test]
fn objects_by_value_and_by_handle() {
    registry::register::<Dot>();

    let focus = ObjPtr::new(Dot { x: 2 });
    let scene = Scene {
        origin: Dot { x: 1 },
        nodes: vec![focus.to_object(), ObjPtr::null()],
        focus,
    };
    let data = write(&scene);
    // origin | nodes: count, #1 type 50 x, null | focus -> #1
    assert_eq!(data.as_slice(), &[2, 2, 1, 50, 4, 0, 1]);

    let back = read::<Scene>(&data).unwrap();
    assert_eq!(back.origin.x, 1);
    assert!(back.focus.ptr_eq(&back.nodes[0]));
    assert_eq!(back.focus.borrow().x, 2);
    assert_eq!(back.focus.strong_count(), 2);

    assert_eq!(
        text(&scene),
        r#"{"origin":{"__typeId__":50,"x":1},"nodes":[{"__typeId__":50,"x":2},null],"focus":1}"#,
    );
}
