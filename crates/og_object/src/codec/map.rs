use alloc::collections::BTreeMap;
use alloc::string::String;
use core::hash::{BuildHasher, Hash};

use super::utils::{append_map, clone_new, read_new, read_pair_count, write_count};
use crate::{Codec, Context, Data, DataReader, ReadError};

// Values whose key survives a read or clone are overwritten in place, so
// objects they point at can be reused. Keys are immutable, cycle breaking
// only reaches the values.
macro_rules! impl_map {
    ($ty:ty, [$($bound:tt)*], [$($extra:tt)*]) => {
        impl<K: Codec + Default + $($bound)*, V: Codec + Default $($extra)*> Codec for $ty {
            fn write_data(&self, ctx: &mut Context, data: &mut Data) {
                write_count(data, self.len());
                for (key, value) in self {
                    key.write_data(ctx, data);
                    value.write_data(ctx, data);
                }
            }

            fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                let count = read_pair_count::<K, V>(reader)?;
                let mut old = core::mem::take(self);
                for _ in 0..count {
                    let key: K = read_new(ctx, reader)?;
                    let mut value = old.remove(&key).unwrap_or_default();
                    value.read_data(ctx, reader)?;
                    self.insert(key, value);
                }
                Ok(())
            }

            #[inline]
            fn append_text(&self, ctx: &mut Context, out: &mut String) {
                append_map(ctx, out, self.iter());
            }

            fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
                let mut old = core::mem::take(target);
                for (key, value) in self {
                    let key = clone_new(ctx, key);
                    let mut slot = old.remove(&key).unwrap_or_default();
                    value.clone_data(ctx, &mut slot);
                    target.insert(key, slot);
                }
            }

            fn recursive_check(&self, ctx: &mut Context) -> u32 {
                for (key, value) in self {
                    let index = key.recursive_check(ctx);
                    if index != 0 {
                        return index;
                    }
                    let index = value.recursive_check(ctx);
                    if index != 0 {
                        return index;
                    }
                }
                0
            }

            fn recursive_reset(&mut self, ctx: &mut Context) {
                for value in self.values_mut() {
                    value.recursive_reset(ctx);
                }
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                self.clear();
            }
        }
    };
}

impl_map!(BTreeMap<K, V>, [Ord], []);
impl_map!(std::collections::HashMap<K, V, S>, [Eq + Hash], [, S: BuildHasher + Default]);
impl_map!(og_utils::hash::hashbrown::HashMap<K, V, S>, [Eq + Hash], [, S: BuildHasher + Default]);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;

    use og_utils::hash::HashMap;

    use crate::{Context, Data};

    #[test]
    fn pairs() {
        let mut ctx = Context::new();
        let source = BTreeMap::from([(2_u8, String::from("b")), (1, String::from("a"))]);

        let mut data = Data::new();
        ctx.write_to(&mut data, &source);
        assert_eq!(data.as_slice(), &[2, 1, 1, b'a', 2, 1, b'b']);
        assert_eq!(ctx.stringify(&source), r#"[1,"a",2,"b"]"#);

        let mut back = HashMap::<u8, String>::default();
        back.insert(9, String::from("stale"));
        ctx.read_from(&mut data.reader(), &mut back).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[&2], "b");

        let copy = ctx.clone_of(&source);
        assert_eq!(copy, source);
    }
}
