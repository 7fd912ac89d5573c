use alloc::collections::{BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};

use super::utils::{append_seq, check_seq, clone_new, read_count, read_new, write_seq};
use crate::{Codec, Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// Vec, VecDeque

// Elements already present are read and cloned in place, so objects they
// point at can be reused.
macro_rules! impl_list {
    ($ty:ident, $push:ident) => {
        impl<T: Codec + Default> Codec for $ty<T> {
            fn write_data(&self, ctx: &mut Context, data: &mut Data) {
                write_seq(ctx, data, self.len(), self.iter());
            }

            fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                let count = read_count::<T>(reader)?;
                self.truncate(count);
                for item in self.iter_mut() {
                    item.read_data(ctx, reader)?;
                }
                self.reserve(count - self.len());
                while self.len() < count {
                    self.$push(read_new(ctx, reader)?);
                }
                Ok(())
            }

            #[inline]
            fn append_text(&self, ctx: &mut Context, out: &mut String) {
                append_seq(ctx, out, self.iter());
            }

            fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
                target.truncate(self.len());
                for (source, slot) in self.iter().zip(target.iter_mut()) {
                    source.clone_data(ctx, slot);
                }
                let done = target.len();
                for source in self.iter().skip(done) {
                    target.$push(clone_new(ctx, source));
                }
            }

            #[inline]
            fn recursive_check(&self, ctx: &mut Context) -> u32 {
                check_seq(ctx, self.iter())
            }

            fn recursive_reset(&mut self, ctx: &mut Context) {
                for item in self.iter_mut() {
                    item.recursive_reset(ctx);
                }
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                self.clear();
            }
        }
    };
}

impl_list!(Vec, push);
impl_list!(VecDeque, push_back);

// -----------------------------------------------------------------------------
// Sets

// Set elements are immutable in place, so reads and clones rebuild the set
// and cycle breaking cannot reach into them.
macro_rules! impl_set {
    ($ty:ty, [$($bound:tt)*], [$($extra:tt)*]) => {
        impl<T: Codec + Default + $($bound)* $($extra)*> Codec for $ty {
            fn write_data(&self, ctx: &mut Context, data: &mut Data) {
                write_seq(ctx, data, self.len(), self.iter());
            }

            fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                let count = read_count::<T>(reader)?;
                self.clear();
                for _ in 0..count {
                    self.insert(read_new(ctx, reader)?);
                }
                Ok(())
            }

            #[inline]
            fn append_text(&self, ctx: &mut Context, out: &mut String) {
                append_seq(ctx, out, self.iter());
            }

            fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
                target.clear();
                for source in self {
                    target.insert(clone_new(ctx, source));
                }
            }

            #[inline]
            fn recursive_check(&self, ctx: &mut Context) -> u32 {
                check_seq(ctx, self.iter())
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                self.clear();
            }
        }
    };
}

impl_set!(BTreeSet<T>, [Ord], []);
impl_set!(std::collections::HashSet<T, S>, [Eq + Hash], [, S: BuildHasher + Default]);
impl_set!(og_utils::hash::hashbrown::HashSet<T, S>, [Eq + Hash], [, S: BuildHasher + Default]);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeSet, VecDeque};

    use og_utils::hash::HashSet;

    use crate::{Context, Data, ReadError};

    #[test]
    fn list_read_resizes() {
        let mut ctx = Context::new();
        let mut data = Data::new();
        ctx.write_to(&mut data, &vec![1_u16, 2, 3]);
        assert_eq!(data.as_slice(), &[3, 1, 2, 3]);

        let mut longer = vec![9_u16; 5];
        ctx.read_from(&mut data.reader(), &mut longer).unwrap();
        assert_eq!(longer, [1, 2, 3]);

        let mut shorter = VecDeque::from([7_u16]);
        ctx.read_from(&mut data.reader(), &mut shorter).unwrap();
        assert_eq!(shorter, [1, 2, 3]);
    }

    #[test]
    fn count_checked_before_allocation() {
        let mut ctx = Context::new();
        let mut list = Vec::<u32>::new();
        let err = ctx
            .read_from(&mut Data::from(vec![0xFF, 0xFF, 0xFF, 0x7F, 1]).reader(), &mut list)
            .unwrap_err();
        assert!(matches!(err, ReadError::BufferExhausted { remaining: 1, .. }));
        assert!(list.is_empty());

        // Units encode to nothing but still count one byte each.
        let mut units = Vec::<()>::new();
        let err = ctx.read_from(&mut Data::from(vec![3]).reader(), &mut units).unwrap_err();
        assert!(matches!(err, ReadError::BufferExhausted { needed: 3, remaining: 0 }));
        assert!(units.is_empty());
    }

    #[test]
    fn sets() {
        let mut ctx = Context::new();
        let source: BTreeSet<i32> = [3, -1, 2].into_iter().collect();
        assert_eq!(ctx.stringify(&source), "[-1,2,3]");

        let mut data = Data::new();
        ctx.write_to(&mut data, &source);
        let mut back = HashSet::<i32>::default();
        ctx.read_from(&mut data.reader(), &mut back).unwrap();
        assert_eq!(back.len(), 3);
        assert!(back.contains(&-1));

        let copy = ctx.clone_of(&back);
        assert_eq!(copy, back);
    }
}
