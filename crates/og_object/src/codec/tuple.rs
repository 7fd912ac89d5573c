use alloc::string::String;

use crate::{Codec, Context, Data, DataReader, ReadError};

// (P0,)  (P0, P1)  ...  (P0, .. P7)

macro_rules! impl_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Codec),+> Codec for ($($name,)+) {
            const MIN_WIRE_SIZE: usize = 0 $(+ $name::MIN_WIRE_SIZE)+;

            fn write_data(&self, ctx: &mut Context, data: &mut Data) {
                $(self.$index.write_data(ctx, data);)+
            }

            fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                $(self.$index.read_data(ctx, reader)?;)+
                Ok(())
            }

            fn append_text(&self, ctx: &mut Context, out: &mut String) {
                out.push('[');
                $(
                    if $index > 0 {
                        out.push(',');
                    }
                    self.$index.append_text(ctx, out);
                )+
                out.push(']');
            }

            fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
                $(self.$index.clone_data(ctx, &mut target.$index);)+
            }

            fn recursive_check(&self, ctx: &mut Context) -> u32 {
                $(
                    let index = self.$index.recursive_check(ctx);
                    if index != 0 {
                        return index;
                    }
                )+
                0
            }

            fn recursive_reset(&mut self, ctx: &mut Context) {
                $(self.$index.recursive_reset(ctx);)+
            }

            fn set_default_value(&mut self, ctx: &mut Context) {
                $(self.$index.set_default_value(ctx);)+
            }
        }
    };
}

impl_tuple!(P0: 0);
impl_tuple!(P0: 0, P1: 1);
impl_tuple!(P0: 0, P1: 1, P2: 2);
impl_tuple!(P0: 0, P1: 1, P2: 2, P3: 3);
impl_tuple!(P0: 0, P1: 1, P2: 2, P3: 3, P4: 4);
impl_tuple!(P0: 0, P1: 1, P2: 2, P3: 3, P4: 4, P5: 5);
impl_tuple!(P0: 0, P1: 1, P2: 2, P3: 3, P4: 4, P5: 5, P6: 6);
impl_tuple!(P0: 0, P1: 1, P2: 2, P3: 3, P4: 4, P5: 5, P6: 6, P7: 7);
