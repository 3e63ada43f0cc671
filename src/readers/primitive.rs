//! Readers for the `System` primitives.

use super::{ContentInput, ReaderTemplate, Value};
use crate::Result;

macro_rules! primitive {
    ($fn_name:ident, $read:ident, $variant:ident) => {
        fn $fn_name(input: &mut ContentInput<'_>) -> Result<Value> {
            input.$read().map(Value::$variant)
        }
    };
}

primitive!(read_boolean, read_bool, Bool);
primitive!(read_sbyte, read_i8, SByte);
primitive!(read_byte, read_u8, Byte);
primitive!(read_int16, read_i16, Int16);
primitive!(read_uint16, read_u16, UInt16);
primitive!(read_int32, read_i32, Int32);
primitive!(read_uint32, read_u32, UInt32);
primitive!(read_int64, read_i64, Int64);
primitive!(read_uint64, read_u64, UInt64);
primitive!(read_single, read_f32, Single);
primitive!(read_double, read_f64, Double);
primitive!(read_char, read_char, Char);
primitive!(read_string, read_string, String);
primitive!(read_time_span, read_i64, TimeSpan);
primitive!(read_date_time, read_u64, DateTime);

pub(crate) static TEMPLATES: &[ReaderTemplate] = &[
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.BooleanReader", "System.Boolean", read_boolean),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.SByteReader", "System.SByte", read_sbyte),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.ByteReader", "System.Byte", read_byte),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Int16Reader", "System.Int16", read_int16),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.UInt16Reader", "System.UInt16", read_uint16),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Int32Reader", "System.Int32", read_int32),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.UInt32Reader", "System.UInt32", read_uint32),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Int64Reader", "System.Int64", read_int64),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.UInt64Reader", "System.UInt64", read_uint64),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.SingleReader", "System.Single", read_single),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.DoubleReader", "System.Double", read_double),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.CharReader", "System.Char", read_char),
    ReaderTemplate::reference("Microsoft.Xna.Framework.Content.StringReader", "System.String", read_string),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.TimeSpanReader", "System.TimeSpan", read_time_span),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.DateTimeReader", "System.DateTime", read_date_time),
];
