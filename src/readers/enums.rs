//! Enum member tables.
//!
//! Enums are stored as a little-endian `i32`. Some enums were renumbered
//! between framework releases; for those the table carries an alternate
//! numbering that applies only to files whose version byte is
//! [`ALTERNATE_VERSION`] (the 4.0 release). Every other version uses the
//! default numbering.

use super::value::EnumValue;
use super::{ContentInput, TypeReader, Value};
use crate::{Error, Result};

/// Format version of the framework release that renumbered enums.
pub const ALTERNATE_VERSION: u8 = 5;

type Members = &'static [(i32, &'static str)];

/// Name tables for one enum type.
#[derive(Debug)]
pub struct EnumDef {
    pub type_name: &'static str,
    pub members: Members,
    /// Numbering used instead of `members` for [`ALTERNATE_VERSION`] files.
    pub alternate: Option<Members>,
}

impl EnumDef {
    /// Name `raw` using the table that applies to format `version`.
    pub fn lookup(&self, raw: i32, version: u8) -> Result<EnumValue> {
        let members = match self.alternate {
            Some(alt) if version == ALTERNATE_VERSION => alt,
            _ => self.members,
        };
        members
            .iter()
            .find(|&&(v, _)| v == raw)
            .map(|&(_, name)| EnumValue {
                type_name: self.type_name,
                raw,
                name,
            })
            .ok_or(Error::UnknownEnumValue {
                type_name: self.type_name,
                value: raw,
            })
    }

    /// Read an `i32` and name it.
    pub fn read(&self, input: &mut ContentInput<'_>) -> Result<EnumValue> {
        let raw = input.read_i32()?;
        self.lookup(raw, input.version())
    }
}

/// Leaf reader for one enum type.
#[derive(Debug)]
pub struct EnumValueReader {
    def: &'static EnumDef,
}

impl EnumValueReader {
    pub fn new(def: &'static EnumDef) -> Self {
        Self { def }
    }
}

impl TypeReader for EnumValueReader {
    fn reader_tag(&self) -> &str {
        self.def.type_name
    }

    fn target_type(&self) -> &str {
        self.def.type_name
    }

    fn is_value_type(&self) -> bool {
        true
    }

    fn is_enum(&self) -> bool {
        true
    }

    fn read(&self, input: &mut ContentInput<'_>) -> Result<Value> {
        self.def.read(input).map(Value::Enum)
    }
}

pub static SURFACE_FORMAT: EnumDef = EnumDef {
    type_name: "Microsoft.Xna.Framework.Graphics.SurfaceFormat",
    members: &[
        (-1, "Unknown"),
        (1, "Color"),
        (2, "Bgr32"),
        (3, "Bgra1010102"),
        (4, "Rgba32"),
        (5, "Rgb32"),
        (6, "Rgba1010102"),
        (7, "Rg32"),
        (8, "Rgba64"),
        (9, "Bgr565"),
        (10, "Bgra5551"),
        (11, "Bgr555"),
        (12, "Bgra4444"),
        (13, "Bgr444"),
        (14, "Bgra2338"),
        (15, "Alpha8"),
        (16, "Bgr233"),
        (17, "Bgr24"),
        (18, "NormalizedByte2"),
        (19, "NormalizedByte4"),
        (20, "NormalizedShort2"),
        (21, "NormalizedShort4"),
        (22, "Single"),
        (23, "Vector2"),
        (24, "Vector4"),
        (25, "HalfSingle"),
        (26, "HalfVector2"),
        (27, "HalfVector4"),
        (28, "Dxt1"),
        (29, "Dxt2"),
        (30, "Dxt3"),
        (31, "Dxt4"),
        (32, "Dxt5"),
        (33, "Luminance8"),
        (34, "Luminance16"),
        (35, "LuminanceAlpha8"),
        (36, "LuminanceAlpha16"),
        (37, "Palette8"),
        (38, "PaletteAlpha16"),
    ],
    alternate: Some(&[
        (0, "Color"),
        (1, "Bgr565"),
        (2, "Bgra5551"),
        (3, "Bgra4444"),
        (4, "Dxt1"),
        (5, "Dxt3"),
        (6, "Dxt5"),
        (7, "NormalizedByte2"),
        (8, "NormalizedByte4"),
        (9, "Rgba1010102"),
        (10, "Rg32"),
        (11, "Rgba64"),
        (12, "Alpha8"),
        (13, "Single"),
        (14, "Vector2"),
        (15, "Vector4"),
        (16, "HalfSingle"),
        (17, "HalfVector2"),
        (18, "HalfVector4"),
        (19, "HdrBlendable"),
    ]),
};

pub static CURVE_LOOP_TYPE: EnumDef = EnumDef {
    type_name: "Microsoft.Xna.Framework.CurveLoopType",
    members: &[
        (0, "Constant"),
        (1, "Cycle"),
        (2, "CycleOffset"),
        (3, "Oscillate"),
        (4, "Linear"),
    ],
    alternate: None,
};

pub static CURVE_CONTINUITY: EnumDef = EnumDef {
    type_name: "Microsoft.Xna.Framework.CurveContinuity",
    members: &[(0, "Smooth"), (1, "Step")],
    alternate: None,
};

pub(crate) static ENUMS: &[&EnumDef] = &[&SURFACE_FORMAT, &CURVE_LOOP_TYPE, &CURVE_CONTINUITY];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_format_renumbering() {
        assert_eq!(SURFACE_FORMAT.lookup(0, 5).expect("4.0 Color").name, "Color");
        assert_eq!(SURFACE_FORMAT.lookup(1, 4).expect("3.1 Color").name, "Color");
        assert_eq!(SURFACE_FORMAT.lookup(1, 5).expect("4.0 Bgr565").name, "Bgr565");
        assert_eq!(SURFACE_FORMAT.lookup(28, 3).expect("3.1 Dxt1").name, "Dxt1");
    }

    #[test]
    fn test_unknown_member() {
        assert!(matches!(
            SURFACE_FORMAT.lookup(0, 4),
            Err(Error::UnknownEnumValue { value: 0, .. })
        ));
        assert!(matches!(
            CURVE_CONTINUITY.lookup(7, 5),
            Err(Error::UnknownEnumValue { value: 7, .. })
        ));
    }

    #[test]
    fn test_no_alternate_uses_default_everywhere() {
        assert_eq!(CURVE_LOOP_TYPE.lookup(3, 5).expect("Oscillate").name, "Oscillate");
        assert_eq!(CURVE_LOOP_TYPE.lookup(3, 3).expect("Oscillate").name, "Oscillate");
    }
}
