//! Graphics content readers.
//!
//! ## Texture2D
//! ```text
//! SurfaceFormat  format      (i32, see enums::SURFACE_FORMAT)
//! u32            width
//! u32            height
//! u32            mip_count
//! mip_count x { u32 size; u8[size] data }
//! ```
//! Texture3D adds a `u32 depth` after `height`. TextureCube stores a single
//! `u32 size` in place of width/height and repeats the mip loop once per
//! face, in [`CUBE_FACES`](super::value::CUBE_FACES) order.
//!
//! ## VertexDeclaration
//! ```text
//! u32 stride
//! u32 element_count
//! element_count x { u32 offset; i32 format; i32 usage; u32 usage_index }
//! ```
//! A VertexBuffer embeds its declaration without a type id, followed by
//! `u32 vertex_count` and `vertex_count * stride` bytes.
//!
//! ## BasicEffect
//! ```text
//! string   texture path (external reference, empty for none)
//! f32[3]   diffuse color
//! f32[3]   emissive color
//! f32[3]   specular color
//! f32      specular power
//! f32      alpha
//! bool     vertex color enabled
//! ```
//!
//! ## SpriteFont
//! Every field except the spacing scalars and the default character is a
//! type-id tagged object:
//! ```text
//! Texture2D          texture
//! List<Rectangle>    glyphs
//! List<Rectangle>    cropping
//! List<Char>         characters
//! i32                line_spacing
//! f32                spacing
//! List<Vector3>      kerning
//! Nullable<Char>     default_character
//! ```

use std::sync::{Arc, OnceLock};

use super::enums::SURFACE_FORMAT;
use super::math::vec3;
use super::value::{
    BasicEffect, IndexBuffer, Rectangle, SpriteFont, Texture2D, Texture3D, TextureCube, VertexBuffer, VertexDeclaration,
    VertexElement,
};
use super::{ContentInput, InitContext, Make, ReaderTemplate, TypeReader, Value, bind, bound};
use crate::{Error, Result};

fn read_mips(input: &mut ContentInput<'_>) -> Result<Vec<Vec<u8>>> {
    let count = input.read_u32()? as usize;
    let mut mips = Vec::with_capacity(input.capacity_for(count));
    for _ in 0..count {
        mips.push(input.read_blob()?);
    }
    Ok(mips)
}

fn read_texture_2d(input: &mut ContentInput<'_>) -> Result<Value> {
    texture_2d(input).map(Value::Texture2D)
}

fn texture_2d(input: &mut ContentInput<'_>) -> Result<Texture2D> {
    Ok(Texture2D {
        format: SURFACE_FORMAT.read(input)?,
        width: input.read_u32()?,
        height: input.read_u32()?,
        mips: read_mips(input)?,
    })
}

fn read_texture_3d(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::Texture3D(Texture3D {
        format: SURFACE_FORMAT.read(input)?,
        width: input.read_u32()?,
        height: input.read_u32()?,
        depth: input.read_u32()?,
        mips: read_mips(input)?,
    }))
}

fn read_texture_cube(input: &mut ContentInput<'_>) -> Result<Value> {
    let format = SURFACE_FORMAT.read(input)?;
    let size = input.read_u32()?;
    let mip_count = input.read_u32()? as usize;
    let mut faces: [Vec<Vec<u8>>; 6] = Default::default();
    for face in &mut faces {
        face.reserve(input.capacity_for(mip_count));
        for _ in 0..mip_count {
            face.push(input.read_blob()?);
        }
    }
    Ok(Value::TextureCube(TextureCube { format, size, faces }))
}

fn read_effect(input: &mut ContentInput<'_>) -> Result<Value> {
    input.read_blob().map(Value::Effect)
}

fn read_basic_effect(input: &mut ContentInput<'_>) -> Result<Value> {
    let texture = input.read_external_reference(Some(TEXTURE_2D))?;
    Ok(Value::BasicEffect(BasicEffect {
        texture: (!texture.path.is_empty()).then_some(texture),
        diffuse_color: vec3(input)?,
        emissive_color: vec3(input)?,
        specular_color: vec3(input)?,
        specular_power: input.read_f32()?,
        alpha: input.read_f32()?,
        vertex_color_enabled: input.read_bool()?,
    }))
}

fn read_index_buffer(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::IndexBuffer(IndexBuffer {
        sixteen_bit: input.read_bool()?,
        data: input.read_blob()?,
    }))
}

fn vertex_declaration(input: &mut ContentInput<'_>) -> Result<VertexDeclaration> {
    let stride = input.read_u32()?;
    let count = input.read_u32()? as usize;
    let mut elements = Vec::with_capacity(input.capacity_for(count));
    for _ in 0..count {
        elements.push(VertexElement {
            offset: input.read_u32()?,
            format: input.read_i32()?,
            usage: input.read_i32()?,
            usage_index: input.read_u32()?,
        });
    }
    Ok(VertexDeclaration { stride, elements })
}

fn read_vertex_declaration(input: &mut ContentInput<'_>) -> Result<Value> {
    vertex_declaration(input).map(Value::VertexDeclaration)
}

fn read_vertex_buffer(input: &mut ContentInput<'_>) -> Result<Value> {
    let declaration = vertex_declaration(input)?;
    let vertex_count = input.read_u32()?;
    let len = (vertex_count as usize)
        .checked_mul(declaration.stride as usize)
        .ok_or(Error::InvalidRange)?;
    let data = input.read_bytes(len)?.to_vec();
    Ok(Value::VertexBuffer(VertexBuffer {
        declaration,
        vertex_count,
        data,
    }))
}

const TEXTURE_2D: &str = "Microsoft.Xna.Framework.Graphics.Texture2D";
const RECTANGLE_LIST: &str = "System.Collections.Generic.List`1[[Microsoft.Xna.Framework.Rectangle]]";
const CHAR_LIST: &str = "System.Collections.Generic.List`1[[System.Char]]";
const VECTOR3_LIST: &str = "System.Collections.Generic.List`1[[Microsoft.Xna.Framework.Vector3]]";

/// Reads fonts. The texture and list readers it depends on are resolved by
/// target type during init.
#[derive(Default)]
pub struct SpriteFontReader {
    texture: OnceLock<Arc<dyn TypeReader>>,
    rectangles: OnceLock<Arc<dyn TypeReader>>,
    chars: OnceLock<Arc<dyn TypeReader>>,
    vectors: OnceLock<Arc<dyn TypeReader>>,
}

impl SpriteFontReader {
    fn make() -> Arc<dyn TypeReader> {
        Arc::new(Self::default())
    }

    fn list<T>(
        input: &mut ContentInput<'_>,
        reader: &dyn TypeReader,
        element: &str,
        convert: impl Fn(Value) -> Option<T>,
    ) -> Result<Vec<T>> {
        let items = match input.read_object_as(reader)? {
            Some(Value::List(items)) => items,
            None => return Ok(Vec::new()),
            Some(other) => return Err(mismatch(reader.target_type(), &other)),
        };
        items
            .into_iter()
            .map(|v| {
                let kind = v.kind();
                convert(v).ok_or_else(|| Error::TypeMismatch {
                    expected: element.to_owned(),
                    found: kind.to_owned(),
                })
            })
            .collect()
    }
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected: expected.to_owned(),
        found: found.kind().to_owned(),
    }
}

impl TypeReader for SpriteFontReader {
    fn reader_tag(&self) -> &str {
        "Microsoft.Xna.Framework.Content.SpriteFontReader"
    }

    fn target_type(&self) -> &str {
        "Microsoft.Xna.Framework.Graphics.SpriteFont"
    }

    fn init(&self, cx: &InitContext<'_>) -> Result<()> {
        bind(&self.texture, cx, TEXTURE_2D)?;
        bind(&self.rectangles, cx, RECTANGLE_LIST)?;
        bind(&self.chars, cx, CHAR_LIST)?;
        bind(&self.vectors, cx, VECTOR3_LIST)?;
        Ok(())
    }

    fn read(&self, input: &mut ContentInput<'_>) -> Result<Value> {
        let texture_reader = bound(&self.texture, "SpriteFont texture reader not initialized")?;
        let rectangles = bound(&self.rectangles, "SpriteFont rectangle list reader not initialized")?;
        let chars = bound(&self.chars, "SpriteFont char list reader not initialized")?;
        let vectors = bound(&self.vectors, "SpriteFont vector list reader not initialized")?;

        let texture = match input.read_object_as(texture_reader)? {
            Some(Value::Texture2D(t)) => Some(t),
            None => None,
            Some(other) => return Err(mismatch(TEXTURE_2D, &other)),
        };
        let as_rect = |v: Value| match v {
            Value::Rectangle(r) => Some(r),
            _ => None,
        };
        let glyphs: Vec<Rectangle> = Self::list(input, rectangles, "Microsoft.Xna.Framework.Rectangle", as_rect)?;
        let cropping = Self::list(input, rectangles, "Microsoft.Xna.Framework.Rectangle", as_rect)?;
        let characters = Self::list(input, chars, "System.Char", |v| match v {
            Value::Char(c) => Some(c),
            _ => None,
        })?;
        let line_spacing = input.read_i32()?;
        let spacing = input.read_f32()?;
        let kerning = Self::list(input, vectors, "Microsoft.Xna.Framework.Vector3", |v| match v {
            Value::Vector3(k) => Some(k),
            _ => None,
        })?;
        let default_character = if input.read_bool()? {
            Some(input.read_char()?)
        } else {
            None
        };

        Ok(Value::SpriteFont(Box::new(SpriteFont {
            texture,
            glyphs,
            cropping,
            characters,
            line_spacing,
            spacing,
            kerning,
            default_character,
        })))
    }
}

pub(crate) static TEMPLATES: &[ReaderTemplate] = &[
    ReaderTemplate::reference("Microsoft.Xna.Framework.Content.Texture2DReader", TEXTURE_2D, read_texture_2d),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.Texture3DReader",
        "Microsoft.Xna.Framework.Graphics.Texture3D",
        read_texture_3d,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.TextureCubeReader",
        "Microsoft.Xna.Framework.Graphics.TextureCube",
        read_texture_cube,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.EffectReader",
        "Microsoft.Xna.Framework.Graphics.Effect",
        read_effect,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.BasicEffectReader",
        "Microsoft.Xna.Framework.Graphics.BasicEffect",
        read_basic_effect,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.IndexBufferReader",
        "Microsoft.Xna.Framework.Graphics.IndexBuffer",
        read_index_buffer,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.VertexDeclarationReader",
        "Microsoft.Xna.Framework.Graphics.VertexDeclaration",
        read_vertex_declaration,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.VertexBufferReader",
        "Microsoft.Xna.Framework.Graphics.VertexBuffer",
        read_vertex_buffer,
    ),
    ReaderTemplate {
        reader_tag: "Microsoft.Xna.Framework.Content.SpriteFontReader",
        target_type: "Microsoft.Xna.Framework.Graphics.SpriteFont",
        value_type: false,
        make: Make::Custom(SpriteFontReader::make),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ByteCursor, ByteWriter};
    use crate::formats::xnb::Platform;

    fn input(bytes: &[u8], version: u8) -> ContentInput<'_> {
        ContentInput::new(ByteCursor::new(bytes), &[], Platform::Windows, version)
    }

    #[test]
    fn test_texture_2d_with_two_mips() {
        let mut w = ByteWriter::new();
        w.write_i32(0).write_u32(2).write_u32(2).write_u32(2);
        w.write_u32(16).write_bytes(&[0xAA; 16]);
        w.write_u32(4).write_bytes(&[0xBB; 4]);
        let bytes = w.into_inner();
        let mut i = input(&bytes, 5);
        let Value::Texture2D(t) = read_texture_2d(&mut i).expect("texture") else {
            panic!("not a texture");
        };
        assert_eq!(t.format.name, "Color");
        assert_eq!((t.width, t.height), (2, 2));
        assert_eq!(t.mips, vec![vec![0xAA; 16], vec![0xBB; 4]]);
        assert_eq!(i.remaining(), 0);
    }

    #[test]
    fn test_texture_format_follows_file_version() {
        let mut w = ByteWriter::new();
        w.write_i32(28).write_u32(4).write_u32(4).write_u32(0);
        let bytes = w.into_inner();
        let Value::Texture2D(t) = read_texture_2d(&mut input(&bytes, 4)).expect("3.1 texture") else {
            panic!("not a texture");
        };
        assert_eq!(t.format.name, "Dxt1");
        assert!(matches!(
            read_texture_2d(&mut input(&bytes, 5)),
            Err(Error::UnknownEnumValue { value: 28, .. })
        ));
    }

    #[test]
    fn test_texture_3d_depth_after_height() {
        let mut w = ByteWriter::new();
        w.write_i32(0).write_u32(4).write_u32(2).write_u32(3).write_u32(1);
        w.write_u32(3).write_bytes(&[1, 2, 3]);
        let bytes = w.into_inner();
        let mut i = input(&bytes, 5);
        let Value::Texture3D(t) = read_texture_3d(&mut i).expect("volume") else {
            panic!("not a volume texture");
        };
        assert_eq!((t.width, t.height, t.depth), (4, 2, 3));
        assert_eq!(t.mips, vec![vec![1, 2, 3]]);
        assert_eq!(i.remaining(), 0);
    }

    #[test]
    fn test_effect_bytecode() {
        let mut w = ByteWriter::new();
        w.write_u32(4).write_bytes(&[0x01, 0x09, 0xFF, 0xFE]);
        let bytes = w.into_inner();
        let mut i = input(&bytes, 5);
        assert_eq!(
            read_effect(&mut i).expect("effect"),
            Value::Effect(vec![0x01, 0x09, 0xFF, 0xFE])
        );
        assert_eq!(i.remaining(), 0);
    }

    fn basic_effect_bytes(texture: &str) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_string(texture);
        for f in [1.0f32, 0.5, 0.25, 0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 16.0, 0.75] {
            w.write_f32(f);
        }
        w.write_bool(true);
        w.into_inner()
    }

    #[test]
    fn test_basic_effect_texture_reference() {
        let bytes = basic_effect_bytes("Textures\\brick");
        let mut i = input(&bytes, 5);
        let Value::BasicEffect(effect) = read_basic_effect(&mut i).expect("basic effect") else {
            panic!("not a basic effect");
        };
        assert_eq!(i.remaining(), 0);
        let texture = effect.texture.expect("texture reference");
        assert_eq!(texture.path, "Textures\\brick");
        assert_eq!(texture.expected_type.as_deref(), Some(TEXTURE_2D));
        assert_eq!(effect.diffuse_color, [1.0, 0.5, 0.25]);
        assert_eq!(effect.specular_color, [0.1, 0.2, 0.3]);
        assert_eq!((effect.specular_power, effect.alpha), (16.0, 0.75));
        assert!(effect.vertex_color_enabled);

        let bytes = basic_effect_bytes("");
        let Value::BasicEffect(untextured) = read_basic_effect(&mut input(&bytes, 5)).expect("untextured") else {
            panic!("not a basic effect");
        };
        assert_eq!(untextured.texture, None);
    }

    #[test]
    fn test_index_buffer_flag_then_data() {
        let mut w = ByteWriter::new();
        w.write_bool(true).write_u32(6).write_bytes(&[0, 0, 1, 0, 2, 0]);
        let bytes = w.into_inner();
        let mut i = input(&bytes, 5);
        assert_eq!(
            read_index_buffer(&mut i).expect("indices"),
            Value::IndexBuffer(IndexBuffer {
                sixteen_bit: true,
                data: vec![0, 0, 1, 0, 2, 0],
            })
        );
        assert_eq!(i.remaining(), 0);
    }

    #[test]
    fn test_texture_cube_face_order() {
        let mut w = ByteWriter::new();
        w.write_i32(0).write_u32(1).write_u32(1);
        for face in 0u8..6 {
            w.write_u32(1).write_u8(face);
        }
        let bytes = w.into_inner();
        let Value::TextureCube(cube) = read_texture_cube(&mut input(&bytes, 5)).expect("cube") else {
            panic!("not a cube");
        };
        for (n, face) in cube.faces.iter().enumerate() {
            assert_eq!(face, &vec![vec![n as u8]]);
        }
    }

    #[test]
    fn test_vertex_buffer() {
        let mut w = ByteWriter::new();
        w.write_u32(12).write_u32(1);
        w.write_u32(0).write_i32(2).write_i32(0).write_u32(0);
        w.write_u32(2).write_bytes(&[7; 24]);
        let bytes = w.into_inner();
        let Value::VertexBuffer(vb) = read_vertex_buffer(&mut input(&bytes, 5)).expect("vertex buffer") else {
            panic!("not a vertex buffer");
        };
        assert_eq!(vb.declaration.stride, 12);
        assert_eq!(vb.declaration.elements.len(), 1);
        assert_eq!(vb.vertex_count, 2);
        assert_eq!(vb.data.len(), 24);
    }

    #[test]
    fn test_vertex_buffer_short_data() {
        let mut w = ByteWriter::new();
        w.write_u32(12).write_u32(0).write_u32(3).write_bytes(&[0; 12]);
        let bytes = w.into_inner();
        assert!(matches!(
            read_vertex_buffer(&mut input(&bytes, 5)),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_sprite_font_requires_init() {
        let reader = SpriteFontReader::default();
        assert!(matches!(
            reader.read(&mut input(&[], 5)),
            Err(Error::Parse(_))
        ));
    }
}
