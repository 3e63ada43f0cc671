//! The decoded object graph.
//!
//! Every type reader produces a [`Value`]. Small fixed tuples (vectors,
//! matrices) are stored as plain arrays; larger content records get their
//! own structs so exporters can match on them.

/// One decoded object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent reference (type id 0) inside a container.
    Null,
    Bool(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Char(char),
    String(String),
    /// Duration in 100ns ticks.
    TimeSpan(i64),
    /// Packed ticks and kind, as stored.
    DateTime(u64),

    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
    Quaternion([f32; 4]),
    /// Row-major 4x4.
    Matrix([f32; 16]),
    Color(Color),
    Point(Point),
    Rectangle(Rectangle),
    Plane(Plane),
    BoundingBox(BoundingBox),
    BoundingSphere(BoundingSphere),
    Ray(Ray),
    BoundingFrustum([f32; 16]),
    Curve(Curve),

    Array(Vec<Value>),
    List(Vec<Value>),
    /// Entries in the order they were stored.
    Dictionary(Vec<(Value, Value)>),
    Nullable(Option<Box<Value>>),
    Enum(EnumValue),

    ExternalReference(ExternalReference),
    Texture2D(Texture2D),
    Texture3D(Texture3D),
    TextureCube(TextureCube),
    Effect(Vec<u8>),
    BasicEffect(BasicEffect),
    IndexBuffer(IndexBuffer),
    VertexDeclaration(VertexDeclaration),
    VertexBuffer(VertexBuffer),
    SpriteFont(Box<SpriteFont>),
    SoundEffect(SoundEffect),
    Song(Song),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "Boolean",
            Value::SByte(_) => "SByte",
            Value::Byte(_) => "Byte",
            Value::Int16(_) => "Int16",
            Value::UInt16(_) => "UInt16",
            Value::Int32(_) => "Int32",
            Value::UInt32(_) => "UInt32",
            Value::Int64(_) => "Int64",
            Value::UInt64(_) => "UInt64",
            Value::Single(_) => "Single",
            Value::Double(_) => "Double",
            Value::Char(_) => "Char",
            Value::String(_) => "String",
            Value::TimeSpan(_) => "TimeSpan",
            Value::DateTime(_) => "DateTime",
            Value::Vector2(_) => "Vector2",
            Value::Vector3(_) => "Vector3",
            Value::Vector4(_) => "Vector4",
            Value::Quaternion(_) => "Quaternion",
            Value::Matrix(_) => "Matrix",
            Value::Color(_) => "Color",
            Value::Point(_) => "Point",
            Value::Rectangle(_) => "Rectangle",
            Value::Plane(_) => "Plane",
            Value::BoundingBox(_) => "BoundingBox",
            Value::BoundingSphere(_) => "BoundingSphere",
            Value::Ray(_) => "Ray",
            Value::BoundingFrustum(_) => "BoundingFrustum",
            Value::Curve(_) => "Curve",
            Value::Array(_) => "Array",
            Value::List(_) => "List",
            Value::Dictionary(_) => "Dictionary",
            Value::Nullable(_) => "Nullable",
            Value::Enum(_) => "Enum",
            Value::ExternalReference(_) => "ExternalReference",
            Value::Texture2D(_) => "Texture2D",
            Value::Texture3D(_) => "Texture3D",
            Value::TextureCube(_) => "TextureCube",
            Value::Effect(_) => "Effect",
            Value::BasicEffect(_) => "BasicEffect",
            Value::IndexBuffer(_) => "IndexBuffer",
            Value::VertexDeclaration(_) => "VertexDeclaration",
            Value::VertexBuffer(_) => "VertexBuffer",
            Value::SpriteFont(_) => "SpriteFont",
            Value::SoundEffect(_) => "SoundEffect",
            Value::Song(_) => "Song",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: [f32; 3],
    pub d: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: [f32; 3],
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub position: [f32; 3],
    pub direction: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub pre_loop: EnumValue,
    pub post_loop: EnumValue,
    pub keys: Vec<CurveKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveKey {
    pub position: f32,
    pub value: f32,
    pub tangent_in: f32,
    pub tangent_out: f32,
    pub continuity: EnumValue,
}

/// A named enum member together with its stored integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: &'static str,
    pub raw: i32,
    pub name: &'static str,
}

/// A reference to another content item by logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    /// Path relative to the referencing asset; empty means no reference.
    pub path: String,
    /// Target type the referencing reader expects, if it declared one.
    pub expected_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture2D {
    pub format: EnumValue,
    pub width: u32,
    pub height: u32,
    /// One blob per mip level, largest first.
    pub mips: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture3D {
    pub format: EnumValue,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mips: Vec<Vec<u8>>,
}

/// Face order of [`TextureCube::faces`].
pub const CUBE_FACES: [&str; 6] = [
    "PositiveX",
    "NegativeX",
    "PositiveY",
    "NegativeY",
    "PositiveZ",
    "NegativeZ",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TextureCube {
    pub format: EnumValue,
    pub size: u32,
    /// Mip chains in [`CUBE_FACES`] order.
    pub faces: [Vec<Vec<u8>>; 6],
}

/// Fixed-function material. The texture, if any, is a separate asset.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicEffect {
    pub texture: Option<ExternalReference>,
    pub diffuse_color: [f32; 3],
    pub emissive_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub specular_power: f32,
    pub alpha: f32,
    pub vertex_color_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    pub sixteen_bit: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexElement {
    pub offset: u32,
    pub format: i32,
    pub usage: i32,
    pub usage_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    pub stride: u32,
    pub elements: Vec<VertexElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    pub declaration: VertexDeclaration,
    pub vertex_count: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFont {
    pub texture: Option<Texture2D>,
    pub glyphs: Vec<Rectangle>,
    pub cropping: Vec<Rectangle>,
    pub characters: Vec<char>,
    pub line_spacing: i32,
    pub spacing: f32,
    pub kerning: Vec<[f32; 3]>,
    pub default_character: Option<char>,
}

/// An uncompressed sound: a `WAVEFORMATEX` header plus sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEffect {
    pub format: Vec<u8>,
    pub data: Vec<u8>,
    pub loop_start: i32,
    pub loop_length: i32,
    /// Milliseconds.
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Streamed audio file, relative to the song's own asset.
    pub file_name: String,
    /// Milliseconds.
    pub duration: i32,
}
