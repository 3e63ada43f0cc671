//! Readers for the framework's math types.
//!
//! All of these are fixed sequences of little-endian scalars. Field order
//! is part of the wire format.

use super::enums::{CURVE_CONTINUITY, CURVE_LOOP_TYPE};
use super::value::{BoundingBox, BoundingSphere, Color, Curve, CurveKey, Plane, Point, Ray, Rectangle};
use super::{ContentInput, ReaderTemplate, Value};
use crate::cursor::ByteCursor;
use crate::Result;

fn floats<const N: usize>(input: &mut ByteCursor<'_>) -> Result<[f32; N]> {
    let mut out = [0f32; N];
    for v in &mut out {
        *v = input.read_f32()?;
    }
    Ok(out)
}

pub(crate) fn vec3(input: &mut ByteCursor<'_>) -> Result<[f32; 3]> {
    floats::<3>(input)
}

fn read_vector2(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::Vector2)
}

fn read_vector3(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::Vector3)
}

fn read_vector4(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::Vector4)
}

fn read_quaternion(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::Quaternion)
}

fn read_matrix(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::Matrix)
}

fn read_color(input: &mut ContentInput<'_>) -> Result<Value> {
    let [r, g, b, a] = input.array::<4>()?;
    Ok(Value::Color(Color { r, g, b, a }))
}

fn read_point(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::Point(Point {
        x: input.read_i32()?,
        y: input.read_i32()?,
    }))
}

fn read_rectangle(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::Rectangle(Rectangle {
        x: input.read_i32()?,
        y: input.read_i32()?,
        width: input.read_i32()?,
        height: input.read_i32()?,
    }))
}

fn read_plane(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::Plane(Plane {
        normal: vec3(input)?,
        d: input.read_f32()?,
    }))
}

fn read_bounding_box(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::BoundingBox(BoundingBox {
        min: vec3(input)?,
        max: vec3(input)?,
    }))
}

fn read_bounding_sphere(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::BoundingSphere(BoundingSphere {
        center: vec3(input)?,
        radius: input.read_f32()?,
    }))
}

fn read_ray(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::Ray(Ray {
        position: vec3(input)?,
        direction: vec3(input)?,
    }))
}

fn read_bounding_frustum(input: &mut ContentInput<'_>) -> Result<Value> {
    floats(input).map(Value::BoundingFrustum)
}

// preLoop, postLoop, i32 key count, then per key:
// position, value, tangentIn, tangentOut, continuity
fn read_curve(input: &mut ContentInput<'_>) -> Result<Value> {
    let pre_loop = CURVE_LOOP_TYPE.read(input)?;
    let post_loop = CURVE_LOOP_TYPE.read(input)?;
    let count = input.read_i32()?;
    let count = usize::try_from(count).map_err(|_| crate::Error::InvalidRange)?;
    let mut keys = Vec::with_capacity(input.capacity_for(count));
    for _ in 0..count {
        keys.push(CurveKey {
            position: input.read_f32()?,
            value: input.read_f32()?,
            tangent_in: input.read_f32()?,
            tangent_out: input.read_f32()?,
            continuity: CURVE_CONTINUITY.read(input)?,
        });
    }
    Ok(Value::Curve(Curve {
        pre_loop,
        post_loop,
        keys,
    }))
}

pub(crate) static TEMPLATES: &[ReaderTemplate] = &[
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Vector2Reader", "Microsoft.Xna.Framework.Vector2", read_vector2),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Vector3Reader", "Microsoft.Xna.Framework.Vector3", read_vector3),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.Vector4Reader", "Microsoft.Xna.Framework.Vector4", read_vector4),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.QuaternionReader", "Microsoft.Xna.Framework.Quaternion", read_quaternion),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.MatrixReader", "Microsoft.Xna.Framework.Matrix", read_matrix),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.ColorReader", "Microsoft.Xna.Framework.Color", read_color),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.PointReader", "Microsoft.Xna.Framework.Point", read_point),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.RectangleReader", "Microsoft.Xna.Framework.Rectangle", read_rectangle),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.PlaneReader", "Microsoft.Xna.Framework.Plane", read_plane),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.BoundingBoxReader", "Microsoft.Xna.Framework.BoundingBox", read_bounding_box),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.BoundingSphereReader", "Microsoft.Xna.Framework.BoundingSphere", read_bounding_sphere),
    ReaderTemplate::value("Microsoft.Xna.Framework.Content.RayReader", "Microsoft.Xna.Framework.Ray", read_ray),
    ReaderTemplate::reference("Microsoft.Xna.Framework.Content.BoundingFrustumReader", "Microsoft.Xna.Framework.BoundingFrustum", read_bounding_frustum),
    ReaderTemplate::reference("Microsoft.Xna.Framework.Content.CurveReader", "Microsoft.Xna.Framework.Curve", read_curve),
];
