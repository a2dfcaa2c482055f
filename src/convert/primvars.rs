//! Mapping of AGX arrays to primvar names and values.

use crate::agx::{ArrayData, ParamView};
use crate::usd::{is_valid_identifier, Value};

/// Primvar name for a parameter name: `.` becomes `_`.
///
/// Returns `None` when the result is not a valid identifier.
pub(crate) fn primvar_name(param_name: &str) -> Option<String> {
    let name = param_name.replace('.', "_");
    is_valid_identifier(&name).then_some(name)
}

/// Value of a float attribute array (scalar through vec4 elements).
pub(crate) fn float_value(data: ArrayData) -> Option<Value> {
    match data {
        ArrayData::Float32(v) => Some(Value::FloatArray(v)),
        ArrayData::Vec2f(v) => Some(Value::Float2Array(v)),
        ArrayData::Vec3f(v) => Some(Value::Float3Array(v)),
        ArrayData::Vec4f(v) => Some(Value::Float4Array(v)),
        _ => None,
    }
}

/// Value of a custom array emitted as a primvar.
///
/// Floats map as attribute arrays do; `Int32` and `Uint32` map to `int[]`,
/// unsigned values beyond `i32::MAX` reject the whole array.
pub(crate) fn custom_value(view: &ParamView<'_>) -> Option<Value> {
    match view.decode_array()? {
        ArrayData::Int32(v) => Some(Value::IntArray(v)),
        ArrayData::Uint32(v) => to_i32(v).map(Value::IntArray),
        other => float_value(other),
    }
}

/// Narrow unsigned indices to USD's `int`.
pub(crate) fn to_i32(values: impl IntoIterator<Item = u32>) -> Option<Vec<i32>> {
    values.into_iter().map(|v| i32::try_from(v).ok()).collect()
}
