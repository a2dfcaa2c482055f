//! Attribute values and their declared types.

use std::fmt;

use crate::util::{Vec2, Vec3, Vec4};

/// Declared type of an attribute, as written in `.usda`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Token,
    Double,
    IntArray,
    FloatArray,
    Float2Array,
    Float3Array,
    Float4Array,
    Point3fArray,
    Normal3fArray,
    TexCoord2fArray,
}

impl ValueType {
    /// Type name used in `.usda` declarations.
    pub const fn usda_name(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Double => "double",
            Self::IntArray => "int[]",
            Self::FloatArray => "float[]",
            Self::Float2Array => "float2[]",
            Self::Float3Array => "float3[]",
            Self::Float4Array => "float4[]",
            Self::Point3fArray => "point3f[]",
            Self::Normal3fArray => "normal3f[]",
            Self::TexCoord2fArray => "texCoord2f[]",
        }
    }

    /// Check if a value can be stored in an attribute of this type.
    ///
    /// Role types (points, normals, texture coordinates) share storage with
    /// the plain vector types.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Token, Value::Token(_))
                | (Self::Double, Value::Double(_))
                | (Self::IntArray, Value::IntArray(_))
                | (Self::FloatArray, Value::FloatArray(_))
                | (Self::Float2Array | Self::TexCoord2fArray, Value::Float2Array(_))
                | (
                    Self::Float3Array | Self::Point3fArray | Self::Normal3fArray,
                    Value::Float3Array(_)
                )
                | (Self::Float4Array, Value::Float4Array(_))
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.usda_name())
    }
}

/// An attribute or metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Token(String),
    Double(f64),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    Float2Array(Vec<Vec2>),
    Float3Array(Vec<Vec3>),
    Float4Array(Vec<Vec4>),
}

impl Value {
    /// The plain declared type matching this value.
    pub const fn natural_type(&self) -> ValueType {
        match self {
            Self::Token(_) => ValueType::Token,
            Self::Double(_) => ValueType::Double,
            Self::IntArray(_) => ValueType::IntArray,
            Self::FloatArray(_) => ValueType::FloatArray,
            Self::Float2Array(_) => ValueType::Float2Array,
            Self::Float3Array(_) => ValueType::Float3Array,
            Self::Float4Array(_) => ValueType::Float4Array,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float2_array(&self) -> Option<&[Vec2]> {
        match self {
            Self::Float2Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float3_array(&self) -> Option<&[Vec3]> {
        match self {
            Self::Float3Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float4_array(&self) -> Option<&[Vec4]> {
        match self {
            Self::Float4Array(v) => Some(v),
            _ => None,
        }
    }
}
