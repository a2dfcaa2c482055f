//! Type tags - the element types carried by AGX parameters.

use std::fmt;

/// Element type tag of an AGX parameter.
///
/// A tag fixes both the byte stride used to reinterpret a parameter's raw
/// data and which output role the parameter may satisfy. The numeric value is
/// the code stored on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum TypeTag {
    /// Unknown/untyped
    #[default]
    Unknown = 0,
    /// Boolean stored as u32 (0 = false)
    Bool = 1,
    /// Signed 32-bit integer
    Int32 = 10,
    Int32Vec2 = 11,
    Int32Vec3 = 12,
    Int32Vec4 = 13,
    /// Unsigned 32-bit integer
    Uint32 = 20,
    Uint32Vec2 = 21,
    Uint32Vec3 = 22,
    Uint32Vec4 = 23,
    /// 32-bit floating point
    Float32 = 30,
    Float32Vec2 = 31,
    Float32Vec3 = 32,
    Float32Vec4 = 33,
    /// 64-bit floating point
    Float64 = 40,
    /// UTF-8 string (variable length, stride 0)
    String = 50,
    /// One-dimensional array; the element type is carried separately
    Array1D = 100,
    /// Geometry object
    Geometry = 200,
}

impl TypeTag {
    /// Convert from the on-disk code. Unrecognized codes map to `Unknown`.
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Bool,
            10 => Self::Int32,
            11 => Self::Int32Vec2,
            12 => Self::Int32Vec3,
            13 => Self::Int32Vec4,
            20 => Self::Uint32,
            21 => Self::Uint32Vec2,
            22 => Self::Uint32Vec3,
            23 => Self::Uint32Vec4,
            30 => Self::Float32,
            31 => Self::Float32Vec2,
            32 => Self::Float32Vec3,
            33 => Self::Float32Vec4,
            40 => Self::Float64,
            50 => Self::String,
            100 => Self::Array1D,
            200 => Self::Geometry,
            _ => Self::Unknown,
        }
    }

    /// The on-disk code of this tag.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Number of scalar components per element (1 for scalars, 2..4 for
    /// vectors, 0 for non-numeric tags).
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Bool | Self::Int32 | Self::Uint32 | Self::Float32 | Self::Float64 => 1,
            Self::Int32Vec2 | Self::Uint32Vec2 | Self::Float32Vec2 => 2,
            Self::Int32Vec3 | Self::Uint32Vec3 | Self::Float32Vec3 => 3,
            Self::Int32Vec4 | Self::Uint32Vec4 | Self::Float32Vec4 => 4,
            Self::Unknown | Self::String | Self::Array1D | Self::Geometry => 0,
        }
    }

    /// Size in bytes of a single scalar component.
    #[inline]
    pub const fn component_bytes(self) -> usize {
        match self {
            Self::Float64 => 8,
            Self::Bool
            | Self::Int32
            | Self::Int32Vec2
            | Self::Int32Vec3
            | Self::Int32Vec4
            | Self::Uint32
            | Self::Uint32Vec2
            | Self::Uint32Vec3
            | Self::Uint32Vec4
            | Self::Float32
            | Self::Float32Vec2
            | Self::Float32Vec3
            | Self::Float32Vec4 => 4,
            Self::Unknown | Self::String | Self::Array1D | Self::Geometry => 0,
        }
    }

    /// Byte stride of one element (0 for non-numeric tags).
    #[inline]
    pub const fn stride(self) -> usize {
        self.components() * self.component_bytes()
    }

    /// Returns the name of this tag as a string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Bool => "BOOL",
            Self::Int32 => "INT32",
            Self::Int32Vec2 => "INT32_VEC2",
            Self::Int32Vec3 => "INT32_VEC3",
            Self::Int32Vec4 => "INT32_VEC4",
            Self::Uint32 => "UINT32",
            Self::Uint32Vec2 => "UINT32_VEC2",
            Self::Uint32Vec3 => "UINT32_VEC3",
            Self::Uint32Vec4 => "UINT32_VEC4",
            Self::Float32 => "FLOAT32",
            Self::Float32Vec2 => "FLOAT32_VEC2",
            Self::Float32Vec3 => "FLOAT32_VEC3",
            Self::Float32Vec4 => "FLOAT32_VEC4",
            Self::Float64 => "FLOAT64",
            Self::String => "STRING",
            Self::Array1D => "ARRAY1D",
            Self::Geometry => "GEOMETRY",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
