//! Parameter views and bounds-checked decoding of their raw bytes.
//!
//! A [`ParamView`] borrows the cursor buffer it was read into, so it has to be
//! consumed (decoded into owned storage) before the cursor advances. Decoding
//! is keyed by [`TypeTag`]: a view whose byte length disagrees with its
//! declared element count and stride decodes to `None`.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::util::{TypeTag, UVec3, Vec2, Vec3, Vec4};

/// Read-only descriptor of one parameter instance.
#[derive(Clone, Copy, Debug)]
pub struct ParamView<'a> {
    /// Parameter name, e.g. `vertex.position`.
    pub name: &'a str,
    /// True for array parameters.
    pub is_array: bool,
    /// Value type: `Array1D` for arrays, the scalar type otherwise.
    pub value_type: TypeTag,
    /// Element type for arrays, `Unknown` for scalars.
    pub element_type: TypeTag,
    /// Number of array elements (1 for scalars).
    pub element_count: u64,
    /// Raw little-endian bytes.
    pub data: &'a [u8],
}

impl<'a> ParamView<'a> {
    /// Size of the raw data in bytes.
    #[inline]
    pub fn data_bytes(&self) -> usize {
        self.data.len()
    }

    /// The tag describing one stored element: the element type for arrays,
    /// the value type for scalars.
    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        if self.is_array {
            self.element_type
        } else {
            self.value_type
        }
    }

    /// Decode an array parameter into an owned typed sequence.
    ///
    /// Returns `None` for scalars, for element types with no typed mapping,
    /// and when the data length is not `element_count * stride`.
    pub fn decode_array(&self) -> Option<ArrayData> {
        if !self.is_array {
            return None;
        }
        let count = usize::try_from(self.element_count).ok()?;
        let tag = self.element_type;
        if tag.stride() == 0 || self.data.len() != count.checked_mul(tag.stride())? {
            return None;
        }

        let data = match tag {
            TypeTag::Float32 => ArrayData::Float32(read_f32s(self.data)),
            TypeTag::Float32Vec2 => ArrayData::Vec2f(
                read_f32s(self.data).chunks_exact(2).map(Vec2::from_slice).collect(),
            ),
            TypeTag::Float32Vec3 => ArrayData::Vec3f(
                read_f32s(self.data).chunks_exact(3).map(Vec3::from_slice).collect(),
            ),
            TypeTag::Float32Vec4 => ArrayData::Vec4f(
                read_f32s(self.data).chunks_exact(4).map(Vec4::from_slice).collect(),
            ),
            TypeTag::Int32 => {
                let mut out = vec![0i32; count];
                LittleEndian::read_i32_into(self.data, &mut out);
                ArrayData::Int32(out)
            }
            TypeTag::Uint32 => ArrayData::Uint32(read_u32s(self.data)),
            TypeTag::Uint32Vec3 => ArrayData::Vec3u(
                read_u32s(self.data).chunks_exact(3).map(UVec3::from_slice).collect(),
            ),
            _ => return None,
        };
        Some(data)
    }

    /// Reinterpret the raw bytes as a flat `u32` sequence (`data_bytes / 4`
    /// values). Only `Uint32` and `Uint32Vec3` element types qualify.
    pub fn flat_u32(&self) -> Option<Vec<u32>> {
        if !matches!(self.type_tag(), TypeTag::Uint32 | TypeTag::Uint32Vec3) {
            return None;
        }
        if self.data.len() % 4 != 0 {
            return None;
        }
        Some(read_u32s(self.data))
    }

    /// Decode a scalar parameter.
    pub fn decode_scalar(&self) -> Option<ScalarValue> {
        if self.is_array {
            return None;
        }
        let d = self.data;
        let value = match self.value_type {
            TypeTag::Bool if d.len() == 4 => ScalarValue::Bool(LittleEndian::read_u32(d) != 0),
            TypeTag::Int32 if d.len() == 4 => ScalarValue::Int32(LittleEndian::read_i32(d)),
            TypeTag::Uint32 if d.len() == 4 => ScalarValue::Uint32(LittleEndian::read_u32(d)),
            TypeTag::Float32 if d.len() == 4 => ScalarValue::Float32(LittleEndian::read_f32(d)),
            TypeTag::Float64 if d.len() == 8 => ScalarValue::Float64(LittleEndian::read_f64(d)),
            TypeTag::String => ScalarValue::String(String::from_utf8_lossy(d).into_owned()),
            _ => return None,
        };
        Some(value)
    }

    /// Copy the view out of the cursor buffer.
    pub fn to_owned_array(&self) -> OwnedArray {
        OwnedArray {
            element_type: self.element_type,
            element_count: self.element_count,
            bytes: self.data.to_vec(),
        }
    }
}

/// An array parameter's bytes copied out of the reader.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedArray {
    pub element_type: TypeTag,
    pub element_count: u64,
    pub bytes: Vec<u8>,
}

impl OwnedArray {
    /// Borrow as a view under the given name.
    pub fn view<'a>(&'a self, name: &'a str) -> ParamView<'a> {
        ParamView {
            name,
            is_array: true,
            value_type: TypeTag::Array1D,
            element_type: self.element_type,
            element_count: self.element_count,
            data: &self.bytes,
        }
    }
}

/// Typed, owned array data decoded from a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Float32(Vec<f32>),
    Vec2f(Vec<Vec2>),
    Vec3f(Vec<Vec3>),
    Vec4f(Vec<Vec4>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Vec3u(Vec<UVec3>),
}

impl ArrayData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Vec2f(v) => v.len(),
            Self::Vec3f(v) => v.len(),
            Self::Vec4f(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Uint32(v) => v.len(),
            Self::Vec3u(v) => v.len(),
        }
    }

    /// Check if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded scalar parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Uint32(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

fn read_f32s(bytes: &[u8]) -> Vec<f32> {
    let mut out = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes[..out.len() * 4], &mut out);
    out
}

fn read_u32s(bytes: &[u8]) -> Vec<u32> {
    let mut out = vec![0u32; bytes.len() / 4];
    LittleEndian::read_u32_into(&bytes[..out.len() * 4], &mut out);
    out
}
