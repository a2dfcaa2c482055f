//! Mesh schema view.
//!
//! [`UsdMesh`] borrows a `Mesh` prim and offers one setter per mesh
//! property. Every setter takes ownership of its buffer and an optional time
//! code: `None` authors the default value, `Some(t)` a time sample.

use super::attribute::{Attribute, Interpolation};
use super::prim::{is_valid_identifier, Prim, MESH_TYPE};
use super::stage::Stage;
use super::value::{Value, ValueType};
use crate::core::TimeCode;
use crate::util::{BBox3f, Error, Result, Vec2, Vec3};

pub const POINTS: &str = "points";
pub const NORMALS: &str = "normals";
pub const FACE_VERTEX_COUNTS: &str = "faceVertexCounts";
pub const FACE_VERTEX_INDICES: &str = "faceVertexIndices";
pub const EXTENT: &str = "extent";
pub const PRIMVARS_PREFIX: &str = "primvars:";
/// Primvar name used for texture coordinates.
pub const ST: &str = "st";

/// Typed view over a `Mesh` prim.
pub struct UsdMesh<'a> {
    prim: &'a mut Prim,
}

impl<'a> UsdMesh<'a> {
    /// Define a mesh prim at `path` (its parent must exist).
    pub fn define(stage: &'a mut Stage, path: &str) -> Result<Self> {
        let prim = stage.define_prim(path, MESH_TYPE)?;
        Ok(Self { prim })
    }

    /// Get an existing mesh prim.
    pub fn get(stage: &'a mut Stage, path: &str) -> Result<Self> {
        let prim = stage
            .prim_mut(path)
            .ok_or_else(|| Error::PrimNotFound(path.to_string()))?;
        Self::from_prim(prim)
    }

    /// Wrap a prim, which must be typed `Mesh`.
    pub fn from_prim(prim: &'a mut Prim) -> Result<Self> {
        if prim.type_name() != MESH_TYPE {
            return Err(Error::TypeMismatch {
                expected: MESH_TYPE.to_string(),
                actual: prim.type_name().to_string(),
            });
        }
        Ok(Self { prim })
    }

    #[inline]
    pub fn prim(&self) -> &Prim {
        &*self.prim
    }

    /// Set vertex positions. The extent is set from their bounds at the same
    /// time code; an empty point set leaves the extent untouched.
    pub fn set_points(&mut self, points: Vec<Vec3>, time: Option<TimeCode>) -> Result<()> {
        let bounds = BBox3f::from_points(&points);
        self.set(POINTS, ValueType::Point3fArray, Value::Float3Array(points), time)?;
        if !bounds.is_empty() {
            self.set(
                EXTENT,
                ValueType::Float3Array,
                Value::Float3Array(vec![bounds.min, bounds.max]),
                time,
            )?;
        }
        Ok(())
    }

    /// Set vertex normals.
    pub fn set_normals(&mut self, normals: Vec<Vec3>, time: Option<TimeCode>) -> Result<()> {
        self.set(NORMALS, ValueType::Normal3fArray, Value::Float3Array(normals), time)
    }

    /// Set the `interpolation` metadata of the normals.
    pub fn set_normals_interpolation(&mut self, interpolation: Interpolation) -> Result<()> {
        self.prim
            .create_attribute(NORMALS, ValueType::Normal3fArray)?
            .set_interpolation(interpolation);
        Ok(())
    }

    pub fn set_face_vertex_indices(&mut self, indices: Vec<i32>, time: Option<TimeCode>) -> Result<()> {
        self.set(FACE_VERTEX_INDICES, ValueType::IntArray, Value::IntArray(indices), time)
    }

    pub fn set_face_vertex_counts(&mut self, counts: Vec<i32>, time: Option<TimeCode>) -> Result<()> {
        self.set(FACE_VERTEX_COUNTS, ValueType::IntArray, Value::IntArray(counts), time)
    }

    /// Set a primvar value, declaring the primvar on first use.
    ///
    /// The declared type follows the first value; a later value of another
    /// type fails with [`Error::TypeMismatch`] and leaves the primvar as is.
    pub fn set_primvar(
        &mut self,
        name: &str,
        value: Value,
        interpolation: Interpolation,
        time: Option<TimeCode>,
    ) -> Result<()> {
        let value_type = value.natural_type();
        self.set_primvar_as(name, value_type, value, interpolation, time)
    }

    /// Set texture coordinates as the `st` primvar.
    pub fn set_texcoords(&mut self, uvs: Vec<Vec2>, time: Option<TimeCode>) -> Result<()> {
        self.set_primvar_as(
            ST,
            ValueType::TexCoord2fArray,
            Value::Float2Array(uvs),
            Interpolation::Vertex,
            time,
        )
    }

    /// Get a primvar attribute by its unprefixed name.
    pub fn primvar(&self, name: &str) -> Option<&Attribute> {
        self.prim.attribute(&format!("{}{}", PRIMVARS_PREFIX, name))
    }

    /// Resolved points at a time code.
    pub fn points(&self, time: Option<TimeCode>) -> Option<&[Vec3]> {
        self.prim.attribute(POINTS)?.get(time)?.as_float3_array()
    }

    /// Resolved normals at a time code.
    pub fn normals(&self, time: Option<TimeCode>) -> Option<&[Vec3]> {
        self.prim.attribute(NORMALS)?.get(time)?.as_float3_array()
    }

    /// Resolved face vertex indices at a time code.
    pub fn face_vertex_indices(&self, time: Option<TimeCode>) -> Option<&[i32]> {
        self.prim.attribute(FACE_VERTEX_INDICES)?.get(time)?.as_int_array()
    }

    /// Resolved face vertex counts at a time code.
    pub fn face_vertex_counts(&self, time: Option<TimeCode>) -> Option<&[i32]> {
        self.prim.attribute(FACE_VERTEX_COUNTS)?.get(time)?.as_int_array()
    }

    fn set_primvar_as(
        &mut self,
        name: &str,
        value_type: ValueType,
        value: Value,
        interpolation: Interpolation,
        time: Option<TimeCode>,
    ) -> Result<()> {
        if !is_valid_identifier(name) {
            return Err(Error::InvalidPath(format!("{}{}", PRIMVARS_PREFIX, name)));
        }
        let attr = self
            .prim
            .create_attribute(&format!("{}{}", PRIMVARS_PREFIX, name), value_type)?;
        attr.set(value, time)?;
        attr.set_interpolation(interpolation);
        Ok(())
    }

    fn set(&mut self, name: &str, value_type: ValueType, value: Value, time: Option<TimeCode>) -> Result<()> {
        self.prim.create_attribute(name, value_type)?.set(value, time)
    }
}
