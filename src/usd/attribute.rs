//! Typed attributes with a default value and time samples.

use std::collections::BTreeMap;
use std::fmt;

use super::value::{Value, ValueType};
use crate::core::TimeCode;
use crate::util::{Error, Result};

/// Primvar interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Constant,
    Uniform,
    Varying,
    Vertex,
    FaceVarying,
}

impl Interpolation {
    /// Token value of the `interpolation` metadata.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::FaceVarying => "faceVarying",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A prim attribute.
///
/// Holds an optional default (time-invariant) value and a sorted map of time
/// samples. Setting a value twice at the same time code keeps the last one.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    value_type: ValueType,
    metadata: Vec<(String, Value)>,
    default: Option<Value>,
    time_samples: BTreeMap<TimeCode, Value>,
}

impl Attribute {
    /// Create an attribute with no value.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            metadata: Vec::new(),
            default: None,
            time_samples: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Set the value at a time code, or the default value for `None`.
    ///
    /// Fails with [`Error::TypeMismatch`] when the value does not fit the
    /// declared type.
    pub fn set(&mut self, value: Value, time: Option<TimeCode>) -> Result<()> {
        if !self.value_type.accepts(&value) {
            return Err(Error::TypeMismatch {
                expected: self.value_type.to_string(),
                actual: value.natural_type().to_string(),
            });
        }
        match time {
            None => self.default = Some(value),
            Some(t) => {
                self.time_samples.insert(t, value);
            }
        }
        Ok(())
    }

    /// Resolve the value at a time code.
    ///
    /// A sample authored exactly at `time` wins; otherwise the default value;
    /// otherwise the closest sample at or before `time` (the first sample for
    /// earlier times). `None` asks for the default value only.
    pub fn get(&self, time: Option<TimeCode>) -> Option<&Value> {
        let Some(t) = time else {
            return self.default.as_ref();
        };
        if let Some(v) = self.time_samples.get(&t) {
            return Some(v);
        }
        if self.default.is_some() {
            return self.default.as_ref();
        }
        self.time_samples
            .range(..=t)
            .next_back()
            .or_else(|| self.time_samples.iter().next())
            .map(|(_, v)| v)
    }

    /// The default value, if authored.
    #[inline]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// All time samples in time order.
    #[inline]
    pub fn time_samples(&self) -> &BTreeMap<TimeCode, Value> {
        &self.time_samples
    }

    /// Sorted time codes of the authored samples.
    pub fn sample_times(&self) -> Vec<TimeCode> {
        self.time_samples.keys().copied().collect()
    }

    /// Check if the attribute carries time samples.
    #[inline]
    pub fn has_time_samples(&self) -> bool {
        !self.time_samples.is_empty()
    }

    /// Set a metadata field, replacing an existing one with the same key.
    pub fn set_metadata(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.metadata.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.metadata.push((key.to_string(), value));
        }
    }

    /// Get a metadata field.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// All metadata fields in authoring order.
    #[inline]
    pub fn metadata_fields(&self) -> &[(String, Value)] {
        &self.metadata
    }

    /// Set the `interpolation` metadata.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.set_metadata("interpolation", Value::Token(interpolation.token().to_string()));
    }

    /// The `interpolation` metadata token, if set.
    pub fn interpolation(&self) -> Option<&str> {
        self.metadata("interpolation").and_then(Value::as_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(v: &[i32]) -> Value {
        Value::IntArray(v.to_vec())
    }

    #[test]
    fn test_last_write_wins() {
        let mut a = Attribute::new("faceVertexCounts", ValueType::IntArray);
        a.set(ints(&[3]), Some(TimeCode::new(0.0))).unwrap();
        a.set(ints(&[3, 3]), Some(TimeCode::new(0.0))).unwrap();
        assert_eq!(a.time_samples().len(), 1);
        assert_eq!(a.get(Some(TimeCode::new(0.0))), Some(&ints(&[3, 3])));
    }

    #[test]
    fn test_sample_overrides_default_only_at_its_time() {
        let mut a = Attribute::new("faceVertexIndices", ValueType::IntArray);
        a.set(ints(&[0, 1, 2]), None).unwrap();
        a.set(ints(&[2, 1, 0]), Some(TimeCode::new(1.0))).unwrap();

        assert_eq!(a.get(Some(TimeCode::new(1.0))), Some(&ints(&[2, 1, 0])));
        assert_eq!(a.get(Some(TimeCode::new(0.0))), Some(&ints(&[0, 1, 2])));
        assert_eq!(a.get(Some(TimeCode::new(2.0))), Some(&ints(&[0, 1, 2])));
        assert_eq!(a.get(None), Some(&ints(&[0, 1, 2])));
    }

    #[test]
    fn test_held_samples_without_default() {
        let mut a = Attribute::new("points", ValueType::Point3fArray);
        a.set(Value::Float3Array(vec![]), Some(TimeCode::new(1.0))).unwrap();
        a.set(Value::Float3Array(vec![crate::util::Vec3::ONE]), Some(TimeCode::new(3.0)))
            .unwrap();

        assert_eq!(a.get(Some(TimeCode::new(2.0))), Some(&Value::Float3Array(vec![])));
        assert_eq!(a.get(Some(TimeCode::new(0.0))), Some(&Value::Float3Array(vec![])));
        assert_eq!(a.get(None), None);
        assert_eq!(a.sample_times(), vec![TimeCode::new(1.0), TimeCode::new(3.0)]);
    }

    #[test]
    fn test_type_mismatch() {
        let mut a = Attribute::new("primvars:attribute0", ValueType::FloatArray);
        let err = a
            .set(Value::Float3Array(vec![]), Some(TimeCode::new(0.0)))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(!a.has_time_samples());
    }

    #[test]
    fn test_metadata_replace() {
        let mut a = Attribute::new("normals", ValueType::Normal3fArray);
        a.set_interpolation(Interpolation::Varying);
        a.set_interpolation(Interpolation::Vertex);
        assert_eq!(a.interpolation(), Some("vertex"));
        assert_eq!(a.metadata_fields().len(), 1);
    }
}
