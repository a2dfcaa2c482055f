//! Prims - the nodes of a stage's namespace.

use super::attribute::Attribute;
use super::value::ValueType;
use crate::util::{Error, Result};

/// Type name of transform prims.
pub const XFORM_TYPE: &str = "Xform";

/// Type name of mesh prims.
pub const MESH_TYPE: &str = "Mesh";

/// A defined prim with its attributes and children.
#[derive(Clone, Debug, PartialEq)]
pub struct Prim {
    name: String,
    type_name: String,
    attributes: Vec<Attribute>,
    children: Vec<Prim>,
}

impl Prim {
    /// Create a prim. The name must be a valid identifier.
    pub fn new(name: &str, type_name: &str) -> Result<Self> {
        if !is_valid_identifier(name) {
            return Err(Error::InvalidPath(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_type_name(&mut self, type_name: &str) {
        self.type_name = type_name.to_string();
    }

    /// Attributes in creation order.
    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Child prims in definition order.
    #[inline]
    pub fn children(&self) -> &[Prim] {
        &self.children
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Get a mutable attribute by name.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name() == name)
    }

    /// Create an attribute, or return the existing one with this name.
    ///
    /// An existing attribute keeps its declared type; values of another type
    /// are then rejected by [`Attribute::set`].
    pub fn create_attribute(&mut self, name: &str, value_type: ValueType) -> Result<&mut Attribute> {
        if !is_valid_property_name(name) {
            return Err(Error::InvalidPath(format!("{}.{}", self.name, name)));
        }
        let idx = match self.attributes.iter().position(|a| a.name() == name) {
            Some(idx) => idx,
            None => {
                self.attributes.push(Attribute::new(name, value_type));
                self.attributes.len() - 1
            }
        };
        Ok(&mut self.attributes[idx])
    }

    /// Get a child by name.
    pub fn child(&self, name: &str) -> Option<&Prim> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Get a mutable child by name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Prim> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Add a child prim. Names are unique among siblings.
    pub fn add_child(&mut self, child: Prim) -> Result<&mut Prim> {
        if self.child(&child.name).is_some() {
            return Err(Error::InvalidPath(format!("{}/{} already exists", self.name, child.name)));
        }
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }
}

/// Check for a valid prim name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check for a valid property name: identifiers joined by `:` namespaces.
pub fn is_valid_property_name(name: &str) -> bool {
    name.split(':').all(is_valid_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("Geometry"));
        assert!(is_valid_identifier("_mesh2"));
        assert!(!is_valid_identifier("2mesh"));
        assert!(!is_valid_identifier("vertex.position"));
        assert!(!is_valid_identifier(""));

        assert!(is_valid_property_name("primvars:st"));
        assert!(!is_valid_property_name("primvars::st"));
        assert!(!is_valid_property_name("primvars:vertex.uv"));
    }

    #[test]
    fn test_create_attribute_returns_existing() {
        let mut prim = Prim::new("mesh", MESH_TYPE).unwrap();
        prim.create_attribute("primvars:attribute0", ValueType::FloatArray).unwrap();
        let attr = prim
            .create_attribute("primvars:attribute0", ValueType::Float3Array)
            .unwrap();
        assert_eq!(attr.value_type(), ValueType::FloatArray);
        assert_eq!(prim.attributes().len(), 1);
    }

    #[test]
    fn test_duplicate_child() {
        let mut root = Prim::new("Geometry", XFORM_TYPE).unwrap();
        root.add_child(Prim::new("mesh", MESH_TYPE).unwrap()).unwrap();
        assert!(root.add_child(Prim::new("mesh", MESH_TYPE).unwrap()).is_err());
        assert!(Prim::new("bad name", MESH_TYPE).is_err());
    }
}
