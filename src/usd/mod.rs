//! In-memory USD stage and `.usda` text output.
//!
//! Only the subset needed to author an animated polygon mesh is modeled:
//! prims, typed attributes with a default value and time samples, layer
//! metadata, and the `Mesh` schema setters.

mod attribute;
mod mesh;
mod prim;
mod stage;
mod usda;
mod value;

pub use attribute::{Attribute, Interpolation};
pub use mesh::*;
pub use prim::{is_valid_identifier, is_valid_property_name, Prim, MESH_TYPE, XFORM_TYPE};
pub use stage::{generator_doc, Stage, StageMetadata, UpAxis};
pub use value::{Value, ValueType};
