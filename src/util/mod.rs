//! Utility types and functions shared by the reader, the converter and the
//! USD writer.
//!
//! - [`TypeTag`] - element type tags carried by AGX parameters
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and [`BBox3f`]

mod type_tag;
mod error;
mod math;

pub use type_tag::*;
pub use error::*;
pub use math::*;
