//! # agx-usd
//!
//! Converts AGX animated geometry streams into time-sampled USD meshes.
//!
//! An AGX file is a flat stream of named, typed parameters: constants first,
//! then one group per time step. The converter resolves each parameter name
//! to a geometry role (positions, normals, indices, ...) and authors it on a
//! single `Mesh` prim at the time step's time code. The stage is written as
//! `.usda` text.
//!
//! ## Modules
//!
//! - [`util`] - Type tags, errors, math types
//! - [`agx`] - AGX binary format reader and writer
//! - [`core`] - Parameter roles and time codes
//! - [`usd`] - In-memory stage, mesh schema, `.usda` output
//! - [`convert`] - The AGX to USD conversion
//!
//! ## Example
//!
//! ```ignore
//! use agx_usd::convert::convert;
//!
//! let report = convert("anim.agx", "anim.usda")?;
//! println!("{} point samples", report.point_samples);
//! ```

pub mod util;
pub mod agx;
pub mod core;
pub mod usd;
pub mod convert;

// Re-export commonly used types
pub use util::{Error, Result, TypeTag};
pub use convert::{convert, ConversionReport, ConvertError, ConvertOptions, Converter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, TypeTag};
    pub use crate::agx::{AgxReader, AgxWriter, OParam, ParamView};
    pub use crate::core::{Role, TimeCode, TimeRange};
    pub use crate::usd::{Interpolation, Stage, UsdMesh, Value, ValueType};
    pub use crate::convert::{convert, ConversionReport, ConvertError, ConvertOptions, Converter};
}
