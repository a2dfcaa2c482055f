//! Core layer - the vocabulary shared by the converter and the USD writer.
//!
//! - [`Role`] - geometry role resolved from a parameter name
//! - [`TimeCode`] / [`TimeRange`] - time codes of authored samples

mod role;
mod time_code;

pub use role::Role;
pub use time_code::{TimeCode, TimeRange};
