//! AGX animated geometry streams.
//!
//! An AGX file describes one object as a flat list of named parameters:
//! a block of constant (time-invariant) parameters followed by a sequence
//! of time steps, each carrying its own parameters. See [`format`] for the
//! byte layout.

pub mod format;
mod param;
mod reader;
mod writer;

pub use param::*;
pub use reader::*;
pub use writer::*;
